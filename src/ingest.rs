use std::fs::File;
use std::io::Read;

use csv::ReaderBuilder;
use log::warn;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::ReportError;

/// Reads the configured spreadsheet source into a [`Dataset`].
///
/// The source is either a published-CSV URL (fetched over HTTPS) or a local
/// CSV file path. The header row declares the columns. An unreachable or
/// header-only source surfaces as an empty dataset; the orchestrator decides
/// whether that aborts the request.
pub async fn read_sheet(config: &Config) -> Result<Dataset, ReportError> {
    let source = config.sheet_source.as_str();
    if source.starts_with("http://") || source.starts_with("https://") {
        let body = fetch_csv(source).await?;
        parse_csv(body.as_bytes())
    } else {
        let file = File::open(source)
            .map_err(|e| ReportError::Ingest(format!("cannot open {}: {}", source, e)))?;
        parse_csv(file)
    }
}

async fn fetch_csv(url: &str) -> Result<String, ReportError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ReportError::Ingest(e.to_string()))?;
    let response = response
        .error_for_status()
        .map_err(|e| ReportError::Ingest(e.to_string()))?;
    response
        .text()
        .await
        .map_err(|e| ReportError::Ingest(e.to_string()))
}

/// Parses CSV text into a dataset. Malformed rows are skipped with a
/// warning rather than aborting the whole ingest.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, ReportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ReportError::Ingest(e.to_string()))?
        .clone();
    let mut dataset = Dataset::new(headers.iter().map(|h| h.to_string()).collect());

    for (idx, record) in rdr.records().enumerate() {
        match record {
            Ok(row) => dataset.push_row(row.iter().map(|c| c.to_string()).collect()),
            Err(e) => warn!("skipping malformed row {}: {}", idx + 1, e),
        }
    }

    Ok(dataset)
}
