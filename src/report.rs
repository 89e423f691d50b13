use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::chart;
use crate::dataset::{resolve_date_column, resolve_sales_column, Dataset};
use crate::error::ReportError;

/// A generated report: the text summary plus its chart image, if any.
///
/// Reports are ephemeral and owned by the request that created them;
/// identical ranges regenerate the report fully each time.
#[derive(Debug, Clone)]
pub struct Report {
    /// Human-readable multi-line summary. Never blank: an empty range
    /// produces an explicit "no data" message instead.
    pub text: String,

    /// Path of the rendered chart PNG. `None` when the range held no rows.
    pub chart_path: Option<PathBuf>,

    /// Date-range label used to name output files, e.g.
    /// `2024-01-01to2024-01-31`.
    pub label: String,
}

/// Parses the two submitted date strings and validates their order.
///
/// Dates arrive as ISO `YYYY-MM-DD` from HTML date inputs. A reversed range
/// is rejected with a validation error rather than silently swapped.
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), ReportError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(ReportError::InvalidRange { start, end });
    }
    Ok((start, end))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(raw.to_string()))
}

pub fn range_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}to{}", start, end)
}

/// Filters the dataset to the inclusive date range and summarises the sales
/// column into report text plus a chart image under `reports_dir`.
///
/// The sales and date columns are both resolved by name; a row whose date or
/// sales cell cannot be coerced fails the whole aggregation rather than
/// being silently dropped. An empty filtered subset still yields non-empty
/// text (upstream treats blank text as a failure) and skips the chart.
pub fn aggregate(
    dataset: &Dataset,
    start: NaiveDate,
    end: NaiveDate,
    reports_dir: &Path,
) -> Result<Report, ReportError> {
    if start > end {
        return Err(ReportError::InvalidRange { start, end });
    }

    let sales_column = resolve_sales_column(dataset)?.to_string();
    let date_column = resolve_date_column(dataset)?.to_string();
    let label = range_label(start, end);

    let daily = daily_totals(dataset, &date_column, &sales_column, start, end)?;
    let count: usize = daily.iter().map(|d| d.rows).sum();

    if daily.is_empty() {
        let text = format!(
            "Sales Report: {} to {}\nNo sales data found in this date range.\n",
            start, end
        );
        return Ok(Report {
            text,
            chart_path: None,
            label,
        });
    }

    let total: f64 = daily.iter().map(|d| d.total).sum();
    let average = total / count as f64;
    let best = daily
        .iter()
        .max_by(|a, b| a.total.partial_cmp(&b.total).unwrap_or(std::cmp::Ordering::Equal))
        .map(|d| (d.day, d.total))
        .unwrap_or((start, 0.0));

    let mut text = String::new();
    let _ = writeln!(text, "Sales Report: {} to {}", start, end);
    let _ = writeln!(text, "Sales column: {}", sales_column.trim());
    let _ = writeln!(text, "Rows in range: {}", count);
    let _ = writeln!(text, "Total sales:   {:.2}", total);
    let _ = writeln!(text, "Average sale:  {:.2}", average);
    let _ = writeln!(text, "Best day:      {} ({:.2})", best.0, best.1);
    let _ = writeln!(text);
    let _ = writeln!(text, "Daily totals:");
    for day in &daily {
        let _ = writeln!(text, "  {}  {:>12.2}", day.day, day.total);
    }

    std::fs::create_dir_all(reports_dir)
        .map_err(|e| ReportError::Chart(format!("cannot create reports directory: {}", e)))?;
    let chart_path = reports_dir.join(format!("sales_{}.png", label));
    let points: Vec<(NaiveDate, f64)> = daily.iter().map(|d| (d.day, d.total)).collect();
    chart::save_sales_chart(&points, &chart_path)?;

    Ok(Report {
        text,
        chart_path: Some(chart_path),
        label,
    })
}

#[derive(Debug)]
struct DayTotal {
    day: NaiveDate,
    total: f64,
    rows: usize,
}

fn daily_totals(
    dataset: &Dataset,
    date_column: &str,
    sales_column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DayTotal>, ReportError> {
    use std::collections::BTreeMap;

    let mut totals: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for row in 0..dataset.len() {
        let raw_date = dataset.cell(row, date_column).unwrap_or("");
        let day = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|_| {
            ReportError::BadCell {
                row,
                column: date_column.to_string(),
                value: raw_date.to_string(),
            }
        })?;

        if day < start || day > end {
            continue;
        }

        let raw_amount = dataset.cell(row, sales_column).unwrap_or("");
        let amount = parse_amount(raw_amount).ok_or_else(|| ReportError::BadCell {
            row,
            column: sales_column.to_string(),
            value: raw_amount.to_string(),
        })?;

        let entry = totals.entry(day).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    Ok(totals
        .into_iter()
        .map(|(day, (total, rows))| DayTotal { day, total, rows })
        .collect())
}

/// Coerces a spreadsheet cell to a monetary amount.
///
/// Accepts plain numbers plus common spreadsheet noise (thousands commas, a
/// leading currency symbol). A blank cell counts as zero; anything else
/// unparseable is `None`.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .replace(',', "");
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok()
}
