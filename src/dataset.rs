use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Column names recognised as holding monetary sales amounts
/// (compared case-insensitively after trimming).
pub const SALES_COLUMN_CANDIDATES: &[&str] = &["sales", "amount", "total", "revenue"];

/// Column names recognised as holding row dates.
pub const DATE_COLUMN_CANDIDATES: &[&str] = &["date", "day", "order date", "sale date"];

/// Tabular data ingested from the spreadsheet source.
///
/// Columns keep their declared order; cells are untyped strings at this
/// boundary and are coerced where they are consumed. The structure is
/// serde-serializable so snapshots can persist through the bincode + gzip
/// pipeline in [`crate::store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Dataset {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the declared column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a cell by row index and declared column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }
}

/// Finds the column holding monetary sales amounts.
///
/// Declared columns are scanned in their original order and the first whose
/// trimmed, lower-cased name matches a candidate wins, so a dataset carrying
/// both `Sales` and `Total` resolves to whichever is declared first. Fails
/// with the candidate list when nothing matches; callers must propagate
/// rather than defaulting.
pub fn resolve_sales_column(dataset: &Dataset) -> Result<&str, ReportError> {
    resolve_column(dataset, "sales", SALES_COLUMN_CANDIDATES)
}

/// Finds the column holding row dates.
///
/// Mirrors [`resolve_sales_column`] so a dataset without a recognisable date
/// column fails fast instead of being silently assumed.
pub fn resolve_date_column(dataset: &Dataset) -> Result<&str, ReportError> {
    resolve_column(dataset, "date", DATE_COLUMN_CANDIDATES)
}

fn resolve_column<'a>(
    dataset: &'a Dataset,
    kind: &'static str,
    candidates: &'static [&'static str],
) -> Result<&'a str, ReportError> {
    for column in dataset.columns() {
        let name = column.trim().to_lowercase();
        if candidates.iter().any(|c| *c == name) {
            return Ok(column);
        }
    }
    Err(ReportError::ColumnNotFound { kind, candidates })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str]) -> Dataset {
        Dataset::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn resolves_each_sales_candidate_case_insensitively() {
        for name in ["Sales", "AMOUNT", "total", "ReVeNuE"] {
            let ds = dataset(&["Date", name]);
            assert_eq!(resolve_sales_column(&ds).unwrap(), name);
        }
    }

    #[test]
    fn resolves_column_with_surrounding_whitespace() {
        let ds = dataset(&["Date", "REVENUE "]);
        assert_eq!(resolve_sales_column(&ds).unwrap(), "REVENUE ");
    }

    #[test]
    fn first_declared_candidate_wins() {
        let ds = dataset(&["Date", "Amount", "Total"]);
        assert_eq!(resolve_sales_column(&ds).unwrap(), "Amount");
    }

    #[test]
    fn missing_sales_column_reports_candidates() {
        let ds = dataset(&["Date", "Region", "Units"]);
        let err = resolve_sales_column(&ds).unwrap_err();
        let message = err.to_string();
        for candidate in SALES_COLUMN_CANDIDATES {
            assert!(message.contains(candidate), "missing {candidate} in {message}");
        }
    }

    #[test]
    fn resolves_date_column() {
        let ds = dataset(&["Order Date", "Sales"]);
        assert_eq!(resolve_date_column(&ds).unwrap(), "Order Date");
        let without = dataset(&["Region", "Sales"]);
        assert!(resolve_date_column(&without).is_err());
    }

    #[test]
    fn rows_are_padded_to_column_count() {
        let mut ds = dataset(&["Date", "Sales", "Region"]);
        ds.push_row(vec!["2024-01-01".into(), "100".into()]);
        assert_eq!(ds.cell(0, "Region"), Some(""));
        assert_eq!(ds.cell(0, "Sales"), Some("100"));
        assert_eq!(ds.cell(0, "Missing"), None);
    }
}
