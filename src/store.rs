use std::fs::{self, File};
use std::path::{Path, PathBuf};

use bincode::{deserialize_from, serialize_into};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::dataset::Dataset;

/// Location of the persisted dataset snapshot inside the data directory.
pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join("dataset.bin.gz")
}

/// Persists the latest ingested dataset as a gzip-compressed bincode
/// snapshot. Each call overwrites the previous snapshot; the operation is
/// idempotent for identical data.
pub fn save_snapshot(dataset: &Dataset, data_dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = snapshot_path(data_dir);

    let file = File::create(&path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = std::io::BufWriter::new(encoder);

    serialize_into(&mut writer, dataset)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    Ok(path)
}

pub fn load_snapshot(path: &Path) -> std::io::Result<Dataset> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);

    let dataset: Dataset = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(dataset)
}

/// Lists previously rendered report PDFs, newest label first.
///
/// The reports directory is the index: filenames carry the date-range
/// label, there is no metadata sidecar, and files are never auto-deleted.
pub fn list_reports(reports_dir: &Path) -> Vec<String> {
    let mut files = Vec::new();

    if let Ok(entries) = fs::read_dir(reports_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("pdf") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
    }

    files.sort_by(|a, b| b.cmp(a));
    files
}

/// Whether a user-supplied download name is a plain filename confined to
/// the reports directory.
pub fn is_safe_report_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && (name.ends_with(".pdf") || name.ends_with(".png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn snapshot_round_trips() {
        let dir = tempdir().unwrap();
        let mut ds = Dataset::new(vec!["date".to_string(), "Sales".to_string()]);
        ds.push_row(vec!["2024-01-01".into(), "100".into()]);

        let path = save_snapshot(&ds, dir.path()).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(ds, loaded);
    }

    #[test]
    fn saving_twice_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let mut ds = Dataset::new(vec!["date".to_string()]);
        ds.push_row(vec!["2024-01-01".into()]);
        let first = save_snapshot(&ds, dir.path()).unwrap();
        let second = save_snapshot(&ds, dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn listing_filters_and_sorts_descending() {
        let dir = tempdir().unwrap();
        for name in [
            "sales_2024-01-01to2024-01-31.pdf",
            "sales_2024-03-01to2024-03-31.pdf",
            "sales_2024-02-01to2024-02-28.png",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = list_reports(dir.path());
        assert_eq!(
            files,
            vec![
                "sales_2024-03-01to2024-03-31.pdf".to_string(),
                "sales_2024-01-01to2024-01-31.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn listing_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        assert!(list_reports(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn download_names_are_confined() {
        assert!(is_safe_report_name("sales_2024-01-01to2024-01-31.pdf"));
        assert!(is_safe_report_name("sales_2024-01-01to2024-01-31.png"));
        assert!(!is_safe_report_name("../users.json"));
        assert!(!is_safe_report_name("dir/report.pdf"));
        assert!(!is_safe_report_name("report.exe"));
        assert!(!is_safe_report_name(""));
    }
}
