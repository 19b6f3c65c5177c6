//! Portfolio source table: a CSV with `Techstack` and `Links` columns.

use std::io::Read;
use std::path::Path;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioEntry;

pub const TECHSTACK_COLUMN: &str = "Techstack";
pub const LINKS_COLUMN: &str = "Links";

/// Reads every row of the CSV at `path`, in file order.
pub fn load_source(path: &Path) -> Result<Vec<PortfolioEntry>, AppError> {
    let file = std::fs::File::open(path).map_err(|e| {
        AppError::MalformedSource(format!("cannot read {}: {e}", path.display()))
    })?;
    read_entries(file).map_err(|e| match e {
        AppError::MalformedSource(msg) => {
            AppError::MalformedSource(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parses portfolio rows from any CSV reader. Extra columns are ignored.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<PortfolioEntry>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::MalformedSource(e.to_string()))?;
    let missing: Vec<&str> = [TECHSTACK_COLUMN, LINKS_COLUMN]
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MalformedSource(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    csv_reader
        .deserialize::<PortfolioEntry>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| AppError::MalformedSource(format!("row {}: {e}", i + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_in_file_order() {
        let csv = "Techstack,Links\n\"React, Node.js\",a.com\n\"Python, Django\",b.com\n";
        let entries = read_entries(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tech_stack, "React, Node.js");
        assert_eq!(entries[1].link, "b.com");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = ",Techstack,Links,Owner\n0,Rust,https://x.dev/rust,ops\n";
        let entries = read_entries(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].tech_stack, "Rust");
        assert_eq!(entries[0].link, "https://x.dev/rust");
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let csv = "Techstack,Url\nRust,x.dev\n";
        let err = read_entries(csv.as_bytes()).unwrap_err();
        match err {
            AppError::MalformedSource(msg) => assert!(msg.contains("Links")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let err = load_source(Path::new("/nonexistent/portfolio.csv")).unwrap_err();
        assert!(matches!(err, AppError::MalformedSource(_)));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let entries = read_entries("Techstack,Links\n".as_bytes()).unwrap();
        assert!(entries.is_empty());
    }
}
