//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a workbook or mapping its rows.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Workbook Errors ===
    /// File is not a spreadsheet, or has no usable data sheet.
    #[error("unreadable workbook {path}: {reason}")]
    UnreadableWorkbook { path: PathBuf, reason: String },

    // === Schema Errors ===
    /// A required column is absent from the sheet header.
    #[error("required column '{column}' not found{}", row_suffix(*row))]
    MissingColumn { column: String, row: Option<usize> },
}

fn row_suffix(row: Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {row})"),
        None => String::new(),
    }
}

impl IngestError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableWorkbook {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display() {
        let err = IngestError::MissingColumn {
            column: "Title".to_string(),
            row: None,
        };
        assert_eq!(err.to_string(), "required column 'Title' not found");
    }

    #[test]
    fn missing_column_display_names_row() {
        let err = IngestError::MissingColumn {
            column: "sex".to_string(),
            row: Some(4),
        };
        assert_eq!(err.to_string(), "required column 'sex' not found (row 4)");
    }

    #[test]
    fn unreadable_display() {
        let err = IngestError::unreadable("/tmp/a.xlsx", "no sheets");
        assert_eq!(err.to_string(), "unreadable workbook /tmp/a.xlsx: no sheets");
    }
}
