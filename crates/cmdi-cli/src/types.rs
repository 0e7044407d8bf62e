use std::path::PathBuf;

use serde::Serialize;

/// Outcome of one conversion job.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Stored spreadsheet the job read from.
    pub source: PathBuf,
    pub archive: PathBuf,
    /// Non-blank data rows read from the sheet.
    pub rows_read: usize,
    /// Rows excluded as external references.
    pub rows_skipped: usize,
    /// Archive entry names.
    pub documents: Vec<String>,
    /// Resource names written more than once.
    pub duplicates: Vec<String>,
    pub warnings: Vec<String>,
    pub duration_ms: u128,
}

/// One archive in the storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveListing {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}
