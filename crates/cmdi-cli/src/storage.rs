//! Local upload storage and job naming.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;
use walkdir::WalkDir;

use cmdi_model::{FileStore, ModelError};

use crate::types::ArchiveListing;

/// Timestamp format at the front of upload names.
pub const UPLOAD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Uploads and archives kept in one flat directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archives in the storage directory, sorted by name.
    ///
    /// A storage directory that does not exist yet has no archives.
    pub fn list_archives(&self) -> io::Result<Vec<ArchiveListing>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut listings = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let is_archive = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
            if !entry.file_type().is_file() || !is_archive {
                continue;
            }
            listings.push(ArchiveListing {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                size_bytes: entry.metadata().map_err(io::Error::from)?.len(),
            });
        }
        Ok(listings)
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, bytes: &[u8], name: &str) -> cmdi_model::Result<PathBuf> {
        let path = self.root.join(name);
        let store_error = |source| ModelError::Store {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(store_error)?;
        fs::write(&path, bytes).map_err(store_error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "stored upload");
        Ok(path)
    }

    fn delete(&self, path: &Path) -> cmdi_model::Result<()> {
        fs::remove_file(path).map_err(|source| ModelError::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "removed upload");
        Ok(())
    }
}

/// Unique stored name for an upload: `<timestamp>_<creator>_<filename>`,
/// reduced to a safe file name.
pub fn upload_name(now: NaiveDateTime, creator: &str, filename: &str) -> String {
    secure_filename(&format!(
        "{}_{creator}_{filename}",
        now.format(UPLOAD_TIMESTAMP_FORMAT)
    ))
}

/// Reduce `name` to a flat ASCII file name.
///
/// Path separators and whitespace runs become `_`; only ASCII letters,
/// digits, `.`, `-` and `_` survive; leading and trailing `.`/`_` are
/// stripped.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    kept.trim_matches(['.', '_']).to_string()
}
