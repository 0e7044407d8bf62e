//! Packaging a job's working directory and cleaning up after it.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::FileOptions;

use cmdi_model::FileStore;

use crate::error::{ReportError, Result};

/// A finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Entry names, relative to the packaged directory.
    pub entries: Vec<String>,
}

/// A cleanup step that failed without failing the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not remove {}: {}", self.path.display(), self.message)
    }
}

/// Result of [`package_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub archive: ArchiveSummary,
    pub warnings: Vec<CleanupWarning>,
}

/// Zip every regular file under `dir` into `archive_path`.
///
/// Entries are stored deflated, named relative to `dir` with `/`
/// separators, in sorted order. A partially written archive is removed
/// on failure.
pub fn package_directory(dir: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    let archive_error = |message: String| ReportError::ArchiveCreation {
        path: archive_path.to_path_buf(),
        message,
    };

    let result = write_archive(dir, archive_path).map_err(|error| archive_error(error.to_string()));
    match result {
        Ok(entries) => {
            info!(
                archive = %archive_path.display(),
                entries = entries.len(),
                "created archive"
            );
            Ok(ArchiveSummary {
                path: archive_path.to_path_buf(),
                entries,
            })
        }
        Err(error) => {
            if archive_path.exists() {
                let _ = fs::remove_file(archive_path);
            }
            Err(error)
        }
    }
}

fn write_archive(dir: &Path, archive_path: &Path) -> std::result::Result<Vec<String>, ArchiveIoError> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options =
        FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
        debug!(entry = %name, "added archive entry");
        entries.push(name);
    }
    zip.finish()?;
    Ok(entries)
}

/// Errors raised while writing an archive.
#[derive(Debug, thiserror::Error)]
enum ArchiveIoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Remove the uploaded source and the working directory.
///
/// A source that cannot be deleted is reported back as a warning. The
/// working directory is removed on a best-effort basis.
pub fn cleanup_job(
    source: &Path,
    working_dir: &Path,
    store: &dyn FileStore,
) -> Vec<CleanupWarning> {
    let mut warnings = Vec::new();
    if let Err(error) = store.delete(source) {
        warn!(path = %source.display(), %error, "failed to remove source file");
        warnings.push(CleanupWarning {
            path: source.to_path_buf(),
            message: error.to_string(),
        });
    }
    remove_working_dir(working_dir);
    warnings
}

/// Best-effort removal of a job's working directory.
pub(crate) fn remove_working_dir(working_dir: &Path) {
    if let Err(error) = fs::remove_dir_all(working_dir) {
        debug!(path = %working_dir.display(), %error, "working directory not removed");
    }
}

/// Archive `working_dir` to `archive_path`, then run [`cleanup_job`].
///
/// Cleanup only runs once the archive exists; on failure the working
/// directory is dropped but the source is retained.
pub fn package_job(
    working_dir: &Path,
    archive_path: &Path,
    source: &Path,
    store: &dyn FileStore,
) -> Result<PackageOutcome> {
    let archive = match package_directory(working_dir, archive_path) {
        Ok(archive) => archive,
        Err(error) => {
            remove_working_dir(working_dir);
            return Err(error);
        }
    };
    let warnings = cleanup_job(source, working_dir, store);
    Ok(PackageOutcome { archive, warnings })
}
