//! Conversion job with explicit stages.
//!
//! The job follows these stages in order:
//! 1. **Read**: open the stored workbook and check its columns
//! 2. **Build**: map each eligible row, mint an identifier, write its document
//! 3. **Package**: zip the working directory and clean up
//!
//! The workbook is opened and its columns checked before the working
//! directory exists, so a bad spreadsheet leaves nothing on disk. Once the
//! directory exists, any fatal error removes it and keeps the source.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, info_span, trace, warn};

use cmdi_ingest::{IngestError, ReadOptions, Workbook, check_schema, is_external_reference, map_row};
use cmdi_model::{Clock, FileStore, IdGenerator, ModelError};
use cmdi_report::{DocumentBuilder, ProfileConfig, ReportError, package_job, write_document};

use crate::logging::redact_value;
use crate::storage::{ARCHIVE_EXTENSION, upload_name};
use crate::types::ConversionResult;

/// Suffix for the working directory of a stored file without an extension.
const BARE_NAME_SUFFIX: &str = "_documents";

/// Errors that fail a conversion job.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to create working directory {path}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Services a job consumes instead of reaching for globals.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub clock: &'a dyn Clock,
    pub ids: &'a dyn IdGenerator,
    pub store: &'a dyn FileStore,
}

/// Settings for jobs started from the command line.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Directory holding uploads, working directories and archives.
    pub storage_dir: PathBuf,
    /// `MdCreator` of every generated document.
    pub creator: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("files"),
            creator: String::new(),
        }
    }
}

/// Working state of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    source: PathBuf,
    creator: String,
    working_dir: PathBuf,
    archive_path: PathBuf,
    documents: Vec<PathBuf>,
    read_options: ReadOptions,
    profile: ProfileConfig,
}

impl ConversionJob {
    /// Job for a stored spreadsheet.
    ///
    /// Documents go to a directory next to the source named after it without
    /// its extension; the archive is that name plus `.zip`.
    pub fn new(stored_path: impl Into<PathBuf>, creator: impl Into<String>) -> Self {
        let source = stored_path.into();
        let mut working_dir = source.with_extension("");
        if working_dir == source {
            let mut name = working_dir.into_os_string();
            name.push(BARE_NAME_SUFFIX);
            working_dir = PathBuf::from(name);
        }
        let mut archive_name = working_dir.clone().into_os_string();
        archive_name.push(".");
        archive_name.push(ARCHIVE_EXTENSION);
        let archive_path = PathBuf::from(archive_name);
        Self {
            source,
            creator: creator.into(),
            working_dir,
            archive_path,
            documents: Vec::new(),
            read_options: ReadOptions::default(),
            profile: ProfileConfig::default(),
        }
    }

    #[must_use]
    pub fn with_read_options(mut self, read_options: ReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Documents written so far, in write order, without repeats.
    pub fn documents(&self) -> &[PathBuf] {
        &self.documents
    }
}

/// Counters from the build stage.
#[derive(Debug, Default)]
struct BuildStats {
    rows_read: usize,
    rows_skipped: usize,
    duplicates: Vec<String>,
}

/// Run `job` from workbook to archive.
pub fn convert(mut job: ConversionJob, services: &Collaborators<'_>) -> Result<ConversionResult> {
    let job_span = info_span!(
        "job",
        source = %job.source.display(),
        creator = %redact_value(&job.creator)
    );
    let _job_guard = job_span.enter();
    let job_start = Instant::now();

    // =========================================================================
    // Stage 1: Read
    // =========================================================================
    let read_start = Instant::now();
    let workbook = Workbook::open_with(&job.source, &job.read_options)?;
    check_schema(workbook.headers())?;
    info!(
        sheet = %workbook.sheet_name(),
        columns = workbook.headers().len(),
        duration_ms = read_start.elapsed().as_millis(),
        "workbook opened"
    );

    // =========================================================================
    // Stage 2: Build
    // =========================================================================
    // An existing directory belongs to someone else: never archive or remove it.
    fs::create_dir(&job.working_dir).map_err(|source| ConversionError::WorkingDirectory {
        path: job.working_dir.clone(),
        source,
    })?;
    let build_start = Instant::now();
    let stats = match build_documents(&mut job, &workbook, services) {
        Ok(stats) => stats,
        Err(error) => {
            discard_working_dir(&job.working_dir);
            return Err(error);
        }
    };
    info!(
        rows = stats.rows_read,
        skipped = stats.rows_skipped,
        documents = job.documents.len(),
        duration_ms = build_start.elapsed().as_millis(),
        "documents written"
    );

    // =========================================================================
    // Stage 3: Package
    // =========================================================================
    let package_start = Instant::now();
    let outcome = package_job(
        &job.working_dir,
        &job.archive_path,
        &job.source,
        services.store,
    )?;
    info!(
        archive = %outcome.archive.path.display(),
        entries = outcome.archive.entries.len(),
        warnings = outcome.warnings.len(),
        duration_ms = package_start.elapsed().as_millis(),
        "archive packaged"
    );

    let duration_ms = job_start.elapsed().as_millis();
    info!(duration_ms, "conversion complete");
    Ok(ConversionResult {
        source: job.source,
        archive: outcome.archive.path,
        rows_read: stats.rows_read,
        rows_skipped: stats.rows_skipped,
        documents: outcome.archive.entries,
        duplicates: stats.duplicates,
        warnings: outcome
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect(),
        duration_ms,
    })
}

/// Store an uploaded spreadsheet under its job name, then convert it.
pub fn convert_upload(
    bytes: &[u8],
    filename: &str,
    creator: &str,
    services: &Collaborators<'_>,
) -> Result<ConversionResult> {
    let name = upload_name(services.clock.now(), creator, filename);
    let stored = services.store.store(bytes, &name)?;
    debug!(path = %stored.display(), "upload stored");
    convert(ConversionJob::new(stored, creator), services)
}

fn build_documents(
    job: &mut ConversionJob,
    workbook: &Workbook,
    services: &Collaborators<'_>,
) -> Result<BuildStats> {
    let builder = DocumentBuilder::new(job.profile.clone());
    let mut stats = BuildStats::default();
    let mut written = BTreeSet::new();

    for row in workbook.rows() {
        stats.rows_read += 1;
        if is_external_reference(&row) {
            debug!(row = row.number(), "skipping external reference row");
            stats.rows_skipped += 1;
            continue;
        }
        let record = map_row(&row)?;
        let id = services.ids.mint();
        let document = builder.build(&record, &job.creator, &id, services.clock.now());
        let path = write_document(&document, &job.working_dir, &record.resource_name)?;
        trace!(
            row = row.number(),
            resource_name = %redact_value(&record.resource_name),
            resource_id = %id,
            "document built"
        );

        if written.insert(record.resource_name.clone()) {
            job.documents.push(path);
        } else {
            warn!(
                row = row.number(),
                resource_name = %redact_value(&record.resource_name),
                "duplicate resource name, earlier document overwritten"
            );
            stats.duplicates.push(record.resource_name);
        }
    }
    Ok(stats)
}

fn discard_working_dir(working_dir: &Path) {
    if let Err(error) = fs::remove_dir_all(working_dir) {
        debug!(path = %working_dir.display(), %error, "working directory not removed");
    }
}
