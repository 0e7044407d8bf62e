//! Collaborators the conversion job consumes.
//!
//! The job never reads the wall clock, mints identifiers, or touches the
//! upload store directly; it goes through these traits so tests can pin
//! timestamps and identifiers.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::{ResourceIdentifier, Result};

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Mints globally distinct resource identifiers.
pub trait IdGenerator {
    fn mint(&self) -> ResourceIdentifier;
}

/// Random v4 UUID identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn mint(&self) -> ResourceIdentifier {
        ResourceIdentifier::new_v4()
    }
}

/// Storage for uploaded spreadsheets.
pub trait FileStore {
    /// Persist `bytes` under `name` and return the stored path.
    fn store(&self, bytes: &[u8], name: &str) -> Result<PathBuf>;

    /// Remove a previously stored file.
    fn delete(&self, path: &Path) -> Result<()>;
}
