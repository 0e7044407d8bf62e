//! Data model for the spreadsheet-to-CMDI conversion.
//!
//! Holds the typed pieces every other crate passes around: spreadsheet
//! cell values, the required column table, the per-row metadata record,
//! resource identifiers, and the collaborator traits (clock, identifier
//! minting, file storage) the conversion job depends on.

pub mod cell;
pub mod columns;
pub mod error;
pub mod ids;
pub mod record;
pub mod services;

pub use cell::{CellValue, NA_TOKENS};
pub use columns::Column;
pub use error::{ModelError, Result};
pub use ids::ResourceIdentifier;
pub use record::MetadataRecord;
pub use services::{Clock, FileStore, IdGenerator, SystemClock, UuidGenerator};
