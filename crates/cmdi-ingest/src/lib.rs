//! Spreadsheet ingestion for the CMDI converter.
//!
//! - [`Workbook`] opens the first sheet of a spreadsheet and yields [`Row`]s
//!   past the title and header rows, cells still in their native type.
//! - [`normalize_cell`] turns one cell into present-or-empty text.
//! - [`map_row`] builds a [`cmdi_model::MetadataRecord`] from a row, and
//!   [`is_external_reference`] decides which rows are skipped.

pub mod error;
pub mod mapper;
pub mod normalize;
pub mod workbook;

pub use error::{IngestError, Result};
pub use mapper::{EXTERNAL_REFERENCE_MARKER, check_schema, is_external_reference, map_row};
pub use normalize::normalize_cell;
pub use workbook::{ReadOptions, Row, Workbook};
