//! CMDI report generation library.
//!
//! This crate turns metadata records into output artifacts:
//!
//! - **CMDI documents**: one XML file per record, following the CLARIN
//!   `TextBasicInformation` component profile
//! - **Archives**: a deflate-compressed zip of a job's working directory

mod archive;
mod cmdi_xml;
mod element;
mod error;
mod profile;

// Re-export public types and functions
pub use archive::{
    ArchiveSummary, CleanupWarning, PackageOutcome, cleanup_job, package_directory, package_job,
};
pub use cmdi_xml::{
    CREATION_DATE_FORMAT, CmdiDocument, DocumentBuilder, document_file_name, write_document,
};
pub use element::Element;
pub use error::{ReportError, Result};
pub use profile::{
    CMD_NS, CMD_VERSION, PROFILE_URI, ProfileConfig, RESOURCE_MIME_TYPE, SCHEMA_LOCATION_URI,
    XML_NS, XSI_NS,
};
