//! Conversion orchestration, upload storage and logging for the `cmdi` binary.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
pub mod storage;
pub mod types;
