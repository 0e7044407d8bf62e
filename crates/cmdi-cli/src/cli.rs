//! CLI argument definitions for the CMDI converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cmdi",
    version,
    about = "Convert bibliographic metadata spreadsheets to CMDI archives",
    long_about = "Convert bibliographic metadata spreadsheets to CLARIN CMDI documents.\n\n\
                  Each data row becomes one TextBasicInformation document; the documents\n\
                  of one spreadsheet are delivered as a single zip archive."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow spreadsheet values (names, titles) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a spreadsheet into a zip archive of CMDI documents.
    Convert(ConvertArgs),

    /// List archives in the storage directory.
    List(StorageArgs),

    /// Print the columns every input spreadsheet must have.
    Columns,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Spreadsheet to convert (.xlsx, .xls, .ods).
    #[arg(value_name = "SPREADSHEET")]
    pub spreadsheet: PathBuf,

    /// Name recorded as MdCreator in every document.
    #[arg(long = "creator", value_name = "NAME")]
    pub creator: String,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Print the result as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct StorageArgs {
    /// Directory for uploads and produced archives.
    #[arg(long = "storage-dir", value_name = "DIR", default_value = "files")]
    pub storage_dir: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
