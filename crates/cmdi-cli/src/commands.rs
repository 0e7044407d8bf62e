use std::fs;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use tracing::info_span;

use cmdi_cli::pipeline::{Collaborators, ConversionOptions, convert_upload};
use cmdi_cli::storage::LocalFileStore;
use cmdi_cli::types::ConversionResult;
use cmdi_model::{Column, SystemClock, UuidGenerator};

use crate::cli::{ConvertArgs, StorageArgs};
use crate::summary::{apply_table_style, print_archives};

pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Column", "Normalized"]);
    apply_table_style(&mut table);
    for (idx, column) in Column::ALL.iter().enumerate() {
        let normalized = if column.is_pass_through() { "no" } else { "yes" };
        table.add_row(vec![
            (idx + 1).to_string(),
            column.as_str().to_string(),
            normalized.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_list(args: &StorageArgs) -> Result<()> {
    let store = LocalFileStore::new(&args.storage_dir);
    let archives = store
        .list_archives()
        .with_context(|| format!("list archives in {}", args.storage_dir.display()))?;
    print_archives(&archives);
    Ok(())
}

pub fn run_convert(args: &ConvertArgs) -> Result<ConversionResult> {
    let options = ConversionOptions {
        storage_dir: args.storage.storage_dir.clone(),
        creator: args.creator.clone(),
    };
    let span = info_span!("convert", spreadsheet = %args.spreadsheet.display());
    let _guard = span.enter();

    let filename = args
        .spreadsheet
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid spreadsheet path {}", args.spreadsheet.display()))?;
    let bytes = fs::read(&args.spreadsheet)
        .with_context(|| format!("read {}", args.spreadsheet.display()))?;

    let store = LocalFileStore::new(&options.storage_dir);
    let services = Collaborators {
        clock: &SystemClock,
        ids: &UuidGenerator,
        store: &store,
    };
    convert_upload(&bytes, filename, &options.creator, &services)
        .with_context(|| format!("convert {}", args.spreadsheet.display()))
}
