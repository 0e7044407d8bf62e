//! Workbook reading with calamine.
//!
//! Input sheets follow a two-row header convention: a free-form title row,
//! then the column-name row, then data. Only the first sheet is read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use cmdi_model::CellValue;
use cmdi_model::cell::format_float;

use crate::error::{IngestError, Result};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Options controlling which sheet and rows are read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Leading rows before the column-name row.
    pub title_rows: u32,
    /// Zero-based sheet position.
    pub sheet_index: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            title_rows: 1,
            sheet_index: 0,
        }
    }
}

/// One data row keyed by the sheet's header.
#[derive(Debug, Clone)]
pub struct Row {
    number: usize,
    headers: Arc<[String]>,
    cells: Vec<CellValue>,
}

impl Row {
    pub fn new(number: usize, headers: Arc<[String]>, cells: Vec<CellValue>) -> Self {
        Self {
            number,
            headers,
            cells,
        }
    }

    /// 1-based spreadsheet row number (as shown in Excel).
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Cell under `column`, or `None` when the sheet has no such header.
    ///
    /// The first matching header wins when names repeat.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        let idx = self.headers.iter().position(|header| header == column)?;
        Some(self.cells.get(idx).unwrap_or(&EMPTY_CELL))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| matches!(cell, CellValue::Empty))
    }
}

/// The data sheet of an opened spreadsheet.
#[derive(Debug)]
pub struct Workbook {
    path: PathBuf,
    sheet_name: String,
    headers: Arc<[String]>,
    range: Range<Data>,
    /// Index of the first data row within `range`.
    data_start: usize,
    /// Absolute sheet row of `range`'s first row.
    first_row: usize,
}

impl Workbook {
    /// Open `path` with the default two-row header convention.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &ReadOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook =
            open_workbook_auto(path).map_err(|error| IngestError::unreadable(path, error))?;

        let sheet_name = workbook
            .sheet_names()
            .get(options.sheet_index)
            .cloned()
            .ok_or_else(|| IngestError::unreadable(path, "workbook has no data sheet"))?;
        let range = workbook
            .worksheet_range_at(options.sheet_index)
            .ok_or_else(|| IngestError::unreadable(path, "workbook has no data sheet"))?
            .map_err(|error| IngestError::unreadable(path, error))?;

        // calamine trims leading empty rows, so locate the header by absolute row.
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let header_row = options.title_rows as usize;
        let header_idx = header_row.checked_sub(first_row).ok_or_else(|| {
            IngestError::unreadable(
                path,
                format!("sheet '{sheet_name}' has no header row {}", header_row + 1),
            )
        })?;
        let header_cells = range.rows().nth(header_idx).ok_or_else(|| {
            IngestError::unreadable(
                path,
                format!("sheet '{sheet_name}' has no header row {}", header_row + 1),
            )
        })?;
        let headers: Arc<[String]> = header_cells
            .iter()
            .map(|cell| cell_to_header_string(cell).trim().to_string())
            .collect();

        debug!(
            path = %path.display(),
            sheet = %sheet_name,
            columns = headers.len(),
            rows = range.height().saturating_sub(header_idx + 1),
            "opened workbook"
        );

        Ok(Self {
            path: path.to_path_buf(),
            sheet_name,
            headers,
            range,
            data_start: header_idx + 1,
            first_row,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Column names from the header row, trimmed.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Lazily yields data rows, skipping rows with no content at all.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.range
            .rows()
            .enumerate()
            .skip(self.data_start)
            .filter_map(move |(idx, cells)| {
                let number = self.first_row + idx + 1;
                let row = Row::new(
                    number,
                    Arc::clone(&self.headers),
                    cells.iter().map(convert_cell).collect(),
                );
                if row.is_blank() {
                    debug!(row = number, "skipping blank row");
                    None
                } else {
                    Some(row)
                }
            })
    }
}

fn cell_to_header_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Convert a calamine cell to its native [`CellValue`].
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if dt.is_duration() {
                CellValue::Float(serial)
            } else {
                excel_serial_to_datetime(serial)
                    .map_or(CellValue::Float(serial), CellValue::DateTime)
            }
        }
        Data::DateTimeIso(s) => {
            parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::DateTime)
        }
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Convert a 1900-system Excel serial date to a timestamp, rounded to seconds.
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Serials below 60 precede Excel's phantom 1900-02-29.
    let epoch = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let seconds = (serial * 86_400.0).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
