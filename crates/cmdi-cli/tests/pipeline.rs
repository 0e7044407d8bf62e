//! End-to-end conversion jobs against spreadsheets generated at test time.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use tempfile::TempDir;

use cmdi_cli::pipeline::{Collaborators, ConversionError, ConversionJob, convert, convert_upload};
use cmdi_cli::storage::LocalFileStore;
use cmdi_ingest::IngestError;
use cmdi_model::{Clock, Column, IdGenerator, ResourceIdentifier};
use cmdi_report::ReportError;

struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Hands out `res_00000000-0000-0000-0000-000000000001`, `...02`, ...
#[derive(Default)]
struct SequentialIds {
    next: Cell<u64>,
}

impl IdGenerator for SequentialIds {
    fn mint(&self) -> ResourceIdentifier {
        let n = self.next.get() + 1;
        self.next.set(n);
        ResourceIdentifier::parse(&format!("res_00000000-0000-0000-0000-{n:012}")).unwrap()
    }
}

struct Fixture {
    dir: TempDir,
    clock: FixedClock,
    ids: SequentialIds,
    store: LocalFileStore,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path().join("files"));
        let created = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        Self {
            dir,
            clock: FixedClock(created),
            ids: SequentialIds::default(),
            store,
        }
    }

    fn services(&self) -> Collaborators<'_> {
        Collaborators {
            clock: &self.clock,
            ids: &self.ids,
            store: &self.store,
        }
    }

    fn storage(&self) -> PathBuf {
        self.dir.path().join("files")
    }

    /// Write a workbook into the storage directory as if it were uploaded.
    fn upload(&self, name: &str, columns: &[Column], rows: &[Vec<(Column, &str)>]) -> PathBuf {
        fs::create_dir_all(self.storage()).unwrap();
        let path = self.storage().join(name);
        write_sheet(&path, columns, rows);
        path
    }

    fn storage_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.storage())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Title row, header row of `columns`, then `rows` as `(column, value)` pairs.
fn write_sheet(path: &Path, columns: &[Column], rows: &[Vec<(Column, &str)>]) {
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Korpus tekstów").unwrap();
    for (col, column) in columns.iter().enumerate() {
        sheet.write_string(1, col as u16, column.as_str()).unwrap();
    }
    for (offset, row) in rows.iter().enumerate() {
        let sheet_row = 2 + offset as u32;
        for (column, value) in row {
            let col = columns.iter().position(|c| c == column).unwrap() as u16;
            sheet.write_string(sheet_row, col, *value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn row<'a>(name: &'a str, title: &'a str) -> Vec<(Column, &'a str)> {
    vec![
        (Column::ResourceName, name),
        (Column::Title, title),
        (Column::LastName, "Prus"),
        (Column::Sex, "M"),
    ]
}

fn archive_entries(path: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn archive_document(path: &Path, name: &str) -> String {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

/// Values of the `id` and `ref` attributes, in document order.
fn id_and_ref(xml: &str) -> (String, String) {
    let mut reader = Reader::from_str(xml);
    let mut id = None;
    let mut reference = None;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(start) | Event::Empty(start) => {
                for attr in start.attributes() {
                    let attr = attr.unwrap();
                    let value = String::from_utf8(attr.value.to_vec()).unwrap();
                    match attr.key.as_ref() {
                        b"id" => id = Some(value),
                        b"ref" => reference = Some(value),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    (id.unwrap(), reference.unwrap())
}

#[test]
fn external_reference_rows_are_not_converted() {
    let fixture = Fixture::new();
    let source = fixture.upload(
        "job.xlsx",
        &Column::ALL,
        &[
            row("kor_001", "Lalka"),
            row("http://example.org/x", "Zewnętrzny"),
            row("kor_002", "Emancypantki"),
        ],
    );

    let result = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap();

    assert_eq!(result.archive, fixture.storage().join("job.zip"));
    assert_eq!(result.rows_read, 3);
    assert_eq!(result.rows_skipped, 1);
    assert_eq!(result.documents, ["kor_001.xml", "kor_002.xml"]);
    assert_eq!(archive_entries(&result.archive), ["kor_001.xml", "kor_002.xml"]);
    assert!(result.warnings.is_empty());
    assert_eq!(fixture.storage_entries(), ["job.zip"]);
}

#[test]
fn documents_use_minted_ids_and_clock() {
    let fixture = Fixture::new();
    let source = fixture.upload(
        "job.xlsx",
        &Column::ALL,
        &[row("kor_001", "Lalka"), row("kor_002", "Emancypantki")],
    );

    let result = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap();

    let first = archive_document(&result.archive, "kor_001.xml");
    let (id, reference) = id_and_ref(&first);
    assert_eq!(id, "res_00000000-0000-0000-0000-000000000001");
    assert_eq!(reference, id);
    assert!(first.contains("<MdCreator>Anna</MdCreator>"));
    assert!(first.contains("<MdCreationDate>2024-02-29 09:15:00</MdCreationDate>"));
    assert!(first.contains(r#"<title xml:lang="pol">Lalka</title>"#));

    let second = archive_document(&result.archive, "kor_002.xml");
    let (id, reference) = id_and_ref(&second);
    assert_eq!(id, "res_00000000-0000-0000-0000-000000000002");
    assert_eq!(reference, id);
}

#[test]
fn empty_publication_date_keeps_element() {
    let fixture = Fixture::new();
    let source = fixture.upload("job.xlsx", &Column::ALL, &[row("kor_001", "Lalka")]);

    let result = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap();

    let xml = archive_document(&result.archive, "kor_001.xml");
    assert!(xml.contains("<publicationDate></publicationDate>"));
    assert!(xml.contains("<pseudonym></pseudonym>"));
}

#[test]
fn malformed_spreadsheet_has_no_side_effects() {
    let fixture = Fixture::new();
    fs::create_dir_all(fixture.storage()).unwrap();
    let source = fixture.storage().join("job.xlsx");
    fs::write(&source, b"this is not a spreadsheet").unwrap();

    let error = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap_err();

    assert!(matches!(
        error,
        ConversionError::Ingest(IngestError::UnreadableWorkbook { .. })
    ));
    assert_eq!(fixture.storage_entries(), ["job.xlsx"]);
}

#[test]
fn missing_column_aborts_before_any_document() {
    let fixture = Fixture::new();
    let columns: Vec<Column> = Column::ALL
        .into_iter()
        .filter(|column| *column != Column::Genre)
        .collect();
    let source = fixture.upload("job.xlsx", &columns, &[row("kor_001", "Lalka")]);

    let error = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap_err();

    match error {
        ConversionError::Ingest(IngestError::MissingColumn { column, row }) => {
            assert_eq!(column, "Genre");
            assert_eq!(row, None);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fixture.storage_entries(), ["job.xlsx"]);
}

#[test]
fn invalid_resource_name_rolls_back_the_job() {
    let fixture = Fixture::new();
    let source = fixture.upload(
        "job.xlsx",
        &Column::ALL,
        &[row("kor_001", "Lalka"), row("../kor_002", "Potop")],
    );

    let error = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap_err();

    assert!(matches!(
        error,
        ConversionError::Report(ReportError::InvalidResourceName { .. })
    ));
    assert_eq!(fixture.storage_entries(), ["job.xlsx"]);
}

#[test]
fn existing_working_directory_is_left_alone() {
    let fixture = Fixture::new();
    let source = fixture.upload("job.xlsx", &Column::ALL, &[row("kor_001", "Lalka")]);
    let working_dir = fixture.storage().join("job");
    fs::create_dir(&working_dir).unwrap();
    fs::write(working_dir.join("stale.xml"), b"<old/>").unwrap();

    let error = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap_err();

    match error {
        ConversionError::WorkingDirectory { path, source: io_error } => {
            assert_eq!(path, working_dir);
            assert_eq!(io_error.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(working_dir.join("stale.xml")).unwrap(), b"<old/>");
    assert_eq!(fixture.storage_entries(), ["job", "job.xlsx"]);
}

#[test]
fn duplicate_resource_names_keep_last_row() {
    let fixture = Fixture::new();
    let source = fixture.upload(
        "job.xlsx",
        &Column::ALL,
        &[row("kor_001", "Lalka"), row("kor_001", "Potop")],
    );

    let result = convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap();

    assert_eq!(result.documents, ["kor_001.xml"]);
    assert_eq!(result.duplicates, ["kor_001"]);
    let xml = archive_document(&result.archive, "kor_001.xml");
    assert!(xml.contains(r#"<title xml:lang="pol">Potop</title>"#));
}

#[test]
fn upload_is_stored_under_job_name_then_removed() {
    let fixture = Fixture::new();
    let original = fixture.dir.path().join("metadane korpusu.xlsx");
    write_sheet(&original, &Column::ALL, &[row("kor_001", "Lalka")]);
    let bytes = fs::read(&original).unwrap();

    let result = convert_upload(
        &bytes,
        "metadane korpusu.xlsx",
        "Anna Nowak",
        &fixture.services(),
    )
    .unwrap();

    let expected = "2024-02-29_091500_Anna_Nowak_metadane_korpusu";
    assert_eq!(result.source, fixture.storage().join(format!("{expected}.xlsx")));
    assert_eq!(result.archive, fixture.storage().join(format!("{expected}.zip")));
    assert_eq!(fixture.storage_entries(), [format!("{expected}.zip")]);
    assert!(original.exists());
}

#[test]
fn listing_shows_produced_archives() {
    let fixture = Fixture::new();
    let source = fixture.upload("job.xlsx", &Column::ALL, &[row("kor_001", "Lalka")]);
    convert(ConversionJob::new(&source, "Anna"), &fixture.services()).unwrap();

    let listings = fixture.store.list_archives().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "job.zip");
    assert!(listings[0].size_bytes > 0);
}
