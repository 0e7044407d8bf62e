//! Row-to-record mapping and the external-reference skip rule.

use tracing::trace;

use cmdi_model::{CellValue, Column, MetadataRecord};

use crate::error::{IngestError, Result};
use crate::normalize::normalize_cell;
use crate::workbook::Row;

/// Substring marking a `resourceName` as a link to an external resource.
pub const EXTERNAL_REFERENCE_MARKER: &str = "http://";

/// Returns true when the row's raw `resourceName` points at an external URL.
///
/// Such rows describe resources held elsewhere and produce no document.
pub fn is_external_reference(row: &Row) -> bool {
    row.get(Column::ResourceName.as_str())
        .is_some_and(|cell| match cell.as_text() {
            Some(text) => text.contains(EXTERNAL_REFERENCE_MARKER),
            None => cell.to_string().contains(EXTERNAL_REFERENCE_MARKER),
        })
}

/// Checks a sheet header for every required column.
///
/// Run once per sheet so a missing column fails the job before any
/// document is written.
pub fn check_schema(headers: &[String]) -> Result<()> {
    for column in Column::ALL {
        if !headers.iter().any(|header| header == column.as_str()) {
            return Err(IngestError::MissingColumn {
                column: column.as_str().to_string(),
                row: None,
            });
        }
    }
    Ok(())
}

/// Build a [`MetadataRecord`] from one row.
///
/// Every field except `sex` and `DistributionType` goes through
/// [`normalize_cell`]; those two keep the raw cell.
pub fn map_row(row: &Row) -> Result<MetadataRecord> {
    let text = |column: Column| cell(row, column).map(normalize_cell);

    let record = MetadataRecord {
        resource_name: text(Column::ResourceName)?,
        title: text(Column::Title)?,
        publication_date: text(Column::PublicationDate)?,
        publication_place: text(Column::PublicationPlace)?,
        last_name: text(Column::LastName)?,
        first_name: text(Column::FirstName)?,
        pseudonym: text(Column::Pseudonym)?,
        sex: cell(row, Column::Sex)?.clone(),
        genre: text(Column::Genre)?,
        subject: text(Column::Subject)?,
        functional_style: text(Column::FunctionalStyle)?,
        original_source: text(Column::OriginalSource)?,
        keyword: text(Column::Keyword)?,
        modalities: text(Column::Modalities)?,
        translated: text(Column::Translated)?,
        translator_name: text(Column::TranslatorName)?,
        translation_date: text(Column::TranslationDate)?,
        key: text(Column::Key)?,
        description: text(Column::Description)?,
        language_name: text(Column::LanguageName)?,
        iso_639_3_code: text(Column::Iso6393Code)?,
        distribution_type: cell(row, Column::DistributionType)?.clone(),
        license_name: text(Column::LicenseName)?,
        license_url: text(Column::LicenseUrl)?,
        non_commercial_usage_only: text(Column::NonCommercialUsageOnly)?,
        usage_report_required: text(Column::UsageReportRequired)?,
        modifications_require_redeposition: text(Column::ModificationsRequireRedeposition)?,
    };
    trace!(
        row = row.number(),
        sex = record.sex.kind(),
        distribution_type = record.distribution_type.kind(),
        "mapped row"
    );
    Ok(record)
}

fn cell(row: &Row, column: Column) -> Result<&CellValue> {
    row.get(column.as_str())
        .ok_or_else(|| IngestError::MissingColumn {
            column: column.as_str().to_string(),
            row: Some(row.number()),
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;

    fn full_headers() -> Arc<[String]> {
        Column::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }

    fn row_with(values: &[(Column, CellValue)]) -> Row {
        let headers = full_headers();
        let mut cells = vec![CellValue::Empty; headers.len()];
        for (column, value) in values {
            let idx = Column::ALL.iter().position(|c| c == column).unwrap();
            cells[idx] = value.clone();
        }
        Row::new(3, headers, cells)
    }

    #[test]
    fn http_resource_name_is_external() {
        let row = row_with(&[(Column::ResourceName, CellValue::from("http://example.org/x"))]);
        assert!(is_external_reference(&row));
    }

    #[test]
    fn https_and_plain_names_are_not_external() {
        let https = row_with(&[(Column::ResourceName, CellValue::from("https://example.org/x"))]);
        let plain = row_with(&[(Column::ResourceName, CellValue::from("kor_001"))]);
        assert!(!is_external_reference(&https));
        assert!(!is_external_reference(&plain));
    }

    #[test]
    fn check_schema_reports_first_missing_column() {
        let headers: Vec<String> = Column::ALL
            .iter()
            .filter(|c| **c != Column::Genre)
            .map(|c| c.as_str().to_string())
            .collect();
        let err = check_schema(&headers).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column, row: None } if column == "Genre"
        ));
    }

    #[test]
    fn map_row_normalizes_empty_cells() {
        let row = row_with(&[(Column::ResourceName, CellValue::from("kor_001"))]);
        let record = map_row(&row).unwrap();
        assert_eq!(record.resource_name, "kor_001");
        assert_eq!(record.publication_date, "");
        assert_eq!(record.sex, CellValue::Empty);
    }

    #[test]
    fn map_row_keeps_raw_pass_through_cells() {
        let row = row_with(&[
            (Column::ResourceName, CellValue::from("kor_001")),
            (Column::Sex, CellValue::Error("#N/A".to_string())),
            (Column::Translated, CellValue::Error("#N/A".to_string())),
        ]);
        let record = map_row(&row).unwrap();
        assert_eq!(record.sex, CellValue::Error("#N/A".to_string()));
        assert_eq!(record.translated, "");
    }

    #[test]
    fn map_row_missing_column_names_row() {
        let headers: Arc<[String]> = vec!["resourceName".to_string()].into();
        let row = Row::new(7, headers, vec![CellValue::from("kor_001")]);
        let err = map_row(&row).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { row: Some(7), .. }));
    }

    proptest! {
        #[test]
        fn any_name_with_marker_is_skipped(prefix in "[a-z ]{0,8}", suffix in "[a-z./]{0,12}") {
            let name = format!("{prefix}http://{suffix}");
            let row = row_with(&[(Column::ResourceName, CellValue::from(name.as_str()))]);
            prop_assert!(is_external_reference(&row));
        }

        #[test]
        fn null_cells_map_to_empty_strings(idx in 0usize..27) {
            let column = Column::ALL[idx];
            prop_assume!(!column.is_pass_through());
            let row = row_with(&[(column, CellValue::Float(f64::NAN))]);
            let record = map_row(&row).unwrap();
            prop_assert_eq!(record.value(column), "");
        }
    }
}
