//! Typed metadata record built from one spreadsheet row.

use std::borrow::Cow;

use crate::{CellValue, Column};

/// One eligible spreadsheet row, one field per required column.
///
/// Normalized fields are never null: a missing cell is the empty string.
/// `sex` and `distribution_type` keep the raw cell as read from the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataRecord {
    pub resource_name: String,
    pub title: String,
    pub publication_date: String,
    pub publication_place: String,
    pub last_name: String,
    pub first_name: String,
    pub pseudonym: String,
    pub sex: CellValue,
    pub genre: String,
    pub subject: String,
    pub functional_style: String,
    pub original_source: String,
    pub keyword: String,
    pub modalities: String,
    pub translated: String,
    pub translator_name: String,
    pub translation_date: String,
    pub key: String,
    pub description: String,
    pub language_name: String,
    pub iso_639_3_code: String,
    pub distribution_type: CellValue,
    pub license_name: String,
    pub license_url: String,
    pub non_commercial_usage_only: String,
    pub usage_report_required: String,
    pub modifications_require_redeposition: String,
}

impl MetadataRecord {
    /// Text of the field backing `column`, as it will be written to XML.
    pub fn value(&self, column: Column) -> Cow<'_, str> {
        let text = match column {
            Column::ResourceName => &self.resource_name,
            Column::Title => &self.title,
            Column::PublicationDate => &self.publication_date,
            Column::PublicationPlace => &self.publication_place,
            Column::LastName => &self.last_name,
            Column::FirstName => &self.first_name,
            Column::Pseudonym => &self.pseudonym,
            Column::Sex => return raw_text(&self.sex),
            Column::Genre => &self.genre,
            Column::Subject => &self.subject,
            Column::FunctionalStyle => &self.functional_style,
            Column::OriginalSource => &self.original_source,
            Column::Keyword => &self.keyword,
            Column::Modalities => &self.modalities,
            Column::Translated => &self.translated,
            Column::TranslatorName => &self.translator_name,
            Column::TranslationDate => &self.translation_date,
            Column::Key => &self.key,
            Column::Description => &self.description,
            Column::LanguageName => &self.language_name,
            Column::Iso6393Code => &self.iso_639_3_code,
            Column::DistributionType => return raw_text(&self.distribution_type),
            Column::LicenseName => &self.license_name,
            Column::LicenseUrl => &self.license_url,
            Column::NonCommercialUsageOnly => &self.non_commercial_usage_only,
            Column::UsageReportRequired => &self.usage_report_required,
            Column::ModificationsRequireRedeposition => &self.modifications_require_redeposition,
        };
        Cow::Borrowed(text.as_str())
    }
}

/// Render a pass-through cell without normalization.
fn raw_text(cell: &CellValue) -> Cow<'_, str> {
    match cell {
        CellValue::Text(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
