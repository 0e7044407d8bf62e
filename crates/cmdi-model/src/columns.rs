//! Required spreadsheet columns.
//!
//! Every input sheet must carry all of these headers (exact, case-sensitive
//! names after trimming). Extra columns are ignored.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// One required column of the input spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    ResourceName,
    Title,
    PublicationDate,
    PublicationPlace,
    LastName,
    FirstName,
    Pseudonym,
    Sex,
    Genre,
    Subject,
    FunctionalStyle,
    OriginalSource,
    Keyword,
    Modalities,
    Translated,
    TranslatorName,
    TranslationDate,
    Key,
    Description,
    LanguageName,
    Iso6393Code,
    DistributionType,
    LicenseName,
    LicenseUrl,
    NonCommercialUsageOnly,
    UsageReportRequired,
    ModificationsRequireRedeposition,
}

impl Column {
    /// All required columns in sheet order.
    pub const ALL: [Column; 27] = [
        Column::ResourceName,
        Column::Title,
        Column::PublicationDate,
        Column::PublicationPlace,
        Column::LastName,
        Column::FirstName,
        Column::Pseudonym,
        Column::Sex,
        Column::Genre,
        Column::Subject,
        Column::FunctionalStyle,
        Column::OriginalSource,
        Column::Keyword,
        Column::Modalities,
        Column::Translated,
        Column::TranslatorName,
        Column::TranslationDate,
        Column::Key,
        Column::Description,
        Column::LanguageName,
        Column::Iso6393Code,
        Column::DistributionType,
        Column::LicenseName,
        Column::LicenseUrl,
        Column::NonCommercialUsageOnly,
        Column::UsageReportRequired,
        Column::ModificationsRequireRedeposition,
    ];

    /// Header text as it appears in the spreadsheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::ResourceName => "resourceName",
            Column::Title => "Title",
            Column::PublicationDate => "PublicationDate",
            Column::PublicationPlace => "PublicationPlace",
            Column::LastName => "lastName",
            Column::FirstName => "firstName",
            Column::Pseudonym => "pseudonym",
            Column::Sex => "sex",
            Column::Genre => "Genre",
            Column::Subject => "Subject",
            Column::FunctionalStyle => "functionalStyle",
            Column::OriginalSource => "originalSource",
            Column::Keyword => "keyword",
            Column::Modalities => "Modalities",
            Column::Translated => "translated",
            Column::TranslatorName => "translatorName",
            Column::TranslationDate => "translationDate",
            Column::Key => "Key",
            Column::Description => "Description",
            Column::LanguageName => "LanguageName",
            Column::Iso6393Code => "iso-639-3-code",
            Column::DistributionType => "DistributionType",
            Column::LicenseName => "LicenseName",
            Column::LicenseUrl => "LicenseURL",
            Column::NonCommercialUsageOnly => "NonCommercialUsageOnly",
            Column::UsageReportRequired => "UsageReportRequired",
            Column::ModificationsRequireRedeposition => "ModificationsRequireRedeposition",
        }
    }

    /// Columns copied into the record as raw cells instead of normalized text.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Column::Sex | Column::DistributionType)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|column| column.as_str() == trimmed)
            .ok_or_else(|| ModelError::UnknownColumn(s.to_string()))
    }
}
