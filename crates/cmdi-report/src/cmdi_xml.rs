//! CMDI document generation.
//!
//! Each section of the document (`Header`, `Resource`, `Components`) is
//! assembled by its own method and returned as a finished [`Element`]; the
//! element order inside each section is fixed by the component profile.
//!
//! Cell text may carry control characters XML 1.0 cannot represent; such a
//! document is refused at write time rather than stripped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use tracing::debug;

use cmdi_model::{Column, MetadataRecord, ResourceIdentifier};

use crate::element::Element;
use crate::error::{ReportError, Result};
use crate::profile::ProfileConfig;

/// Format of `MdCreationDate`.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LANG_POLISH: &str = "pol";
const LANG_ENGLISH: &str = "eng";

/// A complete CMD document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdiDocument {
    root: Element,
}

impl CmdiDocument {
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First character XML 1.0 forbids, with the element holding it.
    pub fn invalid_char(&self) -> Option<(&str, char)> {
        self.root.invalid_char()
    }

    /// Serialize with an XML declaration and two-space indentation.
    ///
    /// Fails with `InvalidData` when the tree holds a forbidden character.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<W> {
        if let Some((element, c)) = self.invalid_char() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                invalid_char_message(element, c),
            ));
        }
        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write(&mut xml)?;
        let mut inner = xml.into_inner();
        inner.write_all(b"\n")?;
        Ok(inner)
    }

    pub fn to_xml_string(&self) -> std::io::Result<String> {
        let bytes = self.write_to(Vec::new())?;
        String::from_utf8(bytes).map_err(std::io::Error::other)
    }
}

/// Builds CMD documents for the `TextBasicInformation` profile.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    profile: ProfileConfig,
}

impl DocumentBuilder {
    pub fn new(profile: ProfileConfig) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ProfileConfig {
        &self.profile
    }

    /// Assemble the full document for one record.
    ///
    /// `created_at` becomes `MdCreationDate`; the caller supplies the clock
    /// reading so the builder stays deterministic.
    pub fn build(
        &self,
        record: &MetadataRecord,
        creator: &str,
        resource_id: &ResourceIdentifier,
        created_at: NaiveDateTime,
    ) -> CmdiDocument {
        let profile = &self.profile;
        let root = Element::new("CMD")
            .with_attr("xmlns", profile.cmd_namespace.as_str())
            .with_attr("xmlns:xsi", profile.xsi_namespace.as_str())
            .with_attr("xsi:schemaLocation", profile.schema_location_attr())
            .with_attr("CMDVersion", profile.cmd_version.as_str())
            .with_child(self.header(creator, created_at))
            .with_child(self.resources(resource_id))
            .with_child(self.components(record, resource_id));
        CmdiDocument { root }
    }

    pub fn header(&self, creator: &str, created_at: NaiveDateTime) -> Element {
        Element::new("Header").with_children([
            Element::text_node("MdCreator", creator),
            Element::text_node(
                "MdCreationDate",
                created_at.format(CREATION_DATE_FORMAT).to_string(),
            ),
            Element::text_node("MdProfile", self.profile.profile_uri.as_str()),
        ])
    }

    pub fn resources(&self, resource_id: &ResourceIdentifier) -> Element {
        let proxy = Element::new("ResourceProxy")
            .with_attr("id", resource_id.as_str())
            .with_child(
                Element::text_node("ResourceType", "Resource")
                    .with_attr("mimetype", self.profile.resource_mime_type.as_str()),
            )
            .with_child(Element::text_node("ResourceRef", ""));
        Element::new("Resource").with_children([
            Element::new("ResourceProxyList").with_child(proxy),
            Element::new("JournalFileProxyList"),
            Element::new("ResourceRelationList"),
        ])
    }

    pub fn components(&self, record: &MetadataRecord, resource_id: &ResourceIdentifier) -> Element {
        Element::new("Components").with_child(text_basic_information(record, resource_id))
    }
}

fn text_basic_information(record: &MetadataRecord, resource_id: &ResourceIdentifier) -> Element {
    let field = |name: &str, column: Column| Element::text_node(name, record.value(column));

    let author = Element::new("author").with_children([
        field("lastName", Column::LastName),
        field("firstName", Column::FirstName),
        field("pseudonym", Column::Pseudonym),
        field("sex", Column::Sex),
    ]);
    let bibliographic = Element::new("TextBibliographic").with_children([
        field("title", Column::Title).with_lang(LANG_POLISH),
        field("publicationDate", Column::PublicationDate),
        field("publicationPlace", Column::PublicationPlace),
        Element::new("Authors").with_child(author),
    ]);

    let language = Element::new("Language").with_children([
        field("LanguageName", Column::LanguageName).with_lang(LANG_ENGLISH),
        Element::new("ISO639").with_child(field("iso-639-3-code", Column::Iso6393Code)),
    ]);
    let content = Element::new("ResourceContent").with_children([
        field("genre", Column::Genre).with_lang(LANG_ENGLISH),
        field("subject", Column::Subject),
        field("functionalStyle", Column::FunctionalStyle),
        field("originalSource", Column::OriginalSource),
        field("keyword", Column::Keyword),
        Element::new("ModalityInfo")
            .with_children([field("Modalities", Column::Modalities), descriptions("")]),
        Element::new("Translation").with_children([
            field("translated", Column::Translated),
            field("translatorName", Column::TranslatorName),
            field("translationDate", Column::TranslationDate),
        ]),
        Element::new("Keys").with_child(field("Key", Column::Key)),
        descriptions(&record.description),
        Element::new("SubjectLanguages").with_children([language, descriptions("")]),
    ]);

    let license = Element::new("License").with_children([
        field("DistributionType", Column::DistributionType),
        field("LicenseName", Column::LicenseName),
        field("LicenseURL", Column::LicenseUrl),
        field("NonCommercialUsageOnly", Column::NonCommercialUsageOnly),
        field("UsageReportRequired", Column::UsageReportRequired),
        field(
            "ModificationsRequireRedeposition",
            Column::ModificationsRequireRedeposition,
        ),
    ]);

    Element::new("TextBasicInformation")
        .with_attr("ref", resource_id.as_str())
        .with_children([
            field("resourceName", Column::ResourceName).with_lang(LANG_POLISH),
            bibliographic,
            content,
            license,
        ])
}

/// A `Descriptions` list holding one `Description`.
fn descriptions(text: &str) -> Element {
    Element::new("Descriptions").with_child(Element::text_node("Description", text))
}

/// File name of the document generated for `resource_name`.
///
/// Names must stay inside the working directory: empty names, `.`/`..`,
/// and path separators are rejected.
pub fn document_file_name(resource_name: &str) -> Result<String> {
    let invalid = |reason| ReportError::InvalidResourceName {
        name: resource_name.to_string(),
        reason,
    };
    if resource_name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if resource_name == "." || resource_name == ".." {
        return Err(invalid("name is a relative directory"));
    }
    if resource_name.contains(['/', '\\', '\0']) {
        return Err(invalid("name contains a path separator"));
    }
    Ok(format!("{resource_name}.xml"))
}

fn invalid_char_message(element: &str, c: char) -> String {
    format!(
        "<{element}> contains U+{:04X}, not allowed in XML",
        u32::from(c)
    )
}

/// Write `document` to `<dir>/<resource_name>.xml`.
///
/// A document holding a forbidden character fails before the file is created.
pub fn write_document(document: &CmdiDocument, dir: &Path, resource_name: &str) -> Result<PathBuf> {
    let path = dir.join(document_file_name(resource_name)?);
    if let Some((element, c)) = document.invalid_char() {
        return Err(ReportError::DocumentWrite {
            message: invalid_char_message(element, c),
            path,
        });
    }
    let write_error = |error: std::io::Error| ReportError::DocumentWrite {
        path: path.clone(),
        message: error.to_string(),
    };
    let file = File::create(&path).map_err(write_error)?;
    let mut writer = document.write_to(BufWriter::new(file)).map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    debug!(path = %path.display(), "wrote document");
    Ok(path)
}
