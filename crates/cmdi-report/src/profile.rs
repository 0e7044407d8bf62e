//! The CMDI schema contract targeted by every generated document.

/// Default CMD document namespace.
pub const CMD_NS: &str = "http://www.clarin.eu/cmd/";

/// XML Schema instance namespace (for `xsi:schemaLocation`).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Reserved XML namespace carrying `xml:lang`.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Component registry profile `clarin.eu:cr1:p_1487686159252`.
pub const PROFILE_URI: &str = "https://catalog.clarin.eu/ds/ComponentRegistry/rest/registry/1.1/profiles/clarin.eu:cr1:p_1487686159252/xsd";

/// Schema document paired with [`CMD_NS`] in `xsi:schemaLocation`.
pub const SCHEMA_LOCATION_URI: &str = PROFILE_URI;

/// Value of the root `CMDVersion` attribute.
pub const CMD_VERSION: &str = "1.1";

/// Mime type advertised on the resource proxy.
pub const RESOURCE_MIME_TYPE: &str = "text/plain";

/// Namespace and profile table used by the document builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub cmd_namespace: String,
    pub xsi_namespace: String,
    pub schema_location: String,
    pub profile_uri: String,
    pub cmd_version: String,
    pub resource_mime_type: String,
}

impl ProfileConfig {
    /// Value of `xsi:schemaLocation`: namespace and schema URI pair.
    pub fn schema_location_attr(&self) -> String {
        format!("{} {}", self.cmd_namespace, self.schema_location)
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            cmd_namespace: CMD_NS.to_string(),
            xsi_namespace: XSI_NS.to_string(),
            schema_location: SCHEMA_LOCATION_URI.to_string(),
            profile_uri: PROFILE_URI.to_string(),
            cmd_version: CMD_VERSION.to_string(),
            resource_mime_type: RESOURCE_MIME_TYPE.to_string(),
        }
    }
}
