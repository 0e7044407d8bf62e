#![deny(unsafe_code)]

use std::fmt;

use uuid::Uuid;

use crate::ModelError;

/// Identifier binding a metadata component to its resource proxy.
///
/// Always `res_` followed by a hyphenated UUID. Minted once per record and
/// unique within a conversion job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceIdentifier(String);

impl ResourceIdentifier {
    pub const PREFIX: &'static str = "res_";

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("{}{}", Self::PREFIX, uuid.hyphenated()))
    }

    /// Mint a fresh random identifier.
    pub fn new_v4() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let uuid = value
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .ok_or_else(|| ModelError::InvalidResourceIdentifier(value.to_string()))?;
        Ok(Self::from_uuid(uuid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
