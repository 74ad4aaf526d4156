/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Marshalling configuration.
//!
//! This module provides the options that shape a marshalled document.

use ironofx_sgml::OfxVersion;
use ironofx_sgml::writer::NONE;

/// Configuration for writing an OFX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalConfig {
    /// Wire format version to write.
    pub version: OfxVersion,
    /// Whether OFX 1 output puts a line break after every tag.
    pub attributes_on_new_line: bool,
    /// `SECURITY` header written when the document does not set one.
    pub default_security: String,
    /// `OLDFILEUID` and `NEWFILEUID` headers written when the document does not set them.
    pub default_file_uid: String,
}

impl MarshalConfig {
    /// Creates a configuration for the given version.
    ///
    /// # Arguments
    /// * `version` - The wire format version
    #[must_use]
    pub fn new(version: OfxVersion) -> Self {
        Self {
            version,
            attributes_on_new_line: false,
            default_security: NONE.to_string(),
            default_file_uid: NONE.to_string(),
        }
    }

    /// Sets the wire format version.
    #[must_use]
    pub fn with_version(mut self, version: OfxVersion) -> Self {
        self.version = version;
        self
    }

    /// Puts a line break after every tag of OFX 1 output.
    #[must_use]
    pub fn with_attributes_on_new_line(mut self, enabled: bool) -> Self {
        self.attributes_on_new_line = enabled;
        self
    }

    /// Sets the default `SECURITY` header.
    #[must_use]
    pub fn with_default_security(mut self, security: impl Into<String>) -> Self {
        self.default_security = security.into();
        self
    }

    /// Sets the default file UID headers.
    #[must_use]
    pub fn with_default_file_uid(mut self, uid: impl Into<String>) -> Self {
        self.default_file_uid = uid.into();
        self
    }

    /// Default value of a document header, if this configuration supplies one.
    #[must_use]
    pub fn default_header(&self, name: &str) -> Option<&str> {
        match name {
            "SECURITY" => Some(&self.default_security),
            "OLDFILEUID" | "NEWFILEUID" => Some(&self.default_file_uid),
            _ => None,
        }
    }
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self::new(OfxVersion::default())
    }
}
