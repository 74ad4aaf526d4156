/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Reads OFX documents into aggregates.

use crate::builder::GraphBuilder;
use ironofx_core::{DefaultStringConversion, MetadataError, Result, StringConversion};
use ironofx_meta::{Aggregate, Registry};
use ironofx_sgml::{OfxReader, OfxVersion};
use std::borrow::Cow;
use tracing::debug;

/// Unmarshals OFX text into aggregates described by a [`Registry`].
#[derive(Debug, Clone)]
pub struct Unmarshaller<'r, C: StringConversion = DefaultStringConversion> {
    registry: &'r Registry,
    conversion: C,
}

impl<'r> Unmarshaller<'r, DefaultStringConversion> {
    /// Creates an unmarshaller with the default string conversion.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            conversion: DefaultStringConversion,
        }
    }
}

impl<'r, C: StringConversion> Unmarshaller<'r, C> {
    /// Replaces the string conversion.
    #[must_use]
    pub fn with_conversion<D: StringConversion>(self, conversion: D) -> Unmarshaller<'r, D> {
        Unmarshaller {
            registry: self.registry,
            conversion,
        }
    }

    /// The registry used to resolve aggregates.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Unmarshals a document whose root aggregate is `T`.
    ///
    /// # Errors
    /// Returns a `ParseError` for malformed documents, or
    /// `MetadataError::NotRegistered` if `T` has no wire name. Values that
    /// fail to convert are logged and dropped.
    pub fn unmarshal<T: Aggregate + Default>(&self, text: &str) -> Result<T> {
        let root = self.unmarshal_into(text, Box::new(T::default()))?;
        root.downcast::<T>()
            .map(|root| *root)
            .ok_or_else(|| MetadataError::NotRegistered(std::any::type_name::<T>().to_string()).into())
    }

    /// Unmarshals raw bytes, decoded as UTF-8 or else as ISO-8859-1.
    ///
    /// # Errors
    /// See [`Unmarshaller::unmarshal`].
    pub fn unmarshal_bytes<T: Aggregate + Default>(&self, bytes: &[u8]) -> Result<T> {
        self.unmarshal(&decode(bytes))
    }

    /// Unmarshals a document into `root`, returning the filled aggregate.
    ///
    /// # Errors
    /// See [`Unmarshaller::unmarshal`].
    pub fn unmarshal_into(&self, text: &str, root: Box<dyn Aggregate>) -> Result<Box<dyn Aggregate>> {
        self.unmarshal_versioned(text, root).map(|(root, _)| root)
    }

    /// Unmarshals a document into `root`, also returning its detected version.
    ///
    /// # Errors
    /// See [`Unmarshaller::unmarshal`].
    pub fn unmarshal_versioned(
        &self,
        text: &str,
        root: Box<dyn Aggregate>,
    ) -> Result<(Box<dyn Aggregate>, OfxVersion)> {
        let mut builder = GraphBuilder::with_conversion(self.registry, &self.conversion, root)?;
        let version = OfxReader::parse(text, &mut builder)?;
        debug!(%version, "Document unmarshalled");
        Ok((builder.finish()?, version))
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Input is not UTF-8; decoding as ISO-8859-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironofx_core::{ConversionError, OfxError, ParseError, ScalarKind, ScalarValue};
    use ironofx_derive::Aggregate;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq, Aggregate)]
    #[ofx(name = "OFX")]
    struct Envelope {
        #[ofx(header = "NEWFILEUID")]
        uid: Option<String>,
        #[ofx(element = "MEMO", order = 0)]
        memo: Option<String>,
        #[ofx(element = "ACTIVE", order = 10)]
        active: Option<bool>,
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.describe::<Envelope>().unwrap();
        registry
    }

    #[test]
    fn test_unmarshal_v1() {
        let registry = registry();
        let text = "OFXHEADER:100\r\nNEWFILEUID:abc\r\n\r\n<OFX><MEMO>hello &amp; bye<ACTIVE>Y</OFX>";
        let envelope: Envelope = Unmarshaller::new(&registry).unmarshal(text).unwrap();
        assert_eq!(
            envelope,
            Envelope {
                uid: Some("abc".to_string()),
                memo: Some("hello & bye".to_string()),
                active: Some(true),
            }
        );
    }

    #[test]
    fn test_unmarshal_versioned() {
        let registry = registry();
        let text = "<?OFX NEWFILEUID=\"x\"?><OFX><MEMO>m</MEMO></OFX>";
        let (root, version) = Unmarshaller::new(&registry)
            .unmarshal_versioned(text, Box::new(Envelope::default()))
            .unwrap();
        assert_eq!(version, OfxVersion::V2);
        let envelope = root.view::<Envelope>().unwrap();
        assert_eq!(envelope.uid.as_deref(), Some("x"));
        assert_eq!(envelope.memo.as_deref(), Some("m"));
    }

    #[test]
    fn test_unmarshal_latin1_bytes() {
        let registry = registry();
        let bytes = b"<OFX><MEMO>caf\xe9</OFX>";
        let envelope: Envelope = Unmarshaller::new(&registry).unmarshal_bytes(bytes).unwrap();
        assert_eq!(envelope.memo.as_deref(), Some("café"));
    }

    #[test]
    fn test_no_root_element() {
        let registry = registry();
        let err = Unmarshaller::new(&registry)
            .unmarshal::<Envelope>("OFXHEADER:100\r\n\r\n")
            .unwrap_err();
        assert!(matches!(err, OfxError::Parse(ParseError::NoRootElement)));
    }

    #[derive(Debug, Clone, Copy, Default)]
    struct ShoutingConversion;

    impl StringConversion for ShoutingConversion {
        fn to_wire(&self, value: &ScalarValue) -> String {
            DefaultStringConversion.to_wire(value).to_uppercase()
        }

        fn from_wire(
            &self,
            kind: ScalarKind,
            text: &str,
        ) -> std::result::Result<Option<ScalarValue>, ConversionError> {
            DefaultStringConversion.from_wire(kind, &text.to_uppercase())
        }
    }

    #[test]
    fn test_custom_conversion() {
        let registry = registry();
        let envelope: Envelope = Unmarshaller::new(&registry)
            .with_conversion(ShoutingConversion)
            .unmarshal("<OFX><MEMO>quiet<ACTIVE>y</OFX>")
            .unwrap();
        assert_eq!(envelope.memo.as_deref(), Some("QUIET"));
        assert_eq!(envelope.active, Some(true));
    }
}
