/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Error types for the IronOfx aggregate marshalling engine.
//!
//! This module provides a unified error hierarchy using `thiserror`. Every fatal
//! condition surfaces as an [`OfxError`]; the variant tells parse-time failures
//! apart from general engine failures.

use thiserror::Error;

/// Result type alias using [`OfxError`] as the error type.
pub type Result<T> = std::result::Result<T, OfxError>;

/// Top-level error type for all IronOfx operations.
#[derive(Debug, Error)]
pub enum OfxError {
    /// Structural error while reading OFX text.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Contract violation while marshalling an object graph.
    #[error("marshal error: {0}")]
    Marshal(#[from] MarshalError),

    /// A scalar value could not be converted to or from its wire form.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Aggregate metadata is missing or inconsistent.
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// I/O error from an underlying sink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OfxError {
    /// Returns true if this error was raised while parsing OFX text.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Structural errors raised while reading OFX text. Always fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `<OFX` root marker was never found.
    #[error("invalid OFX: no root <OFX> element")]
    NoRootElement,

    /// The first aggregate does not match the root type's wire name.
    #[error("unexpected root element: expected {expected}, found {found}")]
    UnexpectedRoot {
        /// Wire name of the root type.
        expected: String,
        /// Name actually found.
        found: String,
    },

    /// An end tag does not match the innermost open tag.
    #[error("unexpected end tag: expected </{expected}>, found </{found}>")]
    UnexpectedEndTag {
        /// The innermost open tag.
        expected: String,
        /// The end tag encountered.
        found: String,
    },

    /// An aggregate end does not match the aggregate being built.
    #[error(
        "unexpected end aggregate {found}. (Perhaps {expected} is an element with an empty value, making it impossible to parse.)"
    )]
    UnexpectedEndAggregate {
        /// The aggregate currently being built.
        expected: String,
        /// The aggregate end encountered.
        found: String,
    },

    /// Character data appeared outside of the root element.
    #[error("illegal character data outside main OFX root element: \"{0}\"")]
    IllegalCharacters(String),

    /// The event stack reached a state the grammar does not allow.
    #[error("illegal OFX event: {0}")]
    IllegalEvent(String),

    /// The markup could not be tokenized.
    #[error("malformed markup at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset into the markup.
        offset: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A tag was still open at the end of well-formed (v2) input.
    #[error("unclosed tag at end of input: <{0}>")]
    UnclosedTag(String),
}

/// Errors raised while marshalling an object graph. Always fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// The object's type carries no aggregate metadata.
    #[error("unable to marshal object of type {0} (no aggregate metadata found)")]
    NotAnAggregate(String),

    /// A required attribute read as absent.
    #[error("required {attribute} is null or empty")]
    MissingRequired {
        /// Description of the attribute, e.g. `Element 'UNITS'`.
        attribute: String,
    },

    /// A writer was asked to emit an element with an empty value.
    #[error("illegal element value for element '{name}' (value must not be null or empty)")]
    EmptyElementValue {
        /// Element name.
        name: String,
    },

    /// A writer was asked to emit its header block twice.
    #[error("headers have already been written")]
    HeadersAlreadyWritten,
}

/// Errors converting a scalar to or from its wire text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// An enumeration value is not one of the declared keys.
    #[error("unknown key '{key}' for enumeration {expected}")]
    UnknownEnumKey {
        /// The key found on the wire.
        key: String,
        /// The enumeration type.
        expected: &'static str,
    },

    /// Text is not a valid number.
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// Text is not a valid OFX date.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Text is not a numeric status code.
    #[error("invalid status code: {0}")]
    InvalidStatusCode(String),

    /// A value of one kind was handed to a slot of another kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Kind the slot accepts.
        expected: String,
        /// Kind that was supplied.
        found: String,
    },
}

/// Errors in aggregate metadata registration and lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// No aggregate metadata is registered for the type.
    #[error("no aggregate metadata registered for type {0}")]
    NotRegistered(String),

    /// A descriptor was added through the wrong registration call.
    #[error("descriptor {descriptor} cannot be added as {expected}")]
    KindMismatch {
        /// Description of the descriptor.
        descriptor: String,
        /// The kind the registration call accepts.
        expected: &'static str,
    },

    /// A child aggregate without an explicit name refers to a type without a wire name.
    #[error("illegal child aggregate type '{0}': a child aggregate name must be specified")]
    UnnamedChild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::UnexpectedEndAggregate {
            expected: "MEMO".to_string(),
            found: "STMTTRN".to_string(),
        };
        assert!(err.to_string().contains("Perhaps MEMO is an element with an empty value"));
    }

    #[test]
    fn test_ofx_error_from_parse() {
        let err: OfxError = ParseError::NoRootElement.into();
        assert!(err.is_parse_error());
        assert!(matches!(err, OfxError::Parse(ParseError::NoRootElement)));
    }

    #[test]
    fn test_marshal_error_is_not_parse_error() {
        let err: OfxError = MarshalError::MissingRequired {
            attribute: "Element 'UNITS'".to_string(),
        }
        .into();
        assert!(!err.is_parse_error());
        assert_eq!(
            err.to_string(),
            "marshal error: required Element 'UNITS' is null or empty"
        );
    }

    #[test]
    fn test_conversion_error_display() {
        let err = ConversionError::UnknownEnumKey {
            key: "MAYBE".to_string(),
            expected: "Severity",
        };
        assert_eq!(err.to_string(), "unknown key 'MAYBE' for enumeration Severity");
    }
}
