/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Scalar value model.
//!
//! This module provides:
//! - [`ScalarKind`]: Type tag describing what a leaf element holds
//! - [`ScalarValue`]: A dynamically typed leaf value
//! - [`WireScalar`]: Trait connecting Rust field types to the value model
//! - [`wire_enum!`](crate::wire_enum): Declares an enumeration with wire keys

use crate::error::ConversionError;
use crate::status::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Declared key set of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumKeys {
    /// Name of the enumeration type.
    pub name: &'static str,
    /// Keys accepted on the wire.
    pub keys: &'static [&'static str],
}

impl EnumKeys {
    /// Returns the declared key equal to `text`, if any.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&'static str> {
        self.keys.iter().copied().find(|key| *key == text)
    }
}

/// Type tag for a leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Free text.
    Text,
    /// Floating point number.
    Number,
    /// Integer number.
    Integer,
    /// Fixed-point decimal amount.
    Decimal,
    /// Boolean (Y/N).
    Boolean,
    /// Date and time, normalized to UTC.
    Date,
    /// Extensible status code.
    StatusCode,
    /// Enumeration with a declared key set.
    Enum(EnumKeys),
}

impl ScalarKind {
    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::StatusCode => "status code",
            Self::Enum(keys) => keys.name,
        }
    }
}

/// A leaf value read from or written to the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScalarValue {
    /// Free text.
    Text(String),
    /// Floating point number.
    Number(f64),
    /// Integer number.
    Integer(i64),
    /// Fixed-point decimal amount.
    Decimal(Decimal),
    /// Boolean value.
    Boolean(bool),
    /// UTC instant.
    Date(DateTime<Utc>),
    /// Status code.
    StatusCode(StatusCode),
    /// Enumeration key.
    Enum(&'static str),
}

impl ScalarValue {
    /// Returns a short name of the value's kind for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::StatusCode(_) => "status code",
            Self::Enum(_) => "enumeration",
        }
    }

    /// Returns the value as a string slice, if it is a Text variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn mismatch(self, expected: &str) -> ConversionError {
        ConversionError::TypeMismatch {
            expected: expected.to_string(),
            found: self.kind_name().to_string(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", if *v { "Y" } else { "N" }),
            Self::Date(d) => write!(f, "{}", d),
            Self::StatusCode(c) => write!(f, "{}", c),
            Self::Enum(k) => write!(f, "{}", k),
        }
    }
}

/// A Rust type that can be stored in a leaf element.
///
/// Implemented for the primitive types used by OFX aggregates and, through
/// [`wire_enum!`](crate::wire_enum), for enumerations.
pub trait WireScalar: Sized {
    /// The kind tag used to convert wire text for this type.
    const KIND: ScalarKind;

    /// Wraps the value.
    fn into_scalar(self) -> ScalarValue;

    /// Unwraps a value of the matching kind.
    ///
    /// # Errors
    /// Returns `ConversionError::TypeMismatch` if the value has another kind.
    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError>;
}

impl WireScalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Text(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::Text(s) => Ok(s),
            ScalarValue::Enum(k) => Ok(k.to_string()),
            other => Err(other.mismatch("text")),
        }
    }
}

impl WireScalar for f64 {
    const KIND: ScalarKind = ScalarKind::Number;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Number(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::Number(v) => Ok(v),
            ScalarValue::Integer(v) => Ok(v as f64),
            other => Err(other.mismatch("number")),
        }
    }
}

impl WireScalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Boolean(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::Boolean(v) => Ok(v),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl WireScalar for Decimal {
    const KIND: ScalarKind = ScalarKind::Decimal;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Decimal(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::Decimal(v) => Ok(v),
            ScalarValue::Integer(v) => Ok(Decimal::from(v)),
            other => Err(other.mismatch("decimal")),
        }
    }
}

impl WireScalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::Date;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Date(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::Date(d) => Ok(d),
            other => Err(other.mismatch("date")),
        }
    }
}

impl WireScalar for StatusCode {
    const KIND: ScalarKind = ScalarKind::StatusCode;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::StatusCode(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
        match value {
            ScalarValue::StatusCode(c) => Ok(c),
            other => Err(other.mismatch("status code")),
        }
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),+) => {
        $(
            impl WireScalar for $ty {
                const KIND: ScalarKind = ScalarKind::Integer;

                fn into_scalar(self) -> ScalarValue {
                    ScalarValue::Integer(i64::from(self))
                }

                fn from_scalar(value: ScalarValue) -> Result<Self, ConversionError> {
                    match value {
                        ScalarValue::Integer(v) => <$ty>::try_from(v)
                            .map_err(|_| ConversionError::InvalidNumber(v.to_string())),
                        other => Err(other.mismatch(stringify!($ty))),
                    }
                }
            }
        )+
    };
}

integer_scalar!(i32, i64, u32);

/// Declares an enumeration whose variants travel on the wire as fixed keys.
///
/// The generated type implements [`WireScalar`] with kind
/// [`ScalarKind::Enum`]; converting a key outside the declared set fails with
/// [`ConversionError::UnknownEnumKey`].
///
/// # Example
///
/// ```ignore
/// wire_enum! {
///     pub enum AccountType {
///         Checking => "CHECKING",
///         Savings => "SAVINGS",
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Keys accepted on the wire, in declaration order.
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            /// Returns the wire key of this variant.
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.key())
            }
        }

        impl $crate::value::WireScalar for $name {
            const KIND: $crate::value::ScalarKind =
                $crate::value::ScalarKind::Enum($crate::value::EnumKeys {
                    name: stringify!($name),
                    keys: Self::KEYS,
                });

            fn into_scalar(self) -> $crate::value::ScalarValue {
                $crate::value::ScalarValue::Enum(self.key())
            }

            fn from_scalar(
                value: $crate::value::ScalarValue,
            ) -> ::std::result::Result<Self, $crate::error::ConversionError> {
                let key: &str = match &value {
                    $crate::value::ScalarValue::Enum(key) => *key,
                    $crate::value::ScalarValue::Text(text) => text.as_str(),
                    other => {
                        return Err($crate::error::ConversionError::TypeMismatch {
                            expected: stringify!($name).to_string(),
                            found: other.kind_name().to_string(),
                        });
                    }
                };
                match key {
                    $($key => Ok(Self::$variant),)+
                    unknown => Err($crate::error::ConversionError::UnknownEnumKey {
                        key: unknown.to_string(),
                        expected: stringify!($name),
                    }),
                }
            }
        }
    };
}
