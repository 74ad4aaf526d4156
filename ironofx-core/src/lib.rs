/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOfx Core
//!
//! Core types, traits, and error definitions for the IronOfx aggregate engine.
//!
//! This crate provides the fundamental building blocks used across all IronOfx crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Scalar values**: `ScalarKind`, `ScalarValue`, and the `WireScalar` trait
//! - **Conversion**: `StringConversion` and the OFX date/boolean/number rules
//! - **Status codes**: `StatusCode`, `KnownCode`, `Severity`

pub mod conversion;
pub mod error;
pub mod status;
pub mod value;

pub use conversion::{DefaultStringConversion, StringConversion, format_date, parse_date};
pub use error::{ConversionError, MarshalError, MetadataError, OfxError, ParseError, Result};
pub use status::{KnownCode, Severity, StatusCode};
pub use value::{EnumKeys, ScalarKind, ScalarValue, WireScalar};
