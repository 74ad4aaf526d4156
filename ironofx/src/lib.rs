/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOFX
//!
//! Open Financial Exchange (OFX) aggregate marshalling for Rust.
//!
//! IronOFX converts between OFX documents, in both the SGML dialect of OFX 1
//! and the XML dialect of OFX 2, and graphs of typed Rust structs. Each
//! struct describes its wire shape with `#[derive(Aggregate)]`; the engine
//! uses that metadata in both directions.
//!
//! ## Features
//!
//! - **Version detection**: OFX 1 and OFX 2 documents are told apart by their headers
//! - **Forgiving reads**: unknown elements and aggregates are logged and skipped
//! - **Ordered disambiguation**: a tag reused at several positions maps to the right field
//! - **Polymorphic lists**: list entries are typed by their own tag name
//! - **Extensible status codes**: unknown server codes are carried, not rejected
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironofx::prelude::*;
//!
//! #[derive(Debug, Clone, Default, PartialEq, Aggregate)]
//! #[ofx(name = "SONRS")]
//! struct SignonResponse {
//!     #[ofx(child = "STATUS", order = 0, required)]
//!     status: Option<Status>,
//!     #[ofx(element = "DTSERVER", order = 10, required)]
//!     server_date: Option<DateTime<Utc>>,
//! }
//!
//! let response: SignonResponse = ironofx::unmarshal(text)?;
//! let text = ironofx::marshal(&response, OfxVersion::V2)?;
//! ```
//!
//! Crates deriving `Aggregate` also depend on `ironofx-meta`, which the
//! generated code refers to.
//!
//! ## Crate Organization
//!
//! - [`core`]: Errors, scalar values, string conversion and status codes
//! - [`meta`]: Aggregate metadata and the type registry
//! - [`sgml`]: OFX markup reading and writing
//! - [`engine`]: Graph building, unmarshalling and marshalling

pub mod status;

pub mod core {
    //! Errors, scalar values, string conversion and status codes.
    pub use ironofx_core::*;
}

pub mod meta {
    //! Aggregate metadata and the type registry.
    pub use ironofx_meta::*;
}

pub mod sgml {
    //! OFX markup reading and writing.
    pub use ironofx_sgml::*;
}

pub mod engine {
    //! Graph building, unmarshalling and marshalling.
    pub use ironofx_engine::*;
}

pub use ironofx_core::{OfxError, Result};
pub use ironofx_derive::Aggregate;
pub use ironofx_engine::MarshalConfig;
pub use ironofx_sgml::OfxVersion;
pub use status::Status;

use ironofx_engine::{Marshaller, Unmarshaller};
use ironofx_meta::Registry;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ironofx_core::{
        ConversionError, DefaultStringConversion, KnownCode, MarshalError, MetadataError,
        OfxError, ParseError, Result, ScalarKind, ScalarValue, Severity, StatusCode,
        StringConversion, WireScalar, wire_enum,
    };

    // Metadata
    pub use ironofx_meta::{Aggregate, AttributeDescriptor, AttributeKind, Registry, TypeInfo};

    // Derive
    pub use ironofx_derive::Aggregate;

    // Markup
    pub use ironofx_sgml::{OfxHandler, OfxReader, OfxVersion, OfxWriter, V1Writer, V2Writer};

    // Engine
    pub use ironofx_engine::{MarshalConfig, Marshaller, Unmarshaller};

    // Aggregates
    pub use crate::status::Status;

    // Scalar types
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
}

/// Unmarshals a document whose root aggregate is `T`, using the global registry.
///
/// # Errors
/// Returns a `ParseError` for malformed documents, or
/// `MetadataError::NotRegistered` if `T` has no wire name. Values that fail to
/// convert are logged and dropped.
pub fn unmarshal<T: ironofx_meta::Aggregate + Default>(text: &str) -> Result<T> {
    Unmarshaller::new(Registry::global()).unmarshal(text)
}

/// Unmarshals raw bytes, decoded as UTF-8 or else as ISO-8859-1.
///
/// # Errors
/// See [`unmarshal`].
pub fn unmarshal_bytes<T: ironofx_meta::Aggregate + Default>(bytes: &[u8]) -> Result<T> {
    Unmarshaller::new(Registry::global()).unmarshal_bytes(bytes)
}

/// Marshals `aggregate` as a document of the given version, using the global registry.
///
/// # Errors
/// Returns `MarshalError::MissingRequired` if a required attribute is absent,
/// or `MarshalError::NotAnAggregate` if a type in the graph is not registered.
pub fn marshal(aggregate: &dyn ironofx_meta::Aggregate, version: OfxVersion) -> Result<String> {
    marshal_with(aggregate, &MarshalConfig::new(version))
}

/// Marshals `aggregate` with the given configuration, using the global registry.
///
/// # Errors
/// See [`marshal`].
pub fn marshal_with(aggregate: &dyn ironofx_meta::Aggregate, config: &MarshalConfig) -> Result<String> {
    Marshaller::new(Registry::global()).marshal_to_string(aggregate, config)
}
