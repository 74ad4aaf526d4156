/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOfx Meta
//!
//! Aggregate metadata for the IronOfx engine.
//!
//! This crate provides:
//! - **Aggregate**: the trait implemented by every OFX domain type
//! - **Descriptors**: wire name, order, required flag and accessors of each field
//! - **TypeInfo**: the ordered wire shape of one type, with tag resolution
//! - **Registry**: type and wire-name lookup, including the process-wide registry
//!
//! Domain types normally implement [`Aggregate`] with `#[derive(Aggregate)]`
//! from `ironofx-derive`, which also adds them to [`AGGREGATES`].

pub mod aggregate;
pub mod attribute;
pub mod info;
pub mod registry;

pub use aggregate::{Aggregate, AggregateObject};
pub use attribute::{
    AggregateType, AttributeDescriptor, AttributeKind, Constructor, HeaderDescriptor, ValueType,
    construct,
};
pub use info::{Cursor, Resolved, TypeInfo};
pub use registry::{AGGREGATES, AggregateFactory, DescribeFn, Registry};

pub use ironofx_core::MetadataError;

#[doc(hidden)]
pub use linkme;
