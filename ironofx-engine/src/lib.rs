/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOFX Engine
//!
//! Conversion between OFX documents and aggregate object graphs.
//!
//! This crate provides:
//! - **Unmarshaller**: Reads OFX text into a typed root aggregate
//! - **Marshaller**: Writes an aggregate graph as an OFX 1 or OFX 2 document
//! - **Graph builder**: The event consumer behind the unmarshaller
//! - **Configuration**: Output version and header defaults

pub mod builder;
pub mod config;
pub mod marshaller;
pub mod unmarshaller;

pub use builder::GraphBuilder;
pub use config::MarshalConfig;
pub use marshaller::Marshaller;
pub use unmarshaller::Unmarshaller;
