/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOFX SGML
//!
//! Reading and writing of the OFX wire format for the IronOFX engine.
//!
//! This crate turns OFX text into a stream of [`ParseEvent`]s delivered to an
//! [`OfxHandler`], and writes documents back out through an [`OfxWriter`].
//!
//! ## Features
//!
//! - **Version detection**: OFX 1 (SGML) and OFX 2 (XML) headers
//! - **Leaf tag repair**: unterminated OFX 1 leaf tags are closed implicitly
//! - **Retroactive aggregates**: a tag is reported as an aggregate only once
//!   nested content proves it is one

pub mod content;
pub mod event;
pub mod reader;
pub mod scanner;
pub mod writer;

pub use content::ContentHandler;
pub use event::{EventCollector, OfxHandler, ParseEvent};
pub use reader::{OfxReader, OfxVersion};
pub use scanner::{Mode, Scanner, Token, unescape};
pub use writer::{OfxWriter, V1Writer, V2Writer};
