/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! OFX document reader.
//!
//! The reader splits a document into its header block and its markup body at
//! the `<OFX` root tag. A header block holding an `<?OFX ...?>` processing
//! instruction selects OFX 2 (XML); anything else is read as OFX 1
//! `NAME:VALUE` lines followed by SGML.

use crate::content::ContentHandler;
use crate::event::OfxHandler;
use crate::scanner::{Mode, Scanner};
use ironofx_core::{ParseError, Result};
use memchr::memmem;
use std::fmt;
use tracing::{debug, info};

const ROOT_MARKER: &[u8] = b"<OFX";
const V2_HEADER_START: &str = "<?OFX ";
const PI_END: &str = "?>";

/// OFX wire format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OfxVersion {
    /// SGML with `NAME:VALUE` headers.
    #[default]
    V1,
    /// XML with an `<?OFX ...?>` header instruction.
    V2,
}

impl OfxVersion {
    /// Markup dialect used by the body of a document of this version.
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::V1 => Mode::Lenient,
            Self::V2 => Mode::Strict,
        }
    }
}

impl fmt::Display for OfxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "OFX 1"),
            Self::V2 => write!(f, "OFX 2"),
        }
    }
}

/// Reads OFX documents into [`OfxHandler`] events.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfxReader;

impl OfxReader {
    /// Parses `text`, feeding headers then body events to `handler`.
    ///
    /// Returns the detected version.
    ///
    /// # Errors
    /// Returns `ParseError::NoRootElement` if no `<OFX` tag is present, any
    /// other `ParseError` for malformed markup, or the handler's error.
    pub fn parse<H: OfxHandler + ?Sized>(text: &str, handler: &mut H) -> Result<OfxVersion> {
        let root = find_root(text).ok_or(ParseError::NoRootElement)?;
        let (header, body) = text.split_at(root);

        let version = match v2_instruction(header) {
            Some(instruction) => {
                info!("Processing OFX 2 header...");
                read_v2_headers(instruction, handler)?;
                OfxVersion::V2
            }
            None => {
                info!("Processing OFX 1 headers...");
                read_v1_headers(header, handler)?;
                OfxVersion::V1
            }
        };

        debug!(%version, offset = root, "Parsing document body");
        let mut content = ContentHandler::new(handler);
        let mut scanner = Scanner::new(body, version.mode());
        while let Some(token) = scanner.next_token()? {
            content.token(token)?;
        }
        Ok(version)
    }
}

fn find_root(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    memmem::find_iter(bytes, ROOT_MARKER).find(|&at| {
        matches!(
            bytes.get(at + ROOT_MARKER.len()),
            Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')
        )
    })
}

/// Returns the attribute text of the `<?OFX ...?>` instruction, if any.
fn v2_instruction(header: &str) -> Option<&str> {
    let start = header.find(V2_HEADER_START)? + V2_HEADER_START.len();
    let rest = &header[start..];
    let end = rest.find(PI_END)?;
    let instruction = &rest[..end];
    if instruction.is_empty() || instruction.contains('?') {
        return None;
    }
    Some(instruction)
}

fn read_v2_headers<H: OfxHandler + ?Sized>(instruction: &str, handler: &mut H) -> Result<()> {
    for pair in instruction.split_whitespace() {
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            let value = value.replace('"', "");
            let value = value.trim();
            debug!(name, value, "Header");
            handler.on_header(name, value)?;
        }
    }
    Ok(())
}

fn read_v1_headers<H: OfxHandler + ?Sized>(header: &str, handler: &mut H) -> Result<()> {
    for line in header.lines() {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                continue;
            }
            debug!(name, value, "Header");
            handler.on_header(name, value)?;
        }
    }
    Ok(())
}
