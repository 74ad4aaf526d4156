/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! OFX document writers.
//!
//! [`V1Writer`] produces SGML with `NAME:VALUE` headers and unterminated leaf
//! tags, encoded as ISO-8859-1. [`V2Writer`] produces XML with an
//! `<?OFX ...?>` header instruction, encoded as UTF-8.

use crate::event::{EventCollector, OfxHandler};
use bytes::{BufMut, Bytes, BytesMut};
use ironofx_core::{MarshalError, Result};
use std::collections::BTreeMap;

/// Line separator used by OFX 1 documents.
pub const CRLF: &[u8] = b"\r\n";

/// Value written for a missing `SECURITY`, `OLDFILEUID` or `NEWFILEUID` header.
pub const NONE: &str = "NONE";

/// Receives the output events of a marshalled document.
pub trait OfxWriter {
    /// Writes the document headers. May be called once, before any content.
    ///
    /// # Errors
    /// Returns `MarshalError::HeadersAlreadyWritten` on a second call.
    fn write_headers(&mut self, headers: &BTreeMap<String, String>) -> Result<()>;

    /// Writes the start of an aggregate.
    ///
    /// # Errors
    /// Implementations may fail on I/O.
    fn write_start_aggregate(&mut self, name: &str) -> Result<()>;

    /// Writes a leaf element.
    ///
    /// # Errors
    /// Returns `MarshalError::EmptyElementValue` if `value` is empty.
    fn write_element(&mut self, name: &str, value: &str) -> Result<()>;

    /// Writes the end of an aggregate.
    ///
    /// # Errors
    /// Implementations may fail on I/O.
    fn write_end_aggregate(&mut self, name: &str) -> Result<()>;
}

fn header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    headers.get(name).map_or(NONE, String::as_str)
}

/// Appends `text`, escaping `&`, `<` and `>`.
///
/// With `latin1` set, characters are written as single ISO-8859-1 bytes and
/// characters outside that range become `?`.
fn put_text(buf: &mut BytesMut, text: &str, escape: bool, latin1: bool) {
    for c in text.chars() {
        match c {
            '&' if escape => buf.put_slice(b"&amp;"),
            '<' if escape => buf.put_slice(b"&lt;"),
            '>' if escape => buf.put_slice(b"&gt;"),
            c if c.is_ascii() => buf.put_u8(c as u8),
            c if latin1 => buf.put_u8(u8::try_from(u32::from(c)).unwrap_or(b'?')),
            c => {
                let mut utf8 = [0u8; 4];
                buf.put_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
}

fn check_value(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(MarshalError::EmptyElementValue {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// SGML writer for OFX 1.
#[derive(Debug)]
pub struct V1Writer {
    buf: BytesMut,
    headers_written: bool,
    attributes_on_new_line: bool,
}

impl V1Writer {
    /// Creates a writer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            headers_written: false,
            attributes_on_new_line: false,
        }
    }

    /// Writes a line break after every tag.
    #[must_use]
    pub fn with_attributes_on_new_line(mut self, enabled: bool) -> Self {
        self.attributes_on_new_line = enabled;
        self
    }

    /// Returns true if a line break follows every tag.
    #[must_use]
    pub const fn attributes_on_new_line(&self) -> bool {
        self.attributes_on_new_line
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer, returning the document.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    fn put_line(&mut self, name: &str, value: &str) {
        put_text(&mut self.buf, name, false, true);
        self.buf.put_u8(b':');
        put_text(&mut self.buf, value, false, true);
        self.buf.put_slice(CRLF);
    }

    fn put_tag(&mut self, name: &str, end: bool) {
        self.buf.put_u8(b'<');
        if end {
            self.buf.put_u8(b'/');
        }
        put_text(&mut self.buf, name, false, true);
        self.buf.put_u8(b'>');
    }

    fn end_line(&mut self) {
        if self.attributes_on_new_line {
            self.buf.put_slice(CRLF);
        }
    }
}

impl Default for V1Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl OfxWriter for V1Writer {
    fn write_headers(&mut self, headers: &BTreeMap<String, String>) -> Result<()> {
        if self.headers_written {
            return Err(MarshalError::HeadersAlreadyWritten.into());
        }

        self.put_line("OFXHEADER", "100");
        self.put_line("DATA", "OFXSGML");
        self.put_line("VERSION", "102");
        self.put_line("SECURITY", header(headers, "SECURITY"));
        self.put_line("ENCODING", "USASCII");
        self.put_line("CHARSET", "1252");
        self.put_line("COMPRESSION", NONE);
        self.put_line("OLDFILEUID", header(headers, "OLDFILEUID"));
        self.put_line("NEWFILEUID", header(headers, "NEWFILEUID"));
        self.buf.put_slice(CRLF);

        self.headers_written = true;
        Ok(())
    }

    fn write_start_aggregate(&mut self, name: &str) -> Result<()> {
        self.put_tag(name, false);
        self.end_line();
        Ok(())
    }

    fn write_element(&mut self, name: &str, value: &str) -> Result<()> {
        check_value(name, value)?;
        self.put_tag(name, false);
        put_text(&mut self.buf, value, true, true);
        self.end_line();
        Ok(())
    }

    fn write_end_aggregate(&mut self, name: &str) -> Result<()> {
        self.put_tag(name, true);
        self.end_line();
        Ok(())
    }
}

/// XML writer for OFX 2.
#[derive(Debug)]
pub struct V2Writer {
    buf: BytesMut,
    headers_written: bool,
}

impl V2Writer {
    /// Creates a writer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            headers_written: false,
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer, returning the document.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    fn put_tag(&mut self, name: &str, end: bool) {
        self.buf.put_u8(b'<');
        if end {
            self.buf.put_u8(b'/');
        }
        put_text(&mut self.buf, name, false, false);
        self.buf.put_u8(b'>');
    }

    fn put_attribute(&mut self, name: &str, value: &str) {
        self.buf.put_u8(b' ');
        self.buf.put_slice(name.as_bytes());
        self.buf.put_slice(b"=\"");
        put_text(&mut self.buf, value, true, false);
        self.buf.put_u8(b'"');
    }
}

impl Default for V2Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl OfxWriter for V2Writer {
    fn write_headers(&mut self, headers: &BTreeMap<String, String>) -> Result<()> {
        if self.headers_written {
            return Err(MarshalError::HeadersAlreadyWritten.into());
        }

        self.buf
            .put_slice(b"<?xml version=\"1.0\" encoding=\"utf-8\" ?>");
        self.buf.put_slice(b"<?OFX");
        self.put_attribute("OFXHEADER", "200");
        self.put_attribute("VERSION", "202");
        self.put_attribute("SECURITY", header(headers, "SECURITY"));
        self.put_attribute("OLDFILEUID", header(headers, "OLDFILEUID"));
        self.put_attribute("NEWFILEUID", header(headers, "NEWFILEUID"));
        self.buf.put_slice(b"?>");

        self.headers_written = true;
        Ok(())
    }

    fn write_start_aggregate(&mut self, name: &str) -> Result<()> {
        self.put_tag(name, false);
        Ok(())
    }

    fn write_element(&mut self, name: &str, value: &str) -> Result<()> {
        check_value(name, value)?;
        self.put_tag(name, false);
        put_text(&mut self.buf, value, true, false);
        self.put_tag(name, true);
        Ok(())
    }

    fn write_end_aggregate(&mut self, name: &str) -> Result<()> {
        self.put_tag(name, true);
        Ok(())
    }
}

/// Records output as parse events, the same events reading the document
/// back would produce.
impl OfxWriter for EventCollector {
    fn write_headers(&mut self, headers: &BTreeMap<String, String>) -> Result<()> {
        for (name, value) in headers {
            self.on_header(name, value)?;
        }
        Ok(())
    }

    fn write_start_aggregate(&mut self, name: &str) -> Result<()> {
        self.start_aggregate(name)
    }

    fn write_element(&mut self, name: &str, value: &str) -> Result<()> {
        check_value(name, value)?;
        self.on_element(name, value)
    }

    fn write_end_aggregate(&mut self, name: &str) -> Result<()> {
        self.end_aggregate(name)
    }
}
