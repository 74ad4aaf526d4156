/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Markup tokenizer.
//!
//! The scanner splits OFX markup into open tags, close tags and character
//! data. It understands the subset of SGML and XML that OFX documents use:
//! processing instructions, comments and declarations are skipped, CDATA
//! sections become character data, attributes are ignored and entities are
//! unescaped.
//!
//! In [`Mode::Lenient`] (OFX 1) the scanner repairs unterminated leaf tags:
//! a tag that already holds text is closed when the next tag arrives, an end
//! tag closes every tag opened after its match, and end of input closes
//! everything. In [`Mode::Strict`] (OFX 2) every end tag must match the
//! innermost open tag.

use ironofx_core::ParseError;
use memchr::{memchr, memmem};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::VecDeque;
use tracing::debug;

/// Markup dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// SGML with unterminated leaf tags (OFX 1).
    Lenient,
    /// Well-formed XML (OFX 2).
    Strict,
}

/// A markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// An open tag.
    Open(&'a str),
    /// A close tag, explicit or implied.
    Close(&'a str),
    /// Character data, unescaped. Whitespace-only runs are not reported.
    Text(Cow<'a, str>),
}

#[derive(Debug, Clone, Copy)]
struct OpenTag<'a> {
    name: &'a str,
    has_text: bool,
}

/// Markup tokenizer over a string slice.
#[derive(Debug)]
pub struct Scanner<'a> {
    input: &'a str,
    offset: usize,
    mode: Mode,
    open: SmallVec<[OpenTag<'a>; 16]>,
    pending: VecDeque<Token<'a>>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `input`.
    #[must_use]
    pub fn new(input: &'a str, mode: Mode) -> Self {
        Self {
            input,
            offset: 0,
            mode,
            open: SmallVec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Current byte offset into the input.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next token, or `None` at end of input.
    ///
    /// # Errors
    /// Returns `ParseError` if the markup cannot be tokenized.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            if self.finished {
                return Ok(None);
            }
            if let Err(e) = self.advance() {
                self.finished = true;
                self.pending.clear();
                return Err(e);
            }
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let input = self.input;
        let start = self.offset;
        let rest = &input[start..];

        if rest.is_empty() {
            return self.end_of_input();
        }

        if !rest.starts_with('<') {
            let end = memchr(b'<', rest.as_bytes()).unwrap_or(rest.len());
            self.offset += end;
            self.text(&rest[..end], true);
            return Ok(());
        }

        if rest.starts_with("<?") {
            return self.skip_past("?>", "unterminated processing instruction");
        }
        if rest.starts_with("<!--") {
            return self.skip_past("-->", "unterminated comment");
        }
        if let Some(body) = rest.strip_prefix("<![CDATA[") {
            let end = memmem::find(body.as_bytes(), b"]]>")
                .ok_or_else(|| malformed(start, "unterminated CDATA section"))?;
            self.offset += "<![CDATA[".len() + end + "]]>".len();
            self.text(&body[..end], false);
            return Ok(());
        }
        if rest.starts_with("<!") {
            return self.skip_past(">", "unterminated declaration");
        }

        let end = memchr(b'>', rest.as_bytes()).ok_or_else(|| malformed(start, "unterminated tag"))?;
        let inner = &rest[1..end];
        self.offset += end + 1;

        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim();
            if name.is_empty() {
                return Err(malformed(start, "empty end tag"));
            }
            return self.close(name);
        }

        let (inner, self_closing) = match inner.strip_suffix('/') {
            Some(inner) => (inner, true),
            None => (inner, false),
        };
        let name = inner
            .split_ascii_whitespace()
            .next()
            .ok_or_else(|| malformed(start, "empty tag"))?;
        self.open(name);
        if self_closing {
            self.close(name)?;
        }
        Ok(())
    }

    fn skip_past(&mut self, terminator: &str, reason: &str) -> Result<(), ParseError> {
        let rest = &self.input[self.offset..];
        let end = memmem::find(rest.as_bytes(), terminator.as_bytes())
            .ok_or_else(|| malformed(self.offset, reason))?;
        self.offset += end + terminator.len();
        Ok(())
    }

    fn text(&mut self, raw: &'a str, escaped: bool) {
        if raw.trim().is_empty() {
            return;
        }
        if let Some(top) = self.open.last_mut() {
            top.has_text = true;
        }
        let text = if escaped { unescape(raw) } else { Cow::Borrowed(raw) };
        self.pending.push_back(Token::Text(text));
    }

    fn open(&mut self, name: &'a str) {
        if self.mode == Mode::Lenient
            && let Some(top) = self.open.last()
            && top.has_text
        {
            let leaf = top.name;
            self.open.pop();
            self.pending.push_back(Token::Close(leaf));
        }
        self.open.push(OpenTag {
            name,
            has_text: false,
        });
        self.pending.push_back(Token::Open(name));
    }

    fn close(&mut self, name: &'a str) -> Result<(), ParseError> {
        if self.mode == Mode::Strict {
            return match self.open.last() {
                Some(top) if top.name == name => {
                    self.open.pop();
                    self.pending.push_back(Token::Close(name));
                    Ok(())
                }
                top => Err(ParseError::UnexpectedEndTag {
                    expected: top.map(|t| t.name.to_string()).unwrap_or_default(),
                    found: name.to_string(),
                }),
            };
        }

        match self.open.iter().rposition(|tag| tag.name == name) {
            Some(index) => {
                while self.open.len() > index {
                    if let Some(tag) = self.open.pop() {
                        self.pending.push_back(Token::Close(tag.name));
                    }
                }
            }
            None => {
                debug!(tag = name, offset = self.offset, "Ignoring end tag with no open element");
            }
        }
        Ok(())
    }

    fn end_of_input(&mut self) -> Result<(), ParseError> {
        self.finished = true;
        match self.mode {
            Mode::Strict => {
                if let Some(top) = self.open.last() {
                    return Err(ParseError::UnclosedTag(top.name.to_string()));
                }
            }
            Mode::Lenient => {
                while let Some(tag) = self.open.pop() {
                    self.pending.push_back(Token::Close(tag.name));
                }
            }
        }
        Ok(())
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn malformed(offset: usize, reason: &str) -> ParseError {
    ParseError::Malformed {
        offset,
        reason: reason.to_string(),
    }
}

/// Replaces character and entity references in `text`.
///
/// Unknown references are kept as written.
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if memchr(b'&', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str, mode: Mode) -> Vec<Token<'_>> {
        Scanner::new(input, mode).map(|t| t.unwrap()).collect()
    }

    fn text(s: &str) -> Token<'_> {
        Token::Text(Cow::Borrowed(s))
    }

    #[test]
    fn test_lenient_closes_leaf_on_next_tag() {
        let toks = tokens("<STATUS><CODE>0<SEVERITY>INFO</STATUS>", Mode::Lenient);
        assert_eq!(
            toks,
            vec![
                Token::Open("STATUS"),
                Token::Open("CODE"),
                text("0"),
                Token::Close("CODE"),
                Token::Open("SEVERITY"),
                text("INFO"),
                Token::Close("SEVERITY"),
                Token::Close("STATUS"),
            ]
        );
    }

    #[test]
    fn test_lenient_closes_everything_at_end() {
        let toks = tokens("<OFX><A><B>x", Mode::Lenient);
        assert_eq!(
            toks[4..],
            [Token::Close("B"), Token::Close("A"), Token::Close("OFX")]
        );
    }

    #[test]
    fn test_lenient_ignores_stray_end_tag() {
        let toks = tokens("<A><B>x</C></A>", Mode::Lenient);
        assert_eq!(
            toks,
            vec![
                Token::Open("A"),
                Token::Open("B"),
                text("x"),
                Token::Close("B"),
                Token::Close("A"),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_not_reported() {
        let toks = tokens("<A>\r\n  <B>1</B>\n</A>\n", Mode::Strict);
        assert_eq!(
            toks,
            vec![
                Token::Open("A"),
                Token::Open("B"),
                text("1"),
                Token::Close("B"),
                Token::Close("A"),
            ]
        );
    }

    #[test]
    fn test_skips_pi_comment_and_doctype() {
        let input = "<?xml version=\"1.0\"?><!DOCTYPE ofx><!-- note --><A>1</A>";
        let toks = tokens(input, Mode::Strict);
        assert_eq!(toks, vec![Token::Open("A"), text("1"), Token::Close("A")]);
    }

    #[test]
    fn test_cdata_attributes_and_self_closing() {
        let toks = tokens("<A id=\"7\"><![CDATA[a<b]]><B/></A>", Mode::Strict);
        assert_eq!(
            toks,
            vec![
                Token::Open("A"),
                text("a<b"),
                Token::Open("B"),
                Token::Close("B"),
                Token::Close("A"),
            ]
        );
    }

    #[test]
    fn test_strict_mismatch_is_an_error() {
        let err = Scanner::new("<A><B>1</A>", Mode::Strict)
            .find_map(Result::err)
            .unwrap();
        assert_eq!(
            err,
            ParseError::UnexpectedEndTag {
                expected: "B".to_string(),
                found: "A".to_string()
            }
        );
    }

    #[test]
    fn test_strict_unclosed_is_an_error() {
        let err = Scanner::new("<A><B>1</B>", Mode::Strict)
            .find_map(Result::err)
            .unwrap();
        assert_eq!(err, ParseError::UnclosedTag("A".to_string()));
    }

    #[test]
    fn test_unterminated_tag() {
        let err = Scanner::new("<A><B", Mode::Lenient)
            .find_map(Result::err)
            .unwrap();
        assert!(matches!(err, ParseError::Malformed { offset: 3, .. }));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("AT&amp;T &lt;1&gt;"), "AT&T <1>");
        assert_eq!(unescape("&#65;&#x42;&quot;&apos;"), "AB\"'");
        assert_eq!(unescape("R&D; & more"), "R&D; & more");
        assert!(matches!(unescape("plain"), Cow::Borrowed("plain")));
    }
}
