/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Turns markup tokens into parse events.
//!
//! OFX markup does not say whether a tag is a leaf element or an aggregate
//! until its content has been seen. Open tags are therefore kept on a stack
//! and only announced as aggregates once a nested tag shows up. A close tag
//! with character data on top of the stack ends a leaf element; a close tag
//! matching an open entry ends an aggregate.

use crate::event::OfxHandler;
use crate::scanner::Token;
use ironofx_core::{ParseError, Result};
use tracing::debug;

#[derive(Debug)]
enum Entry {
    Open { name: String, announced: bool },
    Characters(String),
}

/// Event stack between the scanner and an [`OfxHandler`].
#[derive(Debug)]
pub struct ContentHandler<'h, H: OfxHandler + ?Sized> {
    handler: &'h mut H,
    stack: Vec<Entry>,
}

impl<'h, H: OfxHandler + ?Sized> ContentHandler<'h, H> {
    /// Creates a content handler feeding `handler`.
    pub fn new(handler: &'h mut H) -> Self {
        Self {
            handler,
            stack: Vec::with_capacity(16),
        }
    }

    /// Processes one token.
    ///
    /// # Errors
    /// Returns a `ParseError` for structural errors, or the handler's error.
    pub fn token(&mut self, token: Token<'_>) -> Result<()> {
        match token {
            Token::Open(name) => self.open(name),
            Token::Close(name) => self.close(name),
            Token::Text(text) => {
                self.characters(&text);
                Ok(())
            }
        }
    }

    /// Processes an open tag.
    ///
    /// # Errors
    /// Returns the handler's error.
    pub fn open(&mut self, name: &str) -> Result<()> {
        debug!(tag = name, "START ELEMENT");

        if let Some(Entry::Open {
            name: parent,
            announced,
        }) = self.stack.last_mut()
            && !*announced
        {
            debug!(tag = name, aggregate = parent.as_str(), "Element is starting aggregate");
            self.handler.start_aggregate(parent)?;
            *announced = true;
        }

        self.stack.push(Entry::Open {
            name: name.to_string(),
            announced: false,
        });
        Ok(())
    }

    /// Processes character data. Whitespace-only data is ignored.
    pub fn characters(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match self.stack.last_mut() {
            Some(Entry::Characters(chars)) => chars.push_str(text),
            _ => self.stack.push(Entry::Characters(text.to_string())),
        }
    }

    /// Processes a close tag.
    ///
    /// # Errors
    /// Returns a `ParseError` for structural errors, or the handler's error.
    pub fn close(&mut self, name: &str) -> Result<()> {
        debug!(tag = name, "END ELEMENT");

        match self.stack.pop() {
            Some(Entry::Characters(chars)) => {
                let chars = chars.trim();
                match self.stack.pop() {
                    None => Err(ParseError::IllegalCharacters(chars.to_string()).into()),
                    Some(Entry::Open {
                        name: aggregate,
                        announced: true,
                    }) => {
                        debug!(
                            aggregate = aggregate.as_str(),
                            chars, "Ignoring character data inside aggregate"
                        );
                        self.end(&aggregate, name)
                    }
                    Some(Entry::Open {
                        name: element,
                        announced: false,
                    }) => {
                        debug!(element = element.as_str(), value = chars, "Element processed");
                        self.handler.on_element(&element, chars)
                    }
                    Some(Entry::Characters(_)) => Err(ParseError::IllegalEvent(format!(
                        "character data before characters \"{}\"",
                        chars
                    ))
                    .into()),
                }
            }
            Some(Entry::Open {
                name: aggregate,
                announced,
            }) => {
                if !announced && aggregate == name {
                    self.handler.start_aggregate(&aggregate)?;
                }
                self.end(&aggregate, name)
            }
            None => Err(ParseError::IllegalEvent(format!("end tag </{}> with no open element", name)).into()),
        }
    }

    fn end(&mut self, aggregate: &str, name: &str) -> Result<()> {
        if aggregate == name {
            debug!(aggregate, "Ending aggregate");
            self.handler.end_aggregate(aggregate)
        } else {
            Err(ParseError::UnexpectedEndTag {
                expected: aggregate.to_string(),
                found: name.to_string(),
            }
            .into())
        }
    }

    /// Returns true if no tag is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
