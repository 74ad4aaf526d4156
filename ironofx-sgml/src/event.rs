/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Parse events and the handler interface that consumes them.

use ironofx_core::Result;
use std::fmt;

/// A low-level event read from OFX text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A document header.
    Header {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
    /// A leaf element with its trimmed value.
    Element {
        /// Element name.
        name: String,
        /// Element value.
        value: String,
    },
    /// Start of an aggregate.
    AggregateStart(String),
    /// End of an aggregate.
    AggregateEnd(String),
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header { name, value } => write!(f, "HEADER {}={}", name, value),
            Self::Element { name, value } => write!(f, "ELEMENT {}={}", name, value),
            Self::AggregateStart(name) => write!(f, "AGGREGATE_START {}", name),
            Self::AggregateEnd(name) => write!(f, "AGGREGATE_END {}", name),
        }
    }
}

/// Receives the events of an OFX document in order.
pub trait OfxHandler {
    /// Called for each document header.
    ///
    /// # Errors
    /// Implementations return an error to abort the parse.
    fn on_header(&mut self, name: &str, value: &str) -> Result<()>;

    /// Called for each leaf element.
    ///
    /// # Errors
    /// Implementations return an error to abort the parse.
    fn on_element(&mut self, name: &str, value: &str) -> Result<()>;

    /// Called when an aggregate starts.
    ///
    /// # Errors
    /// Implementations return an error to abort the parse.
    fn start_aggregate(&mut self, name: &str) -> Result<()>;

    /// Called when an aggregate ends.
    ///
    /// # Errors
    /// Implementations return an error to abort the parse.
    fn end_aggregate(&mut self, name: &str) -> Result<()>;
}

/// A handler that records every event.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Vec<ParseEvent>,
}

impl EventCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    /// Consumes the collector, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<ParseEvent> {
        self.events
    }

    /// Replays the recorded events into another handler.
    ///
    /// # Errors
    /// Returns the first error raised by `handler`.
    pub fn replay<H: OfxHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        for event in &self.events {
            match event {
                ParseEvent::Header { name, value } => handler.on_header(name, value)?,
                ParseEvent::Element { name, value } => handler.on_element(name, value)?,
                ParseEvent::AggregateStart(name) => handler.start_aggregate(name)?,
                ParseEvent::AggregateEnd(name) => handler.end_aggregate(name)?,
            }
        }
        Ok(())
    }
}

impl OfxHandler for EventCollector {
    fn on_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.events.push(ParseEvent::Header {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn on_element(&mut self, name: &str, value: &str) -> Result<()> {
        self.events.push(ParseEvent::Element {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn start_aggregate(&mut self, name: &str) -> Result<()> {
        self.events.push(ParseEvent::AggregateStart(name.to_string()));
        Ok(())
    }

    fn end_aggregate(&mut self, name: &str) -> Result<()> {
        self.events.push(ParseEvent::AggregateEnd(name.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_in_order() {
        let mut collector = EventCollector::new();
        collector.on_header("VERSION", "102").unwrap();
        collector.start_aggregate("OFX").unwrap();
        collector.on_element("CODE", "0").unwrap();
        collector.end_aggregate("OFX").unwrap();

        assert_eq!(collector.events().len(), 4);
        assert_eq!(collector.events()[2].to_string(), "ELEMENT CODE=0");
    }

    #[test]
    fn test_replay() {
        let mut first = EventCollector::new();
        first.start_aggregate("A").unwrap();
        first.end_aggregate("A").unwrap();

        let mut second = EventCollector::new();
        first.replay(&mut second).unwrap();
        assert_eq!(first.events(), second.events());
    }
}
