/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Object graph builder.
//!
//! The [`GraphBuilder`] consumes parse events and builds an aggregate graph
//! from them, one stack frame per open aggregate. Content the registry does
//! not describe is skipped, never fatal.

use ironofx_core::{
    DefaultStringConversion, MetadataError, ParseError, Result, ScalarKind, ScalarValue,
    StringConversion,
};
use ironofx_meta::{Aggregate, AttributeKind, Cursor, Registry, Resolved, TypeInfo};
use ironofx_sgml::OfxHandler;
use std::any::TypeId;
use tracing::{debug, error, info, warn};

/// One level of the build stack.
#[derive(Debug)]
enum Frame<'r> {
    /// An aggregate under construction.
    Active {
        aggregate: Box<dyn Aggregate>,
        info: &'r TypeInfo,
        cursor: Cursor,
        name: String,
        /// Index of the parent attribute this aggregate attaches to.
        slot: Option<usize>,
    },
    /// Unrecognized content.
    Skipped { name: String },
}

impl Frame<'_> {
    fn name(&self) -> &str {
        match self {
            Self::Active { name, .. } | Self::Skipped { name } => name,
        }
    }
}

/// Builds an aggregate graph from parse events.
#[derive(Debug)]
pub struct GraphBuilder<'r, C: StringConversion = DefaultStringConversion> {
    registry: &'r Registry,
    conversion: &'r C,
    frames: Vec<Frame<'r>>,
    begun: bool,
    root: Option<Box<dyn Aggregate>>,
}

impl<'r> GraphBuilder<'r, DefaultStringConversion> {
    /// Creates a builder filling `root` with the default conversion.
    ///
    /// # Errors
    /// Returns `MetadataError::NotRegistered` if the root type has no wire name.
    pub fn new(registry: &'r Registry, root: Box<dyn Aggregate>) -> Result<Self> {
        Self::with_conversion(registry, &DefaultStringConversion, root)
    }
}

impl<'r, C: StringConversion> GraphBuilder<'r, C> {
    /// Creates a builder filling `root`.
    ///
    /// # Errors
    /// Returns `MetadataError::NotRegistered` if the root type has no wire name.
    pub fn with_conversion(
        registry: &'r Registry,
        conversion: &'r C,
        root: Box<dyn Aggregate>,
    ) -> Result<Self> {
        let info = registry
            .info_of(root.as_ref())
            .ok_or_else(|| MetadataError::NotRegistered(root.type_name().to_string()))?;
        let name = info
            .wire_name()
            .ok_or_else(|| MetadataError::NotRegistered(root.type_name().to_string()))?
            .to_string();

        Ok(Self {
            registry,
            conversion,
            frames: vec![Frame::Active {
                aggregate: root,
                info,
                cursor: Cursor::new(),
                name,
                slot: None,
            }],
            begun: false,
            root: None,
        })
    }

    /// Returns the built root aggregate.
    ///
    /// # Errors
    /// Returns `ParseError::NoRootElement` if the root aggregate never started,
    /// or `ParseError::UnclosedTag` if it never ended.
    pub fn finish(mut self) -> Result<Box<dyn Aggregate>> {
        if !self.begun {
            return Err(ParseError::NoRootElement.into());
        }
        match self.root.take() {
            Some(root) => Ok(root),
            None => {
                let open = self.frames.last().map_or("", Frame::name);
                Err(ParseError::UnclosedTag(open.to_string()).into())
            }
        }
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Converts wire text, logging and dropping values that fail to convert.
    fn convert(&self, kind: ScalarKind, name: &str, value: &str) -> Option<Option<ScalarValue>> {
        self.conversion
            .from_wire(kind, value)
            .map_err(|e| error!(name, value, error = %e, "Unable to convert value; dropping it"))
            .ok()
    }

    /// Resolves the attribute a child aggregate tag refers to and creates
    /// the child, or returns `None` if the tag is to be skipped.
    fn open_child(
        &self,
        info: &'r TypeInfo,
        cursor: Cursor,
        name: &str,
    ) -> Option<(Resolved<'r>, Box<dyn Aggregate>, &'r TypeInfo)> {
        let Some(resolved) = info.attribute(name, cursor, None) else {
            info!(
                aggregate = name,
                parent = info.name(),
                "Unknown aggregate; skipping"
            );
            return None;
        };

        let (resolved, child) = match resolved.descriptor.kind() {
            AttributeKind::Element => {
                warn!(
                    aggregate = name,
                    parent = info.name(),
                    "Aggregate name matches an element; skipping"
                );
                return None;
            }
            AttributeKind::SingleChild => {
                let constructor = resolved
                    .descriptor
                    .aggregate_type()
                    .and_then(|ty| ty.constructor());
                let Some(constructor) = constructor else {
                    info!(aggregate = name, "No constructible type for aggregate; skipping");
                    return None;
                };
                (resolved, constructor())
            }
            AttributeKind::CollectionChild => {
                let Some(factory) = self.registry.find_by_name(name) else {
                    info!(
                        aggregate = name,
                        parent = info.name(),
                        "No registered type for collection entry; skipping"
                    );
                    return None;
                };
                let candidate = factory.type_id;
                let fits = |entry: TypeId| self.registry.is_assignable(entry, candidate);
                let resolved = match resolved.descriptor.entry_type() {
                    Some(entry) if !fits(entry) => info.attribute(name, cursor, Some(&fits)),
                    _ => Some(resolved),
                };
                let Some(resolved) = resolved else {
                    warn!(
                        aggregate = name,
                        entry_type = factory.type_name,
                        parent = info.name(),
                        "Collection entry is not assignable to any collection; skipping"
                    );
                    return None;
                };
                (resolved, factory.construct())
            }
        };

        let Some(child_info) = self.registry.info_of(child.as_ref()) else {
            info!(
                aggregate = name,
                type_name = child.type_name(),
                "Aggregate type has no metadata; skipping"
            );
            return None;
        };
        Some((resolved, child, child_info))
    }
}

impl<C: StringConversion> OfxHandler for GraphBuilder<'_, C> {
    fn on_header(&mut self, name: &str, value: &str) -> Result<()> {
        let Some(Frame::Active { info, .. }) = self.frames.last() else {
            return Ok(());
        };
        let info = *info;
        let Some(kind) = info.header_kind(name) else {
            debug!(header = name, "Undeclared header ignored");
            return Ok(());
        };
        let Some(value) = self.convert(kind, name, value) else {
            return Ok(());
        };
        if let Some(Frame::Active { aggregate, .. }) = self.frames.last_mut() {
            if let Err(e) = info.set_header(aggregate.as_mut(), name, value) {
                error!(header = name, error = %e, "Unable to set header");
            }
        }
        Ok(())
    }

    fn on_element(&mut self, name: &str, value: &str) -> Result<()> {
        let (info, cursor) = match self.frames.last() {
            Some(Frame::Active { info, cursor, .. }) => (*info, *cursor),
            Some(Frame::Skipped { .. }) => return Ok(()),
            None => {
                return Err(ParseError::IllegalEvent(format!("element {} outside root", name)).into());
            }
        };

        let resolved = info
            .attribute(name, cursor, None)
            .filter(|r| r.descriptor.kind() == AttributeKind::Element);
        let Some(resolved) = resolved else {
            info!(
                element = name,
                aggregate = info.name(),
                "Element not supported by aggregate; ignoring"
            );
            return Ok(());
        };
        let Some(kind) = resolved.descriptor.scalar_kind() else {
            return Ok(());
        };

        let value = self.convert(kind, name, value);
        if let Some(Frame::Active {
            aggregate, cursor, ..
        }) = self.frames.last_mut()
        {
            let set = value.map(|value| resolved.descriptor.set_value(aggregate.as_mut(), value));
            if let Some(Err(e)) = set {
                error!(element = name, error = %e, "Unable to set element");
            }
            cursor.advance(&resolved);
        }
        Ok(())
    }

    fn start_aggregate(&mut self, name: &str) -> Result<()> {
        let (info, cursor) = match self.frames.last() {
            Some(Frame::Active { info, cursor, .. }) => (*info, *cursor),
            Some(Frame::Skipped { .. }) => {
                self.frames.push(Frame::Skipped {
                    name: name.to_string(),
                });
                return Ok(());
            }
            None => {
                return Err(ParseError::IllegalEvent(format!(
                    "aggregate {} after the root ended",
                    name
                ))
                .into());
            }
        };

        if !self.begun {
            let expected = info.name();
            if expected != name {
                return Err(ParseError::UnexpectedRoot {
                    expected: expected.to_string(),
                    found: name.to_string(),
                }
                .into());
            }
            self.begun = true;
            return Ok(());
        }

        let frame = match self.open_child(info, cursor, name) {
            Some((resolved, aggregate, child_info)) => {
                if let Some(Frame::Active { cursor, .. }) = self.frames.last_mut() {
                    cursor.advance(&resolved);
                }
                Frame::Active {
                    aggregate,
                    info: child_info,
                    cursor: Cursor::new(),
                    name: name.to_string(),
                    slot: Some(resolved.index),
                }
            }
            None => Frame::Skipped {
                name: name.to_string(),
            },
        };
        self.frames.push(frame);
        Ok(())
    }

    fn end_aggregate(&mut self, name: &str) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| ParseError::IllegalEvent(format!("end of {} with no open aggregate", name)))?;
        if frame.name() != name {
            return Err(ParseError::UnexpectedEndAggregate {
                expected: frame.name().to_string(),
                found: name.to_string(),
            }
            .into());
        }

        let Frame::Active {
            aggregate, slot, ..
        } = frame
        else {
            debug!(aggregate = name, "Skipped aggregate ended");
            return Ok(());
        };

        match self.frames.last_mut() {
            None => self.root = Some(aggregate),
            Some(Frame::Skipped { .. }) => {
                debug!(aggregate = name, "Dropping aggregate inside skipped content");
            }
            Some(Frame::Active {
                aggregate: parent,
                info,
                ..
            }) => {
                let info: &TypeInfo = info;
                let descriptor = slot.and_then(|index| info.attributes().get(index));
                let Some(descriptor) = descriptor else {
                    info!(aggregate = name, "No attribute to attach aggregate to; dropping");
                    return Ok(());
                };
                if let Err(e) = descriptor.attach(parent.as_mut(), aggregate) {
                    info!(
                        aggregate = name,
                        attribute = %descriptor,
                        error = %e,
                        "Unable to attach aggregate; dropping"
                    );
                }
            }
        }
        Ok(())
    }
}
