/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Writes aggregates as OFX documents.

use crate::config::MarshalConfig;
use bytes::Bytes;
use ironofx_core::{DefaultStringConversion, MarshalError, Result, StringConversion};
use ironofx_meta::{Aggregate, AttributeDescriptor, AttributeKind, Registry};
use ironofx_sgml::{OfxVersion, OfxWriter, V1Writer, V2Writer};
use std::collections::BTreeMap;
use tracing::debug;

/// Marshals aggregates described by a [`Registry`] into OFX.
#[derive(Debug, Clone)]
pub struct Marshaller<'r, C: StringConversion = DefaultStringConversion> {
    registry: &'r Registry,
    conversion: C,
}

impl<'r> Marshaller<'r, DefaultStringConversion> {
    /// Creates a marshaller with the default string conversion.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            conversion: DefaultStringConversion,
        }
    }
}

impl<'r, C: StringConversion> Marshaller<'r, C> {
    /// Replaces the string conversion.
    #[must_use]
    pub fn with_conversion<D: StringConversion>(self, conversion: D) -> Marshaller<'r, D> {
        Marshaller {
            registry: self.registry,
            conversion,
        }
    }

    /// Writes `aggregate` as a document: headers first, then the aggregate.
    ///
    /// # Errors
    /// Returns `MarshalError::NotAnAggregate` if a type in the graph has no
    /// metadata, `MarshalError::MissingRequired` if a required attribute is
    /// absent, or the writer's error.
    pub fn marshal<W: OfxWriter + ?Sized>(
        &self,
        aggregate: &dyn Aggregate,
        writer: &mut W,
    ) -> Result<()> {
        let info = self
            .registry
            .info_of(aggregate)
            .ok_or_else(|| MarshalError::NotAnAggregate(aggregate.type_name().to_string()))?;
        let name = info
            .wire_name()
            .ok_or_else(|| MarshalError::NotAnAggregate(aggregate.type_name().to_string()))?;

        if info.has_headers() {
            let headers: BTreeMap<String, String> = info
                .header_values(aggregate)
                .into_iter()
                .filter_map(|(name, value)| Some((name, self.conversion.to_wire(&value?))))
                .collect();
            writer.write_headers(&headers)?;
        }

        writer.write_start_aggregate(name)?;
        self.write_attributes(aggregate, info.attributes(), writer)?;
        writer.write_end_aggregate(name)
    }

    /// Writes the attributes of `aggregate` in order.
    ///
    /// # Errors
    /// See [`Marshaller::marshal`].
    pub fn write_attributes<W: OfxWriter + ?Sized>(
        &self,
        aggregate: &dyn Aggregate,
        attributes: &[AttributeDescriptor],
        writer: &mut W,
    ) -> Result<()> {
        for attribute in attributes {
            match attribute.kind() {
                AttributeKind::Element => self.write_element(aggregate, attribute, writer)?,
                AttributeKind::SingleChild | AttributeKind::CollectionChild => {
                    self.write_children(aggregate, attribute, writer)?;
                }
            }
        }
        Ok(())
    }

    fn write_element<W: OfxWriter + ?Sized>(
        &self,
        aggregate: &dyn Aggregate,
        attribute: &AttributeDescriptor,
        writer: &mut W,
    ) -> Result<()> {
        let Some(value) = attribute.get_value(aggregate) else {
            return missing(attribute);
        };
        let text = self.conversion.to_wire(&value);
        let text = text.trim();
        match attribute.name() {
            Some(name) if !text.is_empty() => writer.write_element(name, text),
            _ => {
                debug!(attribute = %attribute, "Blank element omitted");
                Ok(())
            }
        }
    }

    fn write_children<W: OfxWriter + ?Sized>(
        &self,
        aggregate: &dyn Aggregate,
        attribute: &AttributeDescriptor,
        writer: &mut W,
    ) -> Result<()> {
        let children = attribute.children(aggregate);
        if children.is_empty() && !attribute.is_collection() {
            return missing(attribute);
        }

        for child in children {
            let info = self
                .registry
                .info_of(child)
                .ok_or_else(|| MarshalError::NotAnAggregate(child.type_name().to_string()))?;
            let name = if attribute.is_collection() {
                info.wire_name()
            } else {
                attribute.name()
            };
            let name =
                name.ok_or_else(|| MarshalError::NotAnAggregate(child.type_name().to_string()))?;

            writer.write_start_aggregate(name)?;
            self.write_attributes(child, info.attributes(), writer)?;
            writer.write_end_aggregate(name)?;
        }
        Ok(())
    }

    /// Marshals `aggregate` into a document of the configured version.
    ///
    /// OFX 1 documents are ISO-8859-1, OFX 2 documents UTF-8.
    ///
    /// # Errors
    /// See [`Marshaller::marshal`].
    pub fn marshal_to_bytes(&self, aggregate: &dyn Aggregate, config: &MarshalConfig) -> Result<Bytes> {
        match config.version {
            OfxVersion::V1 => {
                let mut writer = Defaults {
                    inner: V1Writer::new().with_attributes_on_new_line(config.attributes_on_new_line),
                    config,
                };
                self.marshal(aggregate, &mut writer)?;
                Ok(writer.inner.finish())
            }
            OfxVersion::V2 => {
                let mut writer = Defaults {
                    inner: V2Writer::new(),
                    config,
                };
                self.marshal(aggregate, &mut writer)?;
                Ok(writer.inner.finish())
            }
        }
    }

    /// Marshals `aggregate` into a string of the configured version.
    ///
    /// # Errors
    /// See [`Marshaller::marshal`].
    pub fn marshal_to_string(&self, aggregate: &dyn Aggregate, config: &MarshalConfig) -> Result<String> {
        let bytes = self.marshal_to_bytes(aggregate, config)?;
        Ok(match config.version {
            OfxVersion::V1 => bytes.iter().map(|&b| char::from(b)).collect(),
            OfxVersion::V2 => String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn missing(attribute: &AttributeDescriptor) -> Result<()> {
    if attribute.is_required() {
        return Err(MarshalError::MissingRequired {
            attribute: attribute.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Fills headers the document leaves unset from the configuration.
struct Defaults<'c, W> {
    inner: W,
    config: &'c MarshalConfig,
}

impl<W: OfxWriter> OfxWriter for Defaults<'_, W> {
    fn write_headers(&mut self, headers: &BTreeMap<String, String>) -> Result<()> {
        let mut headers = headers.clone();
        for name in ["SECURITY", "OLDFILEUID", "NEWFILEUID"] {
            if !headers.contains_key(name)
                && let Some(value) = self.config.default_header(name)
            {
                headers.insert(name.to_string(), value.to_string());
            }
        }
        self.inner.write_headers(&headers)
    }

    fn write_start_aggregate(&mut self, name: &str) -> Result<()> {
        self.inner.write_start_aggregate(name)
    }

    fn write_element(&mut self, name: &str, value: &str) -> Result<()> {
        self.inner.write_element(name, value)
    }

    fn write_end_aggregate(&mut self, name: &str) -> Result<()> {
        self.inner.write_end_aggregate(name)
    }
}
