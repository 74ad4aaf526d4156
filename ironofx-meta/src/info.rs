/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Per-type wire shape.
//!
//! A [`TypeInfo`] holds the wire name of an aggregate type, its attributes
//! sorted by order, and its document headers. Attribute resolution by wire
//! name is order-sensitive: the same tag may appear at several positions of
//! an aggregate, and only the [`Cursor`] of the caller tells them apart.

use crate::aggregate::Aggregate;
use crate::attribute::{AttributeDescriptor, AttributeKind, HeaderDescriptor};
use ironofx_core::{ConversionError, ScalarKind, ScalarValue};
use smallvec::SmallVec;
use std::any::TypeId;
use std::collections::BTreeMap;

/// Position of the last attribute resolved within one aggregate instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    order: i32,
    index: Option<usize>,
}

impl Cursor {
    /// A cursor before every attribute.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: 0,
            index: None,
        }
    }

    /// A cursor positioned at an order, with no attribute resolved yet.
    #[must_use]
    pub const fn at_order(order: i32) -> Self {
        Self { order, index: None }
    }

    /// The order hint.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Moves the cursor to a resolved attribute.
    pub fn advance(&mut self, resolved: &Resolved<'_>) {
        self.order = resolved.descriptor.order();
        self.index = Some(resolved.index);
    }
}

/// An attribute found by [`TypeInfo::attribute`].
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Index of the attribute in [`TypeInfo::attributes`].
    pub index: usize,
    /// The attribute.
    pub descriptor: &'a AttributeDescriptor,
}

/// Wire shape of one aggregate type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    name: Option<String>,
    type_id: TypeId,
    type_name: &'static str,
    attributes: Vec<AttributeDescriptor>,
    headers: BTreeMap<String, HeaderDescriptor>,
}

impl TypeInfo {
    /// Creates an unnamed info, seeded with the attributes and headers of `parent`.
    pub(crate) fn seeded(
        type_id: TypeId,
        type_name: &'static str,
        parent: Option<&TypeInfo>,
    ) -> Self {
        let (attributes, headers) = match parent {
            Some(parent) => (parent.attributes.clone(), parent.headers.clone()),
            None => (Vec::new(), BTreeMap::new()),
        };
        Self {
            name: None,
            type_id,
            type_name,
            attributes,
            headers,
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Inserts an attribute after every attribute of lower or equal order.
    pub(crate) fn insert(&mut self, descriptor: AttributeDescriptor) {
        let at = self
            .attributes
            .partition_point(|existing| existing.order() <= descriptor.order());
        self.attributes.insert(at, descriptor);
    }

    pub(crate) fn insert_header(&mut self, header: HeaderDescriptor) {
        self.headers.insert(header.name().to_string(), header);
    }

    /// Registered wire name, if the type has been registered under one.
    #[must_use]
    pub fn wire_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Wire name, or the Rust type name for unregistered types.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.type_name)
    }

    /// Type id of the described type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the described type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Attributes sorted by order; ties keep declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Resolves the attribute a wire tag refers to.
    ///
    /// Attributes named `name` are the candidates. A single candidate is
    /// returned as is. Among several, the first one at or after the cursor
    /// order that lies past the last resolved attribute wins. Otherwise the
    /// collection bucket is used: the first collection at or after the cursor
    /// order, or the last collection if none qualifies. `assignable` filters
    /// collections by their declared entry type.
    #[must_use]
    pub fn attribute(
        &self,
        name: &str,
        cursor: Cursor,
        assignable: Option<&dyn Fn(TypeId) -> bool>,
    ) -> Option<Resolved<'_>> {
        let mut candidates: SmallVec<[Resolved<'_>; 4]> = SmallVec::new();
        let mut bucket: Option<Resolved<'_>> = None;

        for (index, descriptor) in self.attributes.iter().enumerate() {
            let resolved = Resolved { index, descriptor };
            if descriptor.name() == Some(name) {
                candidates.push(resolved);
            } else if descriptor.is_collection() {
                if let (Some(check), Some(entry)) = (assignable, descriptor.entry_type())
                    && !check(entry)
                {
                    continue;
                }
                match bucket {
                    Some(current) if current.descriptor.order() >= cursor.order => {}
                    _ => bucket = Some(resolved),
                }
            }
        }

        match candidates.len() {
            1 => return Some(candidates[0]),
            0 => {}
            _ => {
                let next = candidates.iter().find(|c| {
                    c.descriptor.order() >= cursor.order
                        && cursor.index.is_none_or(|last| c.index > last)
                });
                if let Some(next) = next {
                    return Some(*next);
                }
            }
        }

        bucket
    }

    /// Returns true if the type declares document headers.
    #[must_use]
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Header descriptors by name.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, HeaderDescriptor> {
        &self.headers
    }

    /// Scalar kind of a header, if declared.
    #[must_use]
    pub fn header_kind(&self, name: &str) -> Option<ScalarKind> {
        self.headers.get(name).map(HeaderDescriptor::kind)
    }

    /// Sets a header on `instance`. Undeclared headers are ignored.
    ///
    /// # Errors
    /// Returns `ConversionError` if the value does not fit the header field.
    pub fn set_header(
        &self,
        instance: &mut dyn Aggregate,
        name: &str,
        value: Option<ScalarValue>,
    ) -> Result<(), ConversionError> {
        match self.headers.get(name) {
            Some(header) => header.set_value(instance, value),
            None => Ok(()),
        }
    }

    /// Reads every declared header of `instance`.
    #[must_use]
    pub fn header_values(&self, instance: &dyn Aggregate) -> BTreeMap<String, Option<ScalarValue>> {
        self.headers
            .iter()
            .map(|(name, header)| (name.clone(), header.get_value(instance)))
            .collect()
    }

    /// Returns true if at least one attribute is of the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: AttributeKind) -> bool {
        self.attributes.iter().any(|a| a.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use ironofx_core::MetadataError;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Entry;

    impl Aggregate for Entry {
        fn describe(_registry: &mut Registry) -> Result<(), MetadataError> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Other;

    impl Aggregate for Other {
        fn describe(_registry: &mut Registry) -> Result<(), MetadataError> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sample {
        late: Option<String>,
        early: Option<String>,
        memo: Option<String>,
        entries: Vec<Entry>,
        others: Vec<Other>,
    }

    impl Aggregate for Sample {
        fn describe(_registry: &mut Registry) -> Result<(), MetadataError> {
            Ok(())
        }
    }

    fn text(name: &str, order: i32) -> AttributeDescriptor {
        fn get(a: &Sample) -> Option<String> {
            a.memo.clone()
        }
        fn set(a: &mut Sample, v: Option<String>) {
            a.memo = v;
        }
        AttributeDescriptor::element(name, order, get, set)
    }

    fn entries(order: i32) -> AttributeDescriptor {
        fn get(a: &Sample) -> &[Entry] {
            &a.entries
        }
        fn push(a: &mut Sample, v: Entry) {
            a.entries.push(v);
        }
        AttributeDescriptor::collection(order, get, push)
    }

    fn others(order: i32) -> AttributeDescriptor {
        fn get(a: &Sample) -> &[Other] {
            &a.others
        }
        fn push(a: &mut Sample, v: Other) {
            a.others.push(v);
        }
        AttributeDescriptor::collection(order, get, push)
    }

    fn info(attributes: Vec<AttributeDescriptor>) -> TypeInfo {
        let mut info = TypeInfo::seeded(TypeId::of::<Sample>(), "Sample", None);
        for attribute in attributes {
            info.insert(attribute);
        }
        info
    }

    #[test]
    fn test_insert_keeps_order_and_ties() {
        let info = info(vec![text("C", 30), text("A", 10), text("B1", 20), text("B2", 20)]);
        let names: Vec<_> = info.attributes().iter().filter_map(|a| a.name()).collect();
        assert_eq!(names, ["A", "B1", "B2", "C"]);
    }

    #[test]
    fn test_single_candidate_ignores_cursor() {
        let info = info(vec![text("MEMO", 10), text("NAME", 20)]);
        let resolved = info.attribute("MEMO", Cursor::at_order(50), None).unwrap();
        assert_eq!(resolved.descriptor.order(), 10);
    }

    #[test]
    fn test_repeated_name_follows_cursor() {
        let info = info(vec![text("DT", 50), text("DT", 10)]);

        let mut cursor = Cursor::new();
        let first = info.attribute("DT", cursor, None).unwrap();
        assert_eq!(first.descriptor.order(), 10);
        cursor.advance(&first);

        let second = info.attribute("DT", cursor, None).unwrap();
        assert_eq!(second.descriptor.order(), 50);
        cursor.advance(&second);

        assert!(info.attribute("DT", cursor, None).is_none());
    }

    #[test]
    fn test_repeated_name_with_equal_orders_uses_declaration_order() {
        let info = info(vec![text("DT", 10), text("DT", 10)]);
        let mut cursor = Cursor::new();
        let first = info.attribute("DT", cursor, None).unwrap();
        assert_eq!(first.index, 0);
        cursor.advance(&first);
        let second = info.attribute("DT", cursor, None).unwrap();
        assert_eq!(second.index, 1);
    }

    #[test]
    fn test_order_hint_without_position() {
        let info = info(vec![text("DT", 10), text("DT", 50)]);
        let resolved = info.attribute("DT", Cursor::at_order(20), None).unwrap();
        assert_eq!(resolved.descriptor.order(), 50);
    }

    #[test]
    fn test_collection_bucket_prefers_next_collection() {
        let info = info(vec![entries(10), text("MEMO", 20), others(30)]);

        let at_start = info.attribute("POSSTOCK", Cursor::new(), None).unwrap();
        assert_eq!(at_start.descriptor.order(), 10);

        let after_memo = info.attribute("POSSTOCK", Cursor::at_order(20), None).unwrap();
        assert_eq!(after_memo.descriptor.order(), 30);

        let past_all = info.attribute("POSSTOCK", Cursor::at_order(40), None).unwrap();
        assert_eq!(past_all.descriptor.order(), 30);
    }

    #[test]
    fn test_collection_bucket_filters_entry_type() {
        let info = info(vec![entries(10), others(30)]);
        let wants_other = |id: TypeId| id == TypeId::of::<Other>();
        let resolved = info
            .attribute("ANY", Cursor::new(), Some(&wants_other))
            .unwrap();
        assert_eq!(resolved.descriptor.order(), 30);

        let wants_nothing = |_: TypeId| false;
        assert!(info.attribute("ANY", Cursor::new(), Some(&wants_nothing)).is_none());
    }

    #[test]
    fn test_unknown_name_without_collections() {
        let info = info(vec![text("MEMO", 10)]);
        assert!(info.attribute("NOPE", Cursor::new(), None).is_none());
    }
}
