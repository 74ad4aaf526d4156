/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Attribute and header descriptors.
//!
//! This module defines:
//! - [`AttributeKind`]: Element, single child aggregate or collection of children
//! - [`AttributeDescriptor`]: One field of an aggregate with its wire name,
//!   order, required flag and type-erased accessors
//! - [`HeaderDescriptor`]: One document header of a root aggregate
//!
//! Descriptors are built from plain function pointers over the owning type,
//! so a descriptor without both an accessor and a mutator cannot be built.

use crate::aggregate::Aggregate;
use ironofx_core::{ConversionError, ScalarKind, ScalarValue, WireScalar};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

type ElementGetter = Arc<dyn Fn(&dyn Aggregate) -> Option<ScalarValue> + Send + Sync>;
type ElementSetter =
    Arc<dyn Fn(&mut dyn Aggregate, Option<ScalarValue>) -> Result<(), ConversionError> + Send + Sync>;
type ChildGetter = Arc<dyn for<'a> Fn(&'a dyn Aggregate) -> Vec<&'a dyn Aggregate> + Send + Sync>;
type ChildSetter =
    Arc<dyn Fn(&mut dyn Aggregate, Box<dyn Aggregate>) -> Result<(), ConversionError> + Send + Sync>;

/// Constructs a default instance of an aggregate type.
pub type Constructor = fn() -> Box<dyn Aggregate>;

/// Default constructor of `C` as a [`Constructor`].
#[must_use]
pub fn construct<C: Aggregate + Default>() -> Box<dyn Aggregate> {
    Box::new(C::default())
}

/// What an attribute holds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// A leaf element with a scalar value.
    Element,
    /// A single nested aggregate.
    SingleChild,
    /// A repeated nested aggregate; entries carry their own wire names.
    CollectionChild,
}

impl AttributeKind {
    /// Returns true for both child kinds.
    #[must_use]
    pub const fn is_child(self) -> bool {
        matches!(self, Self::SingleChild | Self::CollectionChild)
    }
}

/// Declared aggregate type of a child attribute.
#[derive(Debug, Clone, Copy)]
pub struct AggregateType {
    /// Type id of the declared type.
    pub type_id: TypeId,
    /// Rust type name, for diagnostics.
    pub type_name: &'static str,
    constructor: Option<Constructor>,
}

impl AggregateType {
    fn of<C: Aggregate>(constructor: Option<Constructor>) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            constructor,
        }
    }

    /// Default constructor of the declared type, if it is constructible.
    #[must_use]
    pub const fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }
}

/// The value type of an attribute.
#[derive(Debug, Clone, Copy)]
pub enum ValueType {
    /// Scalar leaf value.
    Scalar(ScalarKind),
    /// Nested aggregate. For collections, the declared entry type.
    Aggregate(AggregateType),
}

#[derive(Clone)]
enum Access {
    Element {
        get: ElementGetter,
        set: ElementSetter,
    },
    Child {
        get: ChildGetter,
        set: ChildSetter,
    },
    Collection {
        get: ChildGetter,
        push: ChildSetter,
    },
}

fn child_getter<F>(f: F) -> ChildGetter
where
    F: for<'a> Fn(&'a dyn Aggregate) -> Vec<&'a dyn Aggregate> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn element_access<A, V>(
    get: fn(&A) -> Option<V>,
    set: fn(&mut A, Option<V>),
) -> (ElementGetter, ElementSetter)
where
    A: Aggregate,
    V: WireScalar + 'static,
{
    let getter: ElementGetter =
        Arc::new(move |agg: &dyn Aggregate| agg.view::<A>().and_then(get).map(V::into_scalar));
    let setter: ElementSetter = Arc::new(
        move |agg: &mut dyn Aggregate, value: Option<ScalarValue>| -> Result<(), ConversionError> {
            let value = value.map(V::from_scalar).transpose()?;
            let found = agg.type_name();
            match agg.view_mut::<A>() {
                Some(target) => {
                    set(target, value);
                    Ok(())
                }
                None => Err(owner_mismatch::<A>(found)),
            }
        },
    );
    (getter, setter)
}

fn owner_mismatch<A>(found: &str) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: std::any::type_name::<A>().to_string(),
        found: found.to_string(),
    }
}

/// Describes one field of an aggregate type.
#[derive(Clone)]
pub struct AttributeDescriptor {
    name: Option<String>,
    order: i32,
    required: bool,
    value_type: ValueType,
    access: Access,
}

impl AttributeDescriptor {
    /// Describes a leaf element.
    #[must_use]
    pub fn element<A, V>(
        name: &str,
        order: i32,
        get: fn(&A) -> Option<V>,
        set: fn(&mut A, Option<V>),
    ) -> Self
    where
        A: Aggregate,
        V: WireScalar + 'static,
    {
        let (get, set) = element_access(get, set);
        Self {
            name: Some(name.to_string()),
            order,
            required: false,
            value_type: ValueType::Scalar(V::KIND),
            access: Access::Element { get, set },
        }
    }

    /// Describes a single child aggregate.
    ///
    /// Without a name the child takes the registered wire name of `C`.
    #[must_use]
    pub fn child<A, C>(
        name: Option<&str>,
        order: i32,
        get: fn(&A) -> Option<&C>,
        set: fn(&mut A, C),
    ) -> Self
    where
        A: Aggregate,
        C: Aggregate + Default,
    {
        let getter = child_getter(move |agg| {
            agg.view::<A>()
                .and_then(get)
                .map(|child| child as &dyn Aggregate)
                .into_iter()
                .collect()
        });
        let setter: ChildSetter = Arc::new(
            move |agg: &mut dyn Aggregate, child: Box<dyn Aggregate>| -> Result<(), ConversionError> {
                let found = child.type_name();
                let child = child.downcast::<C>().ok_or_else(|| owner_mismatch::<C>(found))?;
                let owner = agg.type_name();
                match agg.view_mut::<A>() {
                    Some(target) => {
                        set(target, *child);
                        Ok(())
                    }
                    None => Err(owner_mismatch::<A>(owner)),
                }
            },
        );
        Self {
            name: name.map(str::to_string),
            order,
            required: false,
            value_type: ValueType::Aggregate(AggregateType::of::<C>(Some(construct::<C>))),
            access: Access::Child {
                get: getter,
                set: setter,
            },
        }
    }

    /// Describes a collection whose entries are all of type `C`.
    #[must_use]
    pub fn collection<A, C>(order: i32, get: fn(&A) -> &[C], push: fn(&mut A, C)) -> Self
    where
        A: Aggregate,
        C: Aggregate + Default,
    {
        let getter = child_getter(move |agg| {
            agg.view::<A>()
                .map(get)
                .unwrap_or_default()
                .iter()
                .map(|child| child as &dyn Aggregate)
                .collect()
        });
        let pusher: ChildSetter = Arc::new(
            move |agg: &mut dyn Aggregate, child: Box<dyn Aggregate>| -> Result<(), ConversionError> {
                let found = child.type_name();
                let child = child.downcast::<C>().ok_or_else(|| owner_mismatch::<C>(found))?;
                let owner = agg.type_name();
                match agg.view_mut::<A>() {
                    Some(target) => {
                        push(target, *child);
                        Ok(())
                    }
                    None => Err(owner_mismatch::<A>(owner)),
                }
            },
        );
        Self {
            name: None,
            order,
            required: false,
            value_type: ValueType::Aggregate(AggregateType::of::<C>(Some(construct::<C>))),
            access: Access::Collection {
                get: getter,
                push: pusher,
            },
        }
    }

    /// Describes a collection of mixed concrete types sharing the entry type `E`.
    ///
    /// `E` is usually an abstract base embedded by every concrete entry type.
    #[must_use]
    pub fn polymorphic<A, E>(
        order: i32,
        get: fn(&A) -> &[Box<dyn Aggregate>],
        push: fn(&mut A, Box<dyn Aggregate>),
    ) -> Self
    where
        A: Aggregate,
        E: Aggregate,
    {
        let getter = child_getter(move |agg| {
            agg.view::<A>()
                .map(get)
                .unwrap_or_default()
                .iter()
                .map(|child| &**child)
                .collect()
        });
        let pusher: ChildSetter = Arc::new(
            move |agg: &mut dyn Aggregate, child: Box<dyn Aggregate>| -> Result<(), ConversionError> {
                let owner = agg.type_name();
                match agg.view_mut::<A>() {
                    Some(target) => {
                        push(target, child);
                        Ok(())
                    }
                    None => Err(owner_mismatch::<A>(owner)),
                }
            },
        );
        Self {
            name: None,
            order,
            required: false,
            value_type: ValueType::Aggregate(AggregateType::of::<E>(None)),
            access: Access::Collection {
                get: getter,
                push: pusher,
            },
        }
    }

    /// Marks the attribute as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Wire name. `None` for collections and for unnamed children before registration.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Order used to sort and disambiguate attributes.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Whether a value must be present when marshalling.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Kind of the attribute.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        match self.access {
            Access::Element { .. } => AttributeKind::Element,
            Access::Child { .. } => AttributeKind::SingleChild,
            Access::Collection { .. } => AttributeKind::CollectionChild,
        }
    }

    /// Returns true for collection attributes.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.access, Access::Collection { .. })
    }

    /// Value type of the attribute.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Scalar kind, for elements.
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.value_type {
            ValueType::Scalar(kind) => Some(kind),
            ValueType::Aggregate(_) => None,
        }
    }

    /// Declared aggregate type, for children and collections.
    #[must_use]
    pub const fn aggregate_type(&self) -> Option<AggregateType> {
        match self.value_type {
            ValueType::Aggregate(ty) => Some(ty),
            ValueType::Scalar(_) => None,
        }
    }

    /// Declared entry type of a collection.
    #[must_use]
    pub fn entry_type(&self) -> Option<TypeId> {
        if self.is_collection() {
            self.aggregate_type().map(|ty| ty.type_id)
        } else {
            None
        }
    }

    /// Reads an element value from `aggregate`.
    #[must_use]
    pub fn get_value(&self, aggregate: &dyn Aggregate) -> Option<ScalarValue> {
        match &self.access {
            Access::Element { get, .. } => get(aggregate),
            _ => None,
        }
    }

    /// Writes an element value into `aggregate`.
    ///
    /// # Errors
    /// Returns `ConversionError::TypeMismatch` if the value does not fit the
    /// field, or if this is not an element attribute.
    pub fn set_value(
        &self,
        aggregate: &mut dyn Aggregate,
        value: Option<ScalarValue>,
    ) -> Result<(), ConversionError> {
        match &self.access {
            Access::Element { set, .. } => set(aggregate, value),
            _ => Err(ConversionError::TypeMismatch {
                expected: "aggregate".to_string(),
                found: "element value".to_string(),
            }),
        }
    }

    /// Reads the child aggregates of `aggregate`: zero or one for a single
    /// child, every entry for a collection.
    #[must_use]
    pub fn children<'a>(&self, aggregate: &'a dyn Aggregate) -> Vec<&'a dyn Aggregate> {
        match &self.access {
            Access::Child { get, .. } | Access::Collection { get, .. } => get(aggregate),
            Access::Element { .. } => Vec::new(),
        }
    }

    /// Attaches a completed child: sets a single child, appends to a collection.
    ///
    /// # Errors
    /// Returns `ConversionError::TypeMismatch` if the child does not fit the field.
    pub fn attach(
        &self,
        aggregate: &mut dyn Aggregate,
        child: Box<dyn Aggregate>,
    ) -> Result<(), ConversionError> {
        match &self.access {
            Access::Child { set, .. } => set(aggregate, child),
            Access::Collection { push, .. } => push(aggregate, child),
            Access::Element { .. } => Err(ConversionError::TypeMismatch {
                expected: "element value".to_string(),
                found: child.type_name().to_string(),
            }),
        }
    }
}

impl fmt::Display for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), &self.name) {
            (AttributeKind::Element, Some(name)) => write!(f, "Element '{}'", name),
            (AttributeKind::SingleChild, Some(name)) => write!(f, "Child aggregate '{}'", name),
            (AttributeKind::Element | AttributeKind::SingleChild, None) => {
                write!(f, "Unnamed attribute at order {}", self.order)
            }
            (AttributeKind::CollectionChild, _) => match self.aggregate_type() {
                Some(ty) => write!(f, "Collection of {} at order {}", ty.type_name, self.order),
                None => write!(f, "Collection at order {}", self.order),
            },
        }
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("required", &self.required)
            .field("kind", &self.kind())
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// Describes a document header of a root aggregate.
#[derive(Clone)]
pub struct HeaderDescriptor {
    name: String,
    kind: ScalarKind,
    get: ElementGetter,
    set: ElementSetter,
}

impl HeaderDescriptor {
    /// Describes a header stored in a field of `A`.
    #[must_use]
    pub fn new<A, V>(name: &str, get: fn(&A) -> Option<V>, set: fn(&mut A, Option<V>)) -> Self
    where
        A: Aggregate,
        V: WireScalar + 'static,
    {
        let (get, set) = element_access(get, set);
        Self {
            name: name.to_string(),
            kind: V::KIND,
            get,
            set,
        }
    }

    /// Header name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar kind of the header value.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Reads the header value from `aggregate`.
    #[must_use]
    pub fn get_value(&self, aggregate: &dyn Aggregate) -> Option<ScalarValue> {
        (self.get)(aggregate)
    }

    /// Writes the header value into `aggregate`.
    ///
    /// # Errors
    /// Returns `ConversionError::TypeMismatch` if the value does not fit the field.
    pub fn set_value(
        &self,
        aggregate: &mut dyn Aggregate,
        value: Option<ScalarValue>,
    ) -> Result<(), ConversionError> {
        (self.set)(aggregate, value)
    }
}

impl fmt::Debug for HeaderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}
