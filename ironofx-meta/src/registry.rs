/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Aggregate type registry.
//!
//! The [`Registry`] maps Rust types to their [`TypeInfo`] and wire names to
//! constructible types. The process-wide instance returned by
//! [`Registry::global`] is built once from every type that derives
//! `Aggregate` and is read-only afterwards.

use crate::aggregate::Aggregate;
use crate::attribute::{AttributeDescriptor, AttributeKind, Constructor, HeaderDescriptor, construct};
use crate::info::TypeInfo;
use ironofx_core::MetadataError;
use linkme::distributed_slice;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

/// Registration function of one aggregate type.
pub type DescribeFn = fn(&mut Registry) -> Result<(), MetadataError>;

/// Registration functions of every aggregate type linked into the binary.
#[distributed_slice]
pub static AGGREGATES: [DescribeFn];

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::new();
    for describe in AGGREGATES.iter() {
        if let Err(e) = describe(&mut registry) {
            error!(error = %e, "Failed to register aggregate type");
        }
    }
    info!(
        types = registry.infos.len(),
        names = registry.by_name.len(),
        "Aggregate registry initialized"
    );
    registry
});

/// A registered, constructible aggregate type.
#[derive(Debug, Clone, Copy)]
pub struct AggregateFactory {
    /// Type id of the registered type.
    pub type_id: TypeId,
    /// Rust type name, for diagnostics.
    pub type_name: &'static str,
    constructor: Constructor,
}

impl AggregateFactory {
    /// Creates a default instance.
    #[must_use]
    pub fn construct(&self) -> Box<dyn Aggregate> {
        (self.constructor)()
    }
}

/// Aggregate metadata registry.
#[derive(Debug, Default)]
pub struct Registry {
    infos: HashMap<TypeId, TypeInfo>,
    by_name: HashMap<String, AggregateFactory>,
    parents: HashMap<TypeId, TypeId>,
    described: HashSet<TypeId>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry of every derived aggregate type.
    #[must_use]
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Registers `T` and, through its description, every type it refers to.
    ///
    /// Describing a type twice is a no-op.
    ///
    /// # Errors
    /// Returns `MetadataError` if a descriptor of `T` is inconsistent.
    pub fn describe<T: Aggregate>(&mut self) -> Result<(), MetadataError> {
        if !self.described.insert(TypeId::of::<T>()) {
            return Ok(());
        }
        debug!(type_name = std::any::type_name::<T>(), "Describing aggregate type");
        T::describe(self)
    }

    /// Declares `P` as the base of `T`: `T` starts out with the wire shape of `P`.
    ///
    /// Must precede every other registration call for `T`.
    ///
    /// # Errors
    /// Returns `MetadataError` if `P` cannot be described.
    pub fn inherit<T: Aggregate, P: Aggregate>(&mut self) -> Result<(), MetadataError> {
        self.describe::<P>()?;
        self.parents.insert(TypeId::of::<T>(), TypeId::of::<P>());
        Ok(())
    }

    /// Registers `T` under a wire name.
    ///
    /// An info seeded from a base keeps its attributes and takes the name.
    pub fn register<T: Aggregate + Default>(&mut self, name: &str) {
        self.seeded::<T>().set_name(name);
        let factory = AggregateFactory {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            constructor: construct::<T>,
        };
        if let Some(previous) = self.by_name.insert(name.to_string(), factory)
            && previous.type_id != factory.type_id
        {
            warn!(
                wire_name = name,
                previous = previous.type_name,
                current = factory.type_name,
                "Aggregate name registered by more than one type"
            );
        }
    }

    /// Adds an element attribute to `T`.
    ///
    /// # Errors
    /// Returns `MetadataError::KindMismatch` if the descriptor is not an element.
    pub fn add_element<T: Aggregate>(
        &mut self,
        descriptor: AttributeDescriptor,
    ) -> Result<(), MetadataError> {
        if descriptor.kind() != AttributeKind::Element {
            return Err(MetadataError::KindMismatch {
                descriptor: descriptor.to_string(),
                expected: "element",
            });
        }
        self.seeded::<T>().insert(descriptor);
        Ok(())
    }

    /// Adds a child aggregate or collection attribute to `T`.
    ///
    /// An unnamed single child takes the wire name of its declared type,
    /// which must already be registered.
    ///
    /// # Errors
    /// Returns `MetadataError::KindMismatch` for element descriptors and
    /// `MetadataError::UnnamedChild` if no wire name can be found.
    pub fn add_child_aggregate<T: Aggregate>(
        &mut self,
        mut descriptor: AttributeDescriptor,
    ) -> Result<(), MetadataError> {
        match descriptor.kind() {
            AttributeKind::Element => {
                return Err(MetadataError::KindMismatch {
                    descriptor: descriptor.to_string(),
                    expected: "child aggregate",
                });
            }
            AttributeKind::SingleChild if descriptor.name().is_none() => {
                let child = descriptor.aggregate_type();
                let name = child
                    .and_then(|ty| self.infos.get(&ty.type_id))
                    .and_then(TypeInfo::wire_name)
                    .map(str::to_string);
                match name {
                    Some(name) => descriptor.set_name(&name),
                    None => {
                        let type_name = child.map_or("unknown", |ty| ty.type_name);
                        return Err(MetadataError::UnnamedChild(type_name.to_string()));
                    }
                }
            }
            _ => {}
        }
        self.seeded::<T>().insert(descriptor);
        Ok(())
    }

    /// Adds a document header to `T`.
    pub fn add_header<T: Aggregate>(&mut self, header: HeaderDescriptor) {
        self.seeded::<T>().insert_header(header);
    }

    /// Info of a type.
    #[must_use]
    pub fn info(&self, type_id: TypeId) -> Option<&TypeInfo> {
        self.infos.get(&type_id)
    }

    /// Info of the concrete type of an aggregate.
    #[must_use]
    pub fn info_of(&self, aggregate: &dyn Aggregate) -> Option<&TypeInfo> {
        self.infos.get(&aggregate.concrete_type_id())
    }

    /// Info of `T`.
    #[must_use]
    pub fn info_for<T: Aggregate>(&self) -> Option<&TypeInfo> {
        self.infos.get(&TypeId::of::<T>())
    }

    /// Looks up a constructible type by wire name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&AggregateFactory> {
        self.by_name.get(name)
    }

    /// Registered wire name of `T`.
    #[must_use]
    pub fn aggregate_name<T: Aggregate>(&self) -> Option<&str> {
        self.info_for::<T>().and_then(TypeInfo::wire_name)
    }

    /// Returns true if values of `candidate` may be stored where `declared` is expected.
    #[must_use]
    pub fn is_assignable(&self, declared: TypeId, candidate: TypeId) -> bool {
        let mut current = Some(candidate);
        while let Some(type_id) = current {
            if type_id == declared {
                return true;
            }
            current = self.parents.get(&type_id).copied();
        }
        false
    }

    /// Number of types with metadata.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns true if no type has metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    fn nearest_ancestor(&self, type_id: TypeId) -> Option<&TypeInfo> {
        let mut current = self.parents.get(&type_id).copied();
        while let Some(parent) = current {
            if let Some(info) = self.infos.get(&parent) {
                return Some(info);
            }
            current = self.parents.get(&parent).copied();
        }
        None
    }

    fn seeded<T: Aggregate>(&mut self) -> &mut TypeInfo {
        let type_id = TypeId::of::<T>();
        let parent = if self.infos.contains_key(&type_id) {
            None
        } else {
            self.nearest_ancestor(type_id).cloned()
        };
        self.infos.entry(type_id).or_insert_with(|| {
            TypeInfo::seeded(type_id, std::any::type_name::<T>(), parent.as_ref())
        })
    }
}
