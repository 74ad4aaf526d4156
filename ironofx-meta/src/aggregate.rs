/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! The aggregate trait implemented by every OFX domain type.
//!
//! Domain types normally get their implementation from
//! `#[derive(Aggregate)]`. The trait object `dyn Aggregate` is what the
//! engine moves around: descriptors read and write fields through it, and
//! polymorphic collections store `Box<dyn Aggregate>` entries.

use crate::registry::Registry;
use ironofx_core::MetadataError;
use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Object-safe plumbing shared by all aggregates.
///
/// Implemented automatically for every `Aggregate + Clone + PartialEq` type.
pub trait AggregateObject {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Converts a boxed aggregate into a boxed `Any`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Clones the aggregate behind a trait object.
    fn clone_aggregate(&self) -> Box<dyn Aggregate>;

    /// Compares with another aggregate of possibly different concrete type.
    fn eq_aggregate(&self, other: &dyn Aggregate) -> bool;

    /// Rust type name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T> AggregateObject for T
where
    T: Aggregate + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_aggregate(&self) -> Box<dyn Aggregate> {
        Box::new(self.clone())
    }

    fn eq_aggregate(&self, other: &dyn Aggregate) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A type with an OFX wire shape.
///
/// `describe` registers the type's wire name, elements, child aggregates and
/// headers with a [`Registry`]. Types that extend a base aggregate embed the
/// base as a field and override [`Aggregate::upcast`] so that descriptors
/// declared on the base can reach it.
pub trait Aggregate: AggregateObject + Any + Debug + Send + Sync + 'static {
    /// Registers this type's metadata.
    ///
    /// # Errors
    /// Returns `MetadataError` if a descriptor is inconsistent.
    fn describe(registry: &mut Registry) -> Result<(), MetadataError>
    where
        Self: Sized;

    /// Returns the part of `self` whose concrete type is `target`.
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        if self.as_any().type_id() == target {
            Some(self.as_any())
        } else {
            None
        }
    }

    /// Mutable counterpart of [`Aggregate::upcast`].
    fn upcast_mut(&mut self, target: TypeId) -> Option<&mut dyn Any> {
        if self.as_any().type_id() == target {
            Some(self.as_any_mut())
        } else {
            None
        }
    }
}

impl dyn Aggregate {
    /// Views the aggregate as `A`, which is either its concrete type or an
    /// embedded base.
    #[must_use]
    pub fn view<A: Aggregate>(&self) -> Option<&A> {
        self.upcast(TypeId::of::<A>())?.downcast_ref::<A>()
    }

    /// Mutable counterpart of [`view`](Self::view).
    pub fn view_mut<A: Aggregate>(&mut self) -> Option<&mut A> {
        self.upcast_mut(TypeId::of::<A>())?.downcast_mut::<A>()
    }

    /// Type id of the concrete type behind the trait object.
    #[must_use]
    pub fn concrete_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Returns true if the concrete type is `A`.
    #[must_use]
    pub fn is<A: Aggregate>(&self) -> bool {
        self.concrete_type_id() == TypeId::of::<A>()
    }

    /// Downcasts a boxed aggregate to its concrete type.
    #[must_use]
    pub fn downcast<A: Aggregate>(self: Box<Self>) -> Option<Box<A>> {
        self.into_any().downcast::<A>().ok()
    }
}

impl Clone for Box<dyn Aggregate> {
    fn clone(&self) -> Self {
        (**self).clone_aggregate()
    }
}

impl PartialEq for dyn Aggregate {
    fn eq(&self, other: &Self) -> bool {
        self.eq_aggregate(other)
    }
}
