//! Entities and the components attached to them.
//!
//! Entities are objects of classes descending from an entity root class; components are
//! objects of classes descending from a component root class. Both live in class-keyed
//! databases, tied together by the [`EntityComponentDatabase`]:
//!
//! - **[`EntityId`]**: one id namespace shared by every entity class. A component is stored
//!   under the id of the entity owning it, in the table of its own class.
//!
//! - **[`ComponentTypeId`]**: a small per-component-class id, allocated the first time a
//!   component of that class is created.
//!
//! - **[`EntityComponentId`]**: a compact handle to one specific component instance, packing
//!   the entity id and the component type id into a single `u64`:
//!
//! ```text
//!  63                                  8 7        0
//!  ┌────────────────────────────────────┬──────────┐
//!  │             entity id              │ type id  │
//!  └────────────────────────────────────┴──────────┘
//! ```
//!
//! # Entity lifecycle
//!
//! ```text
//!  Unborn ── create_entity ──► Created ── create_component ──► Populated
//!                                 │                               │
//!                                 └──────── remove_entity ────────┴──► Destroyed
//! ```
//!
//! Removing an entity first finalizes and detaches every component it owns.

mod database;

use std::fmt;

use crate::ecs::storage::{Id, SlotId};

pub use database::EntityComponentDatabase;

/// Identifier of an entity, unique across every entity class of a database.
pub type EntityId = Id;

/// Small identifier of a component class within one database.
///
/// Zero is invalid, so a database supports at most 255 component classes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// The invalid component type id.
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl SlotId for ComponentTypeId {
    const MAX: u32 = u8::MAX as u32;
    const NAME: &'static str = "ComponentTypeId";

    #[inline]
    fn from_raw(raw: u32) -> Self {
        debug_assert!(raw <= Self::MAX);
        Self(raw as u8)
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component-type#{}", self.0)
    }
}

/// Handle to one component instance: the owning entity plus the component type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityComponentId(u64);

impl EntityComponentId {
    const TYPE_BITS: u32 = 8;

    #[inline]
    pub const fn new(entity: EntityId, component_type: ComponentTypeId) -> Self {
        Self(((entity.get() as u64) << Self::TYPE_BITS) | component_type.get() as u64)
    }

    /// The entity owning the component.
    #[inline]
    pub const fn entity(&self) -> EntityId {
        Id::new((self.0 >> Self::TYPE_BITS) as u32)
    }

    /// The class of the component, as its small type id.
    #[inline]
    pub const fn component_type(&self) -> ComponentTypeId {
        ComponentTypeId(self.0 as u8)
    }

    /// The packed value.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity(), self.component_type())
    }
}

/// Where an entity id is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Never issued.
    Unborn,
    /// Live, without components.
    Created,
    /// Live, with at least one component.
    Populated,
    /// Issued once, removed since and not reissued.
    Destroyed,
}
