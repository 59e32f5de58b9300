//! Class descriptors: the runtime identity of every storable type.
//!
//! A class has a name, an optional parent and, unless it is abstract, the Rust type of its
//! values together with a factory producing the table that stores them. Databases key their
//! tables by [`ClassId`] and answer hierarchy questions ("is this class a kind of that one?")
//! with the precomputed ancestor set of each [`Descriptor`]:
//!
//! ```text
//!  Object (0)                 ancestors(Mesh)      = {Object, Asset}
//!    └── Asset (1)            ancestors(Texture)   = {Object, Asset}
//!          ├── Mesh (2)       Asset.is_base_of(Mesh)   -> true
//!          └── Texture (3)    Mesh.is_a(Asset)         -> true
//! ```
//!
//! Classes are registered once, at startup, in a shared [`Registry`].

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use fixedbitset::FixedBitSet;

use crate::ecs::storage::ErasedTable;

pub mod registry;

pub use registry::Registry;

/// Identifier of a registered class, its index in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the index for this class id.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// Builds the empty table storing the values of one concrete class.
pub type TableFactory = Arc<dyn Fn() -> Box<dyn ErasedTable> + Send + Sync>;

/// The Rust type behind a concrete class.
#[derive(Clone)]
pub(crate) struct ValueType {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) factory: TableFactory,
}

/// Everything known about one registered class.
pub struct Descriptor {
    id: ClassId,
    name: String,
    parent: Option<ClassId>,

    /// Strict ancestors, one bit per class id.
    ancestors: FixedBitSet,

    /// `None` for abstract classes.
    value: Option<ValueType>,
}

impl Descriptor {
    pub(crate) fn new(
        id: ClassId,
        name: String,
        parent: Option<ClassId>,
        ancestors: FixedBitSet,
        value: Option<ValueType>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            ancestors,
            value,
        }
    }

    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Strict ancestors in class id order.
    pub fn ancestors(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.ancestors.ones().map(|index| ClassId(index as u32))
    }

    /// Check whether this class is a strict ancestor of `other`.
    #[inline]
    pub fn is_base_of(&self, other: &Descriptor) -> bool {
        other.ancestors.contains(self.id.index())
    }

    /// Check whether this class is `base` or descends from it.
    #[inline]
    pub fn is_a(&self, base: ClassId) -> bool {
        self.id == base || self.ancestors.contains(base.index())
    }

    /// Abstract classes have no value type and cannot be instantiated.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.value.is_none()
    }

    /// The [`TypeId`] of the values of a concrete class.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.value.as_ref().map(|value| value.type_id)
    }

    /// Rust type name of the values of a concrete class.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.value.as_ref().map(|value| value.type_name)
    }

    pub(crate) fn factory(&self) -> Option<&TableFactory> {
        self.value.as_ref().map(|value| &value.factory)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("type_name", &self.type_name())
            .finish()
    }
}
