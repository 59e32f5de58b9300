//! Errors reported by the storage layer.
//!
//! Every contract of the allocator, the dense store, the tables and the databases is reported
//! through [`StorageError`] instead of an assertion. These are programmer errors: callers are
//! expected to fix the call site rather than recover at runtime, but nothing in this crate
//! turns them into undefined behaviour.

use thiserror::Error;

/// Result alias used throughout the storage layer.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure of a storage operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Lookup, removal or reservation of an id that is not present.
    #[error("id {0} is not present")]
    InvalidId(u32),

    /// Insertion at an id that is already live.
    #[error("id {0} is already present")]
    DuplicateId(u32),

    /// A weak reference or handle whose target has been destroyed.
    #[error("reference no longer points at a live object")]
    StaleReference,

    /// Reserving an id that is already reserved.
    #[error("id {0} is already reserved")]
    ReservationConflict(u32),

    /// Release of an id that was never issued, or was already released.
    #[error("id {0} is not live and cannot be released")]
    NotLive(u32),

    /// The id type cannot represent another value.
    #[error("id space of `{0}` is exhausted")]
    Exhausted(&'static str),

    /// No class is registered under the given name or id.
    #[error("unknown class `{0}`")]
    UnknownClass(String),

    /// The Rust type was never registered as a class.
    #[error("type `{0}` is not registered as a class")]
    UnregisteredType(&'static str),

    /// A class with the same name or Rust type is already registered.
    #[error("class `{0}` is already registered")]
    DuplicateClass(String),

    /// The class has no storage of its own and cannot be instantiated.
    #[error("class `{0}` is abstract")]
    AbstractClass(String),

    /// The class is stored with another Rust type, or lies outside the required hierarchy.
    #[error("class `{class}` is not a `{expected}`")]
    ClassMismatch {
        /// The offending class.
        class: String,
        /// What the operation required.
        expected: String,
    },

    /// A weak reference was resolved against a table it was not created by.
    #[error("reference belongs to another table")]
    ForeignReference,
}
