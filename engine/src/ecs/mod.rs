//! Storage layers, bottom up.
//!
//! - [`storage`]: id allocation, the dense store, weak references and typed tables
//! - [`class`]: the class hierarchy and the table factory of each concrete class
//! - [`database`]: one lazily created table per class
//! - [`entity`] and [`asset`]: databases specialized over a class-keyed database

pub mod asset;
pub mod class;
pub mod database;
pub mod entity;
pub mod error;
pub mod object;
pub mod storage;

pub use asset::AssetDatabase;
pub use class::ClassId;
pub use database::{Config, ObjectDatabase};
pub use entity::{EntityComponentDatabase, EntityComponentId, EntityId, EntityState};
pub use error::{Result, StorageError};
pub use object::Object;
pub use storage::{Handle, Id, Table, WeakRef};
