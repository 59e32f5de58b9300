//! Class-keyed object storage.
//!
//! Values of many Rust types are stored per class in packed tables with recyclable ids.
//! Non-owning references into those tables keep resolving to the same value while the tables
//! compact themselves. See [`ecs`] for the layers.

pub mod ecs;
