//! Typed, relocation-aware object storage.
//!
//! This module provides the foundational storage layer of the object databases: identifier
//! allocation, packed per-type storage, and non-owning references that keep pointing at the
//! right value while the storage compacts itself.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Databases                                                      │
//! │  - One table per class, keyed by ClassId                        │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │
//! ┌────────────────────────────▼────────────────────────────────────┐
//! │  Table<T>                                                       │
//! │  - Create / destroy hooks                                       │
//! │  - Patches weak references after every removal                  │
//! └────────┬───────────────────┬───────────────────┬────────────────┘
//!          │                   │                   │
//! ┌────────▼────────┐ ┌────────▼────────┐ ┌────────▼────────┐
//! │  Allocator      │ │  DenseStore     │ │  weak::Registry │
//! │  - Issues ids   │ │  - Packed Vec   │ │  - Position ->  │
//! │  - Reuse, pins  │ │  - Id -> Pos    │ │    holders      │
//! └─────────────────┘ └────────┬────────┘ └─────────────────┘
//!                              │
//!                     ┌────────▼────────┐
//!                     │  Index          │
//!                     │  - Hash / Block │
//!                     └─────────────────┘
//! ```
//!
//! Everything here is single threaded. Tables and the weak references into them are `!Send`.

pub mod allocator;
pub mod index;
pub mod position;
pub mod sparse;
pub mod table;
pub mod weak;

pub use allocator::{Allocator, Id, SlotId};
pub use index::{DynamicIndex, HashIndex, Index, SparseId};
pub use position::Position;
pub use sparse::{DenseStore, Relocation, Removed};
pub use table::{ErasedTable, Handle, Table};
pub use weak::WeakRef;
