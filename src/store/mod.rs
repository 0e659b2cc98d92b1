//! Store boundary for canopy.
//!
//! Defines the [`EntityStore`] trait the search core depends on, plus the
//! in-memory implementation used by the CLI and tests.

pub mod memory;
pub mod traits;

pub use memory::{Dataset, ImageEntry, MemoryEntityStore, NameVernacularEntry, OttVernacularEntry};
pub use traits::EntityStore;
