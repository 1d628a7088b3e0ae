//! Type definitions shared across the engine.

mod relation;

pub use relation::RelationKey;
