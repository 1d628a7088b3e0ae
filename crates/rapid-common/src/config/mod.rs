//! Configuration for the Rapid engine.
//!
//! This module provides configuration structures for the snapshot cache and
//! the nested-loop join executor.

mod engine;

pub use engine::{CacheConfig, JoinConfig, RapidConfig, RapidConfigBuilder};
