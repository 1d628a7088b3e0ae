//! # rapid-test
//!
//! Integration tests for the snapshot cache and the nested-loop join.
//!
//! This crate contains:
//! - Relation fixtures with numbered rows
//! - A scripted row source with failure injection and call counters
//! - Tracing setup for test binaries

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Relation and row fixtures
pub mod fixtures;

/// Scripted row sources
pub mod scripted;

pub use fixtures::{decode_id, encode_row, numbered_relation, FIXTURE_ROW_LENGTH};
pub use scripted::{ScriptedSource, SourceCalls};

static TRACING: Once = Once::new();

/// Installs a test subscriber once per process.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}
