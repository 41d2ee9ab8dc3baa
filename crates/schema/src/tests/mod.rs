//! Scenario tests for the schema crate, run against the in-memory engine.

mod scenarios;

use grnbind_engine::MemoryEngine;

use crate::{Catalog, CatalogConfig};

/// Catalog over a fresh engine, detached from the shared runtime.
pub(crate) fn test_catalog() -> Catalog<MemoryEngine> {
    let config = CatalogConfig {
        manage_runtime: false,
        ..CatalogConfig::default()
    };
    Catalog::with_config(MemoryEngine::new(), config).unwrap()
}
