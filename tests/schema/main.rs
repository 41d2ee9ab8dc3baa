//! Schema Integration Tests
//!
//! Cross-crate flows through the public `grnbind` facade:
//! - Catalog: creation, resolution, reference paths, invalidation
//! - Runtime: init/fin ownership across catalogs
//! - Config: `grnbind.toml` loading
//! - Codec: range and kind properties

#[path = "../common/mod.rs"]
mod common;

mod catalog;
mod codec;
mod config;
mod runtime;
