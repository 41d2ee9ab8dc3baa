//! Schema layer for grnbind
//!
//! This crate turns engine handles into typed, cached metadata:
//! - [`Catalog`]: table and column resolution, creation and invalidation
//! - [`Table`] / [`Column`]: resolved metadata with typed row and cell access
//! - [`TableOptions`] / [`ColumnOptions`]: creation options
//! - [`codec`]: host value <-> wire value conversion
//! - [`CatalogConfig`]: `grnbind.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod codec;
pub mod column;
pub mod config;
pub mod options;
pub mod table;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, RefreshReport, TableHandle};
pub use column::Column;
pub use config::{CatalogConfig, CONFIG_FILE_NAME};
pub use options::{ColumnOptions, Compression, TableOptions, TableType};
pub use table::{ColumnLayout, RowInsert, Table, TypeSpec};
