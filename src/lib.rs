//! grnbind - typed schema access for command-driven column stores
//!
//! grnbind sits between a host program and an engine that is driven by
//! text commands (`table_create`, `column_create`, ...) and exposes tables
//! and columns through opaque handles. It resolves names once, caches the
//! result, and moves typed values across the boundary.
//!
//! # Quick Start
//!
//! ```
//! use grnbind::{Catalog, ColumnOptions, Key, MemoryEngine, TableOptions, TableType, Value};
//!
//! let mut catalog = Catalog::open(MemoryEngine::new())?;
//! catalog.create_table("Users", &TableOptions::keyed(TableType::PatKey, "ShortText"))?;
//! catalog.create_column("Users", "scores", "[]Int32", &ColumnOptions::default())?;
//!
//! let alice = catalog.insert_row("Users", &Key::from("alice"))?;
//! catalog.set_value("Users", "scores", alice.id, &Value::IntVector(vec![7, 9]))?;
//! assert_eq!(
//!     catalog.get_value("Users", "scores", alice.id)?,
//!     Value::IntVector(vec![7, 9])
//! );
//! # Ok::<(), grnbind::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `grnbind-core`: kinds, host values, identifiers, errors
//! - `grnbind-protocol`: command text and the channel contract
//! - `grnbind-engine`: the engine trait, runtime lifecycle, in-memory engine
//! - `grnbind-schema`: the catalog and value codec

pub use grnbind_core::{
    micros_to_datetime, DataKind, Error, GeoPoint, Key, ObjectId, Result, RowId, Value,
    ValueClass, NIL_ID,
};
pub use grnbind_engine::{
    Engine, MemoryEngine, NoopHooks, Runtime, RuntimeGuard, RuntimeHooks, TypeInfo, WireScalar,
    WireType, WireValue,
};
pub use grnbind_protocol::{expect_success, Command, CommandChannel, QueryError, SUCCESS_TOKEN};
pub use grnbind_schema::*;
