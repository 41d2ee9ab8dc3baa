//! Core types for grnbind
//!
//! This crate defines the vocabulary shared by every layer:
//! - DataKind / ValueClass: built-in engine types and their host classes
//! - Value / Key / GeoPoint: host values for column access and row insertion
//! - RowId / ObjectId: engine identifiers
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kind;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use kind::{DataKind, ValueClass};
pub use types::{ObjectId, RowId, NIL_ID};
pub use value::{micros_to_datetime, GeoPoint, Key, Value};
