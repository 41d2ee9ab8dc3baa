//! Engine boundary for grnbind
//!
//! This crate holds everything that talks to the engine itself:
//! - Engine: the typed primitive contract (metadata lookup, rows, cells)
//! - Wire types: exact sized primitives exchanged with the engine
//! - Runtime: the process-wide init/fin lifecycle shared by connections
//! - MemoryEngine: an in-process engine implementing the whole contract
//!
//! Schema mutation itself goes through [`grnbind_protocol::CommandChannel`],
//! which every [`Engine`] also implements.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod memory;
pub mod runtime;
pub mod wire;

pub use engine::Engine;
pub use memory::MemoryEngine;
pub use runtime::{NoopHooks, Runtime, RuntimeGuard, RuntimeHooks};
pub use wire::{RowInfo, TypeInfo, WireScalar, WireType, WireValue};
