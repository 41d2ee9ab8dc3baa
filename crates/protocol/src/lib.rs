//! Command syntax and channel contract for grnbind
//!
//! This crate defines the textual boundary to the engine:
//! - [`Command`]: option-map commands with local validation and escaping
//! - [`CommandChannel`]: the half-duplex send/recv contract
//! - [`SUCCESS_TOKEN`] / [`expect_success`]: creation success checks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod command;

pub use channel::{expect_success, CommandChannel, QueryError, SUCCESS_TOKEN};
pub use command::{escape_value, validate_identifier, Command};
