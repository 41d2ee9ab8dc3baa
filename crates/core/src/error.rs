//! Error types for grnbind
//!
//! All failures of the schema layer are represented by the [`Error`] enum.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Lookup | `NameResolution` |
//! | Type | `KindConflict`, `UnsupportedKind`, `OutOfRange` |
//! | Schema | `ReferenceChain` |
//! | Engine | `CommandRejected`, `EngineCall` |
//! | Wire | `Protocol`, `Transport` |
//! | System | `Runtime`, `Config` |
//!
//! Nothing is retried internally; every error reaches the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for grnbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the schema layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum Error {
    // ==================== Lookup ====================
    /// Table, column or other named object not found
    #[error("{entity} not found: <{name}>")]
    NameResolution {
        /// Kind of object looked up ("table", "column", "type")
        entity: String,
        /// Name that failed to resolve
        name: String,
    },

    // ==================== Type ====================
    /// Declared and requested kinds disagree
    #[error("kind conflict: expected {expected}, got {actual}")]
    KindConflict {
        /// Declared type label, e.g. `[]Int32`
        expected: String,
        /// Requested type label, e.g. `Float`
        actual: String,
    },

    /// A kind has no host mapping
    #[error("unsupported kind: {kind}")]
    UnsupportedKind {
        /// Offending kind or type name
        kind: String,
    },

    /// Integer does not fit the sized kind
    #[error("value {value} out of range for {kind}")]
    OutOfRange {
        /// Target kind
        kind: String,
        /// Offending value
        value: String,
    },

    // ==================== Schema ====================
    /// Dotted path or reference cannot be resolved
    #[error("invalid reference chain <{path}>: {reason}")]
    ReferenceChain {
        /// Full path being resolved
        path: String,
        /// What went wrong
        reason: String,
    },

    // ==================== Engine ====================
    /// Engine answered without the success token
    #[error("{command} rejected: response = <{response}>")]
    CommandRejected {
        /// Command name
        command: String,
        /// Response body, lossily decoded
        response: String,
    },

    /// Engine primitive reported failure
    #[error("{operation} failed: {reason}")]
    EngineCall {
        /// Primitive name
        operation: String,
        /// Failure detail
        reason: String,
    },

    // ==================== Wire ====================
    /// Malformed command or misuse of the channel, caught locally
    #[error("protocol error: {reason}")]
    Protocol {
        /// What was malformed
        reason: String,
    },

    /// Channel send/recv failure
    #[error("transport error: {reason}")]
    Transport {
        /// Failure detail
        reason: String,
    },

    // ==================== System ====================
    /// Shared runtime initialization or teardown failed
    #[error("runtime error: {reason}")]
    Runtime {
        /// Failure detail
        reason: String,
    },

    /// Configuration could not be read or parsed
    #[error("config error: {reason}")]
    Config {
        /// Failure detail
        reason: String,
    },
}

impl Error {
    /// Table lookup failure
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::NameResolution {
            entity: "table".to_string(),
            name: name.into(),
        }
    }

    /// Column lookup failure; `name` is reported as `table.column`
    pub fn column_not_found(table: &str, column: &str) -> Self {
        Error::NameResolution {
            entity: "column".to_string(),
            name: format!("{}.{}", table, column),
        }
    }

    /// Kind conflict between labels
    pub fn kind_conflict(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::KindConflict {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Broken reference chain
    pub fn reference_chain(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ReferenceChain {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Engine primitive failure
    pub fn engine_call(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::EngineCall {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Local protocol violation
    pub fn protocol(reason: impl Into<String>) -> Self {
        Error::Protocol {
            reason: reason.into(),
        }
    }

    /// Channel failure
    pub fn transport(reason: impl Into<String>) -> Self {
        Error::Transport {
            reason: reason.into(),
        }
    }

    /// Check if this is a lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NameResolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_name_resolution() {
        let err = Error::table_not_found("Users");
        let msg = err.to_string();
        assert!(msg.contains("table not found"));
        assert!(msg.contains("<Users>"));
    }

    #[test]
    fn test_error_display_column_not_found() {
        let err = Error::column_not_found("Users", "age");
        assert_eq!(err.to_string(), "column not found: <Users.age>");
    }

    #[test]
    fn test_error_display_kind_conflict() {
        let err = Error::kind_conflict("[]Int32", "Float");
        let msg = err.to_string();
        assert!(msg.contains("[]Int32"));
        assert!(msg.contains("Float"));
    }

    #[test]
    fn test_error_display_reference_chain() {
        let err = Error::reference_chain("a.b", "vector of vector is not supported");
        let msg = err.to_string();
        assert!(msg.contains("<a.b>"));
        assert!(msg.contains("vector of vector"));
    }

    #[test]
    fn test_error_display_rejected() {
        let err = Error::CommandRejected {
            command: "table_create".to_string(),
            response: "false".to_string(),
        };
        assert_eq!(err.to_string(), "table_create rejected: response = <false>");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::table_not_found("T").is_not_found());
        assert!(!Error::protocol("bad").is_not_found());
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::OutOfRange {
            kind: "Int8".to_string(),
            value: "300".to_string(),
        };

        match err {
            Error::OutOfRange { kind, value } => {
                assert_eq!(kind, "Int8");
                assert_eq!(value, "300");
            }
            _ => panic!("Wrong error variant"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<i32> {
            Err(Error::protocol("test"))
        }

        assert!(returns_error().is_err());
    }
}
