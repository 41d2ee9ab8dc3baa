//! Request/response channel contract.
//!
//! The channel is strictly half-duplex: exactly one [`recv`] must follow each
//! [`send`] before the next `send`. Pipelining is unsupported, and there is no
//! timeout at this layer; a blocked channel blocks its caller.
//!
//! [`send`]: CommandChannel::send
//! [`recv`]: CommandChannel::recv

use thiserror::Error;
use tracing::debug;

use grnbind_core::{Error, Result};

use crate::command::Command;

/// Response body the engine returns when a creation command succeeds.
pub const SUCCESS_TOKEN: &[u8] = b"true";

/// A failed query, carrying whatever bytes the channel still returned.
///
/// When `send` fails the channel is still drained once, so the engine's
/// diagnostic body (if any) ends up in `partial`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct QueryError {
    /// Bytes received despite the failure (possibly empty)
    pub partial: Vec<u8>,
    /// The underlying failure
    #[source]
    pub error: Error,
}

impl From<Error> for QueryError {
    fn from(error: Error) -> Self {
        Self {
            partial: Vec::new(),
            error,
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        if !err.partial.is_empty() {
            debug!(
                partial = %String::from_utf8_lossy(&err.partial),
                "dropping partial response"
            );
        }
        err.error
    }
}

/// Synchronous command channel to the engine.
pub trait CommandChannel {
    /// Send one command.
    fn send(&mut self, command: &[u8]) -> Result<()>;

    /// Receive the response to the last command sent.
    fn recv(&mut self) -> Result<Vec<u8>>;

    /// Send `text` and return the response.
    ///
    /// If `send` fails, `recv` is still called once and its bytes are
    /// returned inside the error.
    fn query(&mut self, text: &str) -> std::result::Result<Vec<u8>, QueryError> {
        if let Err(error) = self.send(text.as_bytes()) {
            let partial = self.recv().unwrap_or_default();
            return Err(QueryError { partial, error });
        }
        self.recv().map_err(QueryError::from)
    }

    /// Encode and send `command`, returning the response.
    ///
    /// Encoding errors are raised before anything touches the channel.
    fn query_command(&mut self, command: &Command) -> std::result::Result<Vec<u8>, QueryError> {
        let text = command.encode()?;
        debug!(command = command.name(), bytes = text.len(), "sending command");
        self.query(&text)
    }
}

impl<C: CommandChannel + ?Sized> CommandChannel for Box<C> {
    fn send(&mut self, command: &[u8]) -> Result<()> {
        (**self).send(command)
    }

    fn recv(&mut self) -> Result<Vec<u8>> {
        (**self).recv()
    }
}

/// Check a creation command's response against [`SUCCESS_TOKEN`].
///
/// # Errors
///
/// Returns `Error::CommandRejected` with the lossily decoded body for any
/// response other than exactly `true`.
pub fn expect_success(command: &str, response: &[u8]) -> Result<()> {
    if response == SUCCESS_TOKEN {
        Ok(())
    } else {
        Err(Error::CommandRejected {
            command: command.to_string(),
            response: String::from_utf8_lossy(response).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Channel double that records traffic and replays canned responses.
    #[derive(Default)]
    struct ScriptedChannel {
        sent: Vec<Vec<u8>>,
        responses: Vec<Vec<u8>>,
        fail_send: bool,
    }

    impl CommandChannel for ScriptedChannel {
        fn send(&mut self, command: &[u8]) -> Result<()> {
            self.sent.push(command.to_vec());
            if self.fail_send {
                return Err(Error::transport("send failed"));
            }
            Ok(())
        }

        fn recv(&mut self) -> Result<Vec<u8>> {
            if self.responses.is_empty() {
                return Err(Error::transport("nothing to receive"));
            }
            Ok(self.responses.remove(0))
        }
    }

    #[test]
    fn test_query_sends_then_receives() {
        let mut channel = ScriptedChannel {
            responses: vec![b"true".to_vec()],
            ..Default::default()
        };
        let body = channel.query("status").unwrap();
        assert_eq!(body, b"true");
        assert_eq!(channel.sent, vec![b"status".to_vec()]);
    }

    #[test]
    fn test_query_returns_partial_bytes_on_send_failure() {
        let mut channel = ScriptedChannel {
            responses: vec![b"[[-22,0.0,0.0],\"syntax error\"]".to_vec()],
            fail_send: true,
            ..Default::default()
        };
        let err = channel.query("bogus").unwrap_err();
        assert!(matches!(err.error, Error::Transport { .. }));
        assert!(String::from_utf8_lossy(&err.partial).contains("syntax error"));
    }

    #[test]
    fn test_query_command_rejects_before_sending() {
        let mut channel = ScriptedChannel::default();
        let cmd = Command::new("column_create").option("Flags", "COLUMN_SCALAR");
        let err = channel.query_command(&cmd).unwrap_err();
        assert!(matches!(err.error, Error::Protocol { .. }));
        assert!(err.partial.is_empty());
        assert!(channel.sent.is_empty());
    }

    #[test]
    fn test_query_error_converts_to_error() {
        let err: Error = QueryError {
            partial: b"partial".to_vec(),
            error: Error::transport("boom"),
        }
        .into();
        assert_eq!(err, Error::transport("boom"));
    }

    #[test]
    fn test_expect_success() {
        assert!(expect_success("table_create", b"true").is_ok());
        for body in [&b"false"[..], b"", b"true\n", b"TRUE"] {
            assert!(matches!(
                expect_success("table_create", body),
                Err(Error::CommandRejected { .. })
            ));
        }
    }

    #[test]
    fn test_boxed_channel() {
        let mut channel: Box<dyn CommandChannel> = Box::new(ScriptedChannel {
            responses: vec![b"ok".to_vec()],
            ..Default::default()
        });
        assert_eq!(channel.query("status").unwrap(), b"ok");
    }
}
