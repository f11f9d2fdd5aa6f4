//! Error types for the cdh-connect crate

use crate::codec::{FrameError, MessageType};
use cdh_proto::Code;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by [`CdhClient`](crate::CdhClient).
///
/// There are exactly two kinds: the socket could not be dialed, or a remote
/// call failed. Both carry enough context to tell which step went wrong.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("failed to connect to cdh sock {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation}: {source}")]
    Call {
        operation: &'static str,
        #[source]
        source: RpcError,
    },
}

impl ConnectError {
    pub(crate) fn call(operation: &'static str, source: RpcError) -> Self {
        ConnectError::Call { operation, source }
    }

    /// True when the socket could not be reached at all
    pub fn is_connect(&self) -> bool {
        matches!(self, ConnectError::Connect { .. })
    }

    /// The remote status code, if the server answered with a non-OK status
    pub fn code(&self) -> Option<Code> {
        match self {
            ConnectError::Call {
                source: RpcError::Status { code, .. },
                ..
            } => Some(*code),
            _ => None,
        }
    }
}

/// Transport-level cause of a failed call
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("remote returned {code}: {message}")]
    Status { code: Code, message: String },

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("failed to decode message: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("unexpected {0:?} message on response stream")]
    UnexpectedMessageType(MessageType),

    #[error("connection closed before a response arrived")]
    ConnectionClosed,

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("plaintext is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl From<std::io::Error> for RpcError {
    fn from(err: std::io::Error) -> Self {
        RpcError::Frame(FrameError::Io(err))
    }
}
