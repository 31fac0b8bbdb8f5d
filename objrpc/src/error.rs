use std::io;

use crate::message::RemoteError;

/// Errors produced by the RPC engine, on either side of the wire.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The peer closed the connection at a frame boundary.
    #[error("connection closed by peer")]
    ConnectionClosed,
    /// The stream ended in the middle of a frame.
    #[error("frame truncated: expected {expected} bytes, received {received}")]
    Truncated { expected: usize, received: usize },
    /// Malformed frame, encode/decode failure, or a response that does not
    /// have the required shape. Never retried automatically.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The requested operation is not in the server's registry.
    #[error("method not found: {0}")]
    MethodNotFound(String),
    /// A failure raised by the remote operation, identity preserved.
    #[error("{0}")]
    Remote(RemoteError),
    #[error("method name is reserved: {0}")]
    ReservedName(String),
    #[error("method already registered: {0}")]
    DuplicateMethod(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
