use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved discovery method name. [`crate::Registry::register`] rejects
/// names with a leading underscore, so user operations can never collide
/// with it.
pub const CAPABILITIES: &str = "_capabilities";

pub(crate) const METHOD_NOT_FOUND: &str = "MethodNotFound";
pub(crate) const PROTOCOL_ERROR: &str = "ProtocolError";

/// One remote invocation: a method name plus positional and keyword
/// arguments. Both argument sets may be omitted on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            args,
            kwargs,
        }
    }

    /// The argument-less discovery request a client bootstraps with.
    pub fn capabilities() -> Self {
        Self::new(CAPABILITIES, Vec::new(), Map::new())
    }
}

/// The answer to one request: either the operation's return value or the
/// descriptor of the failure it raised.
///
/// Wire shape: `{"status":"ok","payload":...}` or
/// `{"status":"error","payload":{"kind":...,"message":...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum Response {
    Ok(Value),
    Error(RemoteError),
}

/// Serialized identity of a server-side failure: the error's type name and
/// its message. This is the whole exception surface that crosses the wire;
/// no foreign types are reconstructed from untrusted bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Descriptor for any `std::error::Error`, using the error type's
    /// unqualified name as the kind.
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        let kind = std::any::type_name::<E>().rsplit("::").next().unwrap_or("Error");
        Self::new(kind, error.to_string())
    }

    pub(crate) fn method_not_found(name: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, name)
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::new(PROTOCOL_ERROR, message)
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// One advertised operation: its name and documentation string. The ordered
/// sequence of entries is the capability set a client discovers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    #[serde(default)]
    pub doc: String,
}
