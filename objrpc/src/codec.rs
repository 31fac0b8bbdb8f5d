use crate::error::Error;
use crate::message::{Request, Response};

/// Pluggable wire serialization.
///
/// The protocol is agnostic to the codec as long as it round-trips the JSON
/// value space and the [`crate::RemoteError`] descriptor. Decode failures
/// must come back as [`Error::Protocol`] so callers can tell a malformed
/// peer from a broken transport.
pub trait Codec: Send + Sync {
    fn encode_request(&self, request: &Request) -> Result<Vec<u8>, Error>;
    fn decode_request(&self, bytes: &[u8]) -> Result<Request, Error>;
    fn encode_response(&self, response: &Response) -> Result<Vec<u8>, Error>;
    fn decode_response(&self, bytes: &[u8]) -> Result<Response, Error>;
}

/// The default codec: self-describing JSON via `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode_request(&self, request: &Request) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(request).map_err(|e| Error::Protocol(format!("request encode: {e}")))
    }

    fn decode_request(&self, bytes: &[u8]) -> Result<Request, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Protocol(format!("request decode: {e}")))
    }

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(response).map_err(|e| Error::Protocol(format!("response encode: {e}")))
    }

    fn decode_response(&self, bytes: &[u8]) -> Result<Response, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Protocol(format!("response decode: {e}")))
    }
}
