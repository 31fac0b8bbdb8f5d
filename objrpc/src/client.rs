use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio::net::TcpStream;
use tracing::debug;

use crate::codec::{Codec, JsonCodec};
use crate::error::Error;
use crate::frame::{FrameRead, FrameWrite};
use crate::message::{self, RegistryEntry, RemoteError, Request, Response};

/// Client-side proxy for a remote [`crate::Registry`].
///
/// Construction performs the discovery handshake, so the remote capability
/// set (names and documentation) is inspectable locally without further
/// round trips. The proxy holds one persistent connection and keeps calls
/// strictly one-in-flight through `&mut self`.
pub struct RpcClient<S> {
    stream: S,
    codec: Box<dyn Codec>,
    methods: BTreeMap<String, String>,
}

impl RpcClient<BufStream<TcpStream>> {
    /// Connects to a server and performs the discovery handshake.
    pub async fn connect(host: &str, port: u16) -> Result<Self, Error> {
        let stream = TcpStream::connect((host, port)).await?;
        debug!("connected to {host}:{port}");
        Self::handshake(BufStream::new(stream), JsonCodec).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> RpcClient<S> {
    /// Builds a proxy over an already-established stream.
    ///
    /// Fails with [`Error::Protocol`] if the discovery response is missing
    /// or malformed; without a capability set there is nothing to proxy.
    pub async fn handshake(stream: S, codec: impl Codec + 'static) -> Result<Self, Error> {
        let mut client = Self {
            stream,
            codec: Box::new(codec),
            methods: BTreeMap::new(),
        };
        let payload = match client.round_trip(&Request::capabilities()).await? {
            Response::Ok(payload) => payload,
            Response::Error(e) => {
                return Err(Error::Protocol(format!("discovery rejected: {e}")))
            }
        };
        let entries: Vec<RegistryEntry> = serde_json::from_value(payload)
            .map_err(|e| Error::Protocol(format!("malformed capability listing: {e}")))?;
        debug!("discovered {} methods", entries.len());
        for entry in entries {
            client.methods.insert(entry.name, entry.doc);
        }
        Ok(client)
    }

    /// Remote method names, in the server's advertised order.
    pub fn methods(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// The documentation string advertised for `name`.
    pub fn doc(&self, name: &str) -> Option<&str> {
        self.methods.get(name).map(String::as_str)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Invokes `method` remotely and returns its result unchanged.
    ///
    /// A server-side failure comes back as the matching error: a typed
    /// variant for protocol-level kinds, [`Error::Remote`] with the original
    /// kind and message for everything else. A failed call leaves the
    /// connection and the discovered method set usable.
    pub async fn call(
        &mut self,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, Error> {
        debug!("calling {method}");
        let request = Request::new(method, args, kwargs);
        match self.round_trip(&request).await? {
            Response::Ok(value) => Ok(value),
            Response::Error(e) => Err(reconstruct(e)),
        }
    }

    /// [`Self::call`] without keyword arguments.
    pub async fn call_args(&mut self, method: &str, args: Vec<Value>) -> Result<Value, Error> {
        self.call(method, args, Map::new()).await
    }

    async fn round_trip(&mut self, request: &Request) -> Result<Response, Error> {
        let bytes = self.codec.encode_request(request)?;
        self.stream.write_frame(&bytes).await?;
        let frame = self.stream.read_frame().await?;
        self.codec.decode_response(&frame)
    }
}

/// Rebuilds the caller-side error for a remote failure. Protocol-level kinds
/// map to their typed variants; any other kind keeps its identity inside
/// [`Error::Remote`].
fn reconstruct(error: RemoteError) -> Error {
    match error.kind.as_str() {
        message::METHOD_NOT_FOUND => Error::MethodNotFound(error.message),
        message::PROTOCOL_ERROR => Error::Protocol(error.message),
        _ => Error::Remote(error),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::frame::FrameWrite;
    use crate::mem_io_stream::MemIoStream;

    fn discovery_response() -> Response {
        Response::Ok(json!([
            {"name": "echo", "doc": "De"},
            {"name": "ping", "doc": "Dp"},
        ]))
    }

    /// Scripts the server side of a session: the given responses, in order.
    async fn scripted(responses: &[Response]) -> MemIoStream {
        let mut input = Vec::new();
        for response in responses {
            let bytes = JsonCodec.encode_response(response).unwrap();
            input.write_frame(&bytes).await.unwrap();
        }
        MemIoStream::new(input)
    }

    #[tokio::test]
    async fn handshake_installs_the_capability_set() {
        let stream = scripted(&[discovery_response()]).await;
        let client = RpcClient::handshake(stream, JsonCodec).await.unwrap();
        assert_eq!(client.methods(), ["echo", "ping"]);
        assert_eq!(client.doc("ping"), Some("Dp"));
        assert_eq!(client.doc("echo"), Some("De"));
        assert!(client.has_method("echo"));
        assert!(!client.has_method("_capabilities"));
        assert_eq!(client.doc("missing"), None);
    }

    #[tokio::test]
    async fn handshake_sends_the_discovery_request() {
        let stream = scripted(&[discovery_response()]).await;
        let client = RpcClient::handshake(stream, JsonCodec).await.unwrap();
        let mut output = client.stream.output();
        let frame = output.read_frame().await.unwrap();
        let sent = JsonCodec.decode_request(&frame).unwrap();
        assert_eq!(sent, Request::capabilities());
    }

    #[tokio::test]
    async fn malformed_discovery_fails_construction() {
        // payload is not an entry sequence
        let stream = scripted(&[Response::Ok(json!("nonsense"))]).await;
        assert!(matches!(
            RpcClient::handshake(stream, JsonCodec).await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn rejected_discovery_fails_construction() {
        let stream = scripted(&[Response::Error(RemoteError::new("ProtocolError", "no"))]).await;
        assert!(matches!(
            RpcClient::handshake(stream, JsonCodec).await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn missing_discovery_fails_construction() {
        let stream = MemIoStream::new(Vec::new());
        assert!(matches!(
            RpcClient::handshake(stream, JsonCodec).await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn call_returns_the_payload_unchanged() {
        let stream = scripted(&[
            discovery_response(),
            Response::Ok(json!({"answer": 42})),
        ])
        .await;
        let mut client = RpcClient::handshake(stream, JsonCodec).await.unwrap();
        let value = client.call_args("echo", vec![json!("hi")]).await.unwrap();
        assert_eq!(value, json!({"answer": 42}));
    }

    #[tokio::test]
    async fn remote_failure_is_reconstructed() {
        let stream = scripted(&[
            discovery_response(),
            Response::Error(RemoteError::new("NotImplementedError", "Not today!")),
        ])
        .await;
        let mut client = RpcClient::handshake(stream, JsonCodec).await.unwrap();
        let error = client.call_args("ping", vec![]).await.unwrap_err();
        assert_eq!(error.to_string(), "NotImplementedError: Not today!");
        let Error::Remote(descriptor) = error else {
            panic!("expected a remote error");
        };
        assert_eq!(descriptor.kind, "NotImplementedError");
        assert_eq!(descriptor.message, "Not today!");
    }

    #[tokio::test]
    async fn protocol_kinds_map_to_typed_variants() {
        let stream = scripted(&[
            discovery_response(),
            Response::Error(RemoteError::new("MethodNotFound", "pong")),
            Response::Error(RemoteError::new("ProtocolError", "undecodable request")),
        ])
        .await;
        let mut client = RpcClient::handshake(stream, JsonCodec).await.unwrap();
        assert!(matches!(
            client.call_args("pong", vec![]).await,
            Err(Error::MethodNotFound(name)) if name == "pong"
        ));
        assert!(matches!(
            client.call_args("ping", vec![]).await,
            Err(Error::Protocol(_))
        ));
    }
}
