//! Expose a set of named operations over TCP and call them from another
//! process as if they were local.
//!
//! A server builds a [`Registry`] of operations, binds an [`RpcServer`] and
//! serves framed requests over a persistent connection. A client connects
//! with [`RpcClient`], discovers the advertised operations (names and
//! documentation) in a single handshake, and invokes them with JSON values
//! as arguments. A failure raised by a remote operation comes back as
//! [`Error::Remote`] with its identity and message intact.
//!
//! ## Example
//!
//! ```
//! use objrpc::{Registry, RpcClient, RpcServer};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), objrpc::Error> {
//!     let mut registry = Registry::new();
//!     registry.register("ping", "Answers with PONG.", |_args, _kwargs| Ok(json!("PONG")))?;
//!
//!     let server = RpcServer::bind(registry, "127.0.0.1:0").await?;
//!     let addr = server.local_addr()?;
//!     tokio::spawn(server.run(None));
//!
//!     let mut client = RpcClient::connect("127.0.0.1", addr.port()).await?;
//!     assert_eq!(client.call_args("ping", vec![]).await?, json!("PONG"));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod frame;
pub mod mem_io_stream;
pub mod message;
pub mod registry;
pub mod server;

pub use client::RpcClient;
pub use codec::{Codec, JsonCodec};
pub use error::Error;
pub use message::{RegistryEntry, RemoteError, Request, Response};
pub use registry::Registry;
pub use server::RpcServer;
