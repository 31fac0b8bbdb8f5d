use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::codec::{Codec, JsonCodec};
use crate::error::Error;
use crate::frame::{FrameRead, FrameWrite};
use crate::message::{RemoteError, Response, CAPABILITIES};
use crate::registry::Registry;

/// Serves a [`Registry`] over TCP: accepts connections and answers framed
/// requests on each of them until the peer disconnects.
pub struct RpcServer {
    registry: Arc<Registry>,
    codec: Arc<dyn Codec>,
    listener: TcpListener,
}

impl RpcServer {
    /// Binds immediately so the caller can read [`Self::local_addr`] (bind
    /// port 0 to let the OS pick one); [`Self::run`] starts accepting.
    pub async fn bind(registry: Registry, addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            registry: Arc::new(registry),
            codec: Arc::new(JsonCodec),
            listener,
        })
    }

    /// Replaces the default JSON codec.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. With `Some(window)`, returns cleanly once the window
    /// elapses with no new connection (the window restarts on each accept);
    /// with `None`, runs until the process is terminated.
    ///
    /// Every connection is served on its own task, so one slow or
    /// misbehaving client never blocks the others. A connection task's
    /// failure is logged and does not stop the accept loop.
    pub async fn run(self, timeout: Option<Duration>) -> Result<(), Error> {
        info!("listening on {}", self.listener.local_addr()?);
        loop {
            let accepted = match timeout {
                Some(window) => {
                    match tokio::time::timeout(window, self.listener.accept()).await {
                        Ok(accepted) => accepted,
                        Err(_) => {
                            info!("no connection for {window:?}, stopping");
                            return Ok(());
                        }
                    }
                }
                None => self.listener.accept().await,
            };
            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            debug!("accepted connection from {peer}");
            let registry = self.registry.clone();
            let codec = self.codec.clone();
            tokio::spawn(async move {
                match serve_connection(&registry, codec.as_ref(), BufStream::new(stream)).await {
                    Ok(()) => debug!("connection from {peer} closed"),
                    Err(e) => warn!("connection from {peer} dropped: {e}"),
                }
            });
        }
    }
}

/// Serves one established connection: read a request frame, dispatch it,
/// write the response frame, until the peer closes the stream.
pub async fn serve_connection<S>(
    registry: &Registry,
    codec: &dyn Codec,
    mut stream: S,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    loop {
        let frame = match stream.read_frame().await {
            Ok(frame) => frame,
            Err(Error::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        let response = dispatch(registry, codec, &frame);
        stream.write_frame(&codec.encode_response(&response)?).await?;
    }
}

/// Resolves and invokes one request. Infallible by design: every outcome,
/// including an undecodable request, folds into a [`Response`], so a failed
/// call never terminates the session.
fn dispatch(registry: &Registry, codec: &dyn Codec, frame: &[u8]) -> Response {
    let request = match codec.decode_request(frame) {
        Ok(request) => request,
        Err(e) => {
            debug!("undecodable request: {e}");
            return Response::Error(RemoteError::protocol(format!("undecodable request: {e}")));
        }
    };
    debug!("dispatching {}", request.method);
    if request.method == CAPABILITIES {
        // always served, even for an empty registry: it is how clients boot
        return match serde_json::to_value(registry.capabilities()) {
            Ok(payload) => Response::Ok(payload),
            Err(e) => Response::Error(RemoteError::protocol(format!("capability listing: {e}"))),
        };
    }
    match registry.resolve(&request.method) {
        Some(handler) => match handler(request.args, request.kwargs) {
            Ok(value) => Response::Ok(value),
            Err(e) => Response::Error(e),
        },
        None => Response::Error(RemoteError::method_not_found(&request.method)),
    }
}
