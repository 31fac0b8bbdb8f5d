use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;

/// Upper bound on a single frame payload. The length prefix admits 4 GiB;
/// anything past this is treated as a corrupt prefix rather than an
/// allocation request.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Reads length-prefixed frames from any async byte stream.
///
/// A frame is a 4-byte unsigned big-endian length followed by exactly that
/// many payload bytes.
#[async_trait]
pub trait FrameRead: AsyncRead + Unpin + Send {
    /// Reads one complete frame, looping until the declared byte count has
    /// arrived. End of stream before the first header byte is a clean
    /// close ([`Error::ConnectionClosed`]); end of stream anywhere inside a
    /// frame is [`Error::Truncated`].
    async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        let mut header = [0u8; 4];
        match fill(&mut *self, &mut header).await? {
            0 => return Err(Error::ConnectionClosed),
            received if received < header.len() => {
                return Err(Error::Truncated {
                    expected: header.len(),
                    received,
                })
            }
            _ => {}
        }
        let len = u32::from_be_bytes(header) as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::Protocol(format!(
                "declared frame length {len} exceeds the {MAX_FRAME_LEN} byte limit"
            )));
        }
        let mut payload = vec![0u8; len];
        let received = fill(&mut *self, &mut payload).await?;
        if received < len {
            return Err(Error::Truncated {
                expected: len,
                received,
            });
        }
        Ok(payload)
    }
}

#[async_trait]
impl<T: AsyncRead + Unpin + Send> FrameRead for T {}

/// Writes length-prefixed frames to any async byte stream.
#[async_trait]
pub trait FrameWrite: AsyncWrite + Unpin + Send {
    /// Writes the length prefix and payload, then flushes. Exclusive access
    /// through `&mut self` keeps the two writes contiguous on the stream.
    async fn write_frame(&mut self, payload: &[u8]) -> Result<(), Error> {
        if payload.len() > MAX_FRAME_LEN {
            return Err(Error::Protocol(format!(
                "frame payload of {} bytes exceeds the {MAX_FRAME_LEN} byte limit",
                payload.len()
            )));
        }
        self.write_all(&(payload.len() as u32).to_be_bytes()).await?;
        self.write_all(payload).await?;
        self.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<T: AsyncWrite + Unpin + Send> FrameWrite for T {}

/// Fills `buf` from the stream, stopping early only at end of stream.
/// Returns how many bytes were actually placed in `buf`.
async fn fill<R>(stream: &mut R, buf: &mut [u8]) -> Result<usize, Error>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
