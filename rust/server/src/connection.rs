use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Any failure while moving a frame over a connection.
///
/// Every read and write returns this one category, so callers handle
/// transport trouble in a single branch.
#[derive(Debug, Error)]
pub enum ConnectionFault {
    #[error("stream closed before a complete frame arrived")]
    Truncated,
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
}

impl From<io::Error> for ConnectionFault {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ConnectionFault::Truncated
        } else {
            ConnectionFault::Transport(err)
        }
    }
}

/// A byte stream carrying fixed-size protocol frames.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
        }
    }

    /// Label of the remote end, used only in logs.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Reads exactly `N` bytes.
    pub async fn read_frame<const N: usize>(&mut self) -> Result<[u8; N], ConnectionFault> {
        let mut frame = [0u8; N];
        self.stream.read_exact(&mut frame).await?;
        Ok(frame)
    }

    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<(), ConnectionFault> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Shuts the write half down. Errors are ignored: the peer may already
    /// be gone, and the stream is dropped right after.
    pub async fn close(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}
