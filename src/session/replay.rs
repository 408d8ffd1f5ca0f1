//! Buffered client bytes carried across the handoff
//!
//! Bytes the session read from the client but did not interpret (pipelined
//! data after the request, or data read while the dial was outstanding) are
//! handed to the relay consumer in front of the live socket.

use bytes::{Buf, Bytes};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Chunks read from the client while the destination dial is outstanding
#[derive(Debug)]
pub struct PendingChunks {
    chunks: Vec<Bytes>,
    len: usize,
    limit: usize,
}

impl PendingChunks {
    /// Create an empty queue that reports full at `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
            limit,
        }
    }

    /// Append a chunk in arrival order
    pub fn push(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Total buffered bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been buffered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether reading should pause until the dial resolves
    pub fn is_full(&self) -> bool {
        self.len >= self.limit
    }

    /// Take every chunk, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Bytes> {
        self.len = 0;
        std::mem::take(&mut self.chunks)
    }
}

/// Client stream that yields buffered chunks before reading the socket
///
/// Each buffered byte is yielded exactly once. Writes go straight to the
/// inner stream.
#[derive(Debug)]
pub struct ReplayStream<S> {
    replay: VecDeque<Bytes>,
    inner: S,
}

impl<S> ReplayStream<S> {
    /// Wrap `inner`, replaying `chunks` in order first
    pub fn new(inner: S, chunks: Vec<Bytes>) -> Self {
        Self {
            replay: chunks.into_iter().filter(|c| !c.is_empty()).collect(),
            inner,
        }
    }

    /// Bytes still waiting to be replayed
    pub fn replay_len(&self) -> usize {
        self.replay.iter().map(Bytes::len).sum()
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ReplayStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(front) = this.replay.front_mut() {
            let n = front.len().min(buf.remaining());
            buf.put_slice(&front[..n]);
            front.advance(n);
            if front.is_empty() {
                this.replay.pop_front();
            }
            return Poll::Ready(Ok(()));
        }

        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ReplayStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
