//! Per-connection SOCKS5 session
//!
//! A [`ConnectionSession`] owns one accepted client stream and walks it
//! through `Handshake -> Request -> Forwarding`. Received bytes accumulate in
//! a single arena; each stage parses from the front of the arena, splits off
//! exactly the message it consumed and leaves the remainder for the next
//! stage, so bytes pipelined across stage boundaries are never lost.
//!
//! # Protocol Flow
//!
//! 1. Method selection (only "no authentication" is accepted)
//! 2. CONNECT request parsing
//! 3. Destination dial, reply, and handoff to the [`RelayConsumer`]

mod handoff;
mod replay;

pub use replay::{PendingChunks, ReplayStream};

use crate::config::ServerConfig;
use crate::error::{ArgyleError, Socks5Error};
use crate::server::{Connector, RelayConsumer};
use crate::socks::{parse_handshake, parse_request, ReplyTemplate, TargetAddr, NO_AUTH_REPLY};
use bytes::{Buf, BytesMut};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Negotiation stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the method-selection message
    Handshake,
    /// Waiting for the CONNECT request
    Request,
    /// Request parsed; dialing or handed off
    Forwarding,
}

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// Both streams were passed to the relay consumer
    HandedOff,
    /// The session was terminated for a protocol or dial failure
    Rejected(Socks5Error),
    /// The client closed the connection before negotiation completed
    ClientClosed,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::HandedOff => write!(f, "handed off"),
            SessionEnd::Rejected(err) => write!(f, "rejected: {}", err),
            SessionEnd::ClientClosed => write!(f, "client closed"),
        }
    }
}

/// Tunables taken from [`ServerConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Bytes read from the client while dialing before reads pause
    pub max_pending_bytes: usize,
    /// Capacity reserved in the receive arena per read
    pub read_buffer_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for SessionOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_pending_bytes: config.max_pending_bytes,
            read_buffer_size: config.read_buffer_size,
        }
    }
}

/// Result of running the handler for the current state once
enum Progress {
    /// The arena does not yet hold a complete message
    Incomplete,
    /// The state advanced; leftover bytes belong to the next stage
    Advanced,
    /// A CONNECT request was decoded
    Connect(PendingConnect),
}

/// A decoded CONNECT request waiting for its dial
struct PendingConnect {
    target: TargetAddr,
    template: ReplyTemplate,
}

/// SOCKS5 negotiation over one client stream
pub struct ConnectionSession<S, C, R> {
    client: S,
    peer: Option<SocketAddr>,
    state: SessionState,
    buffer: BytesMut,
    pending: PendingChunks,
    connector: Arc<C>,
    consumer: Arc<R>,
    options: SessionOptions,
}

impl<S, C, R> ConnectionSession<S, C, R>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    C: Connector,
    R: RelayConsumer<S, C::Stream>,
{
    /// Create a session for a freshly accepted client
    pub fn new(
        client: S,
        peer: Option<SocketAddr>,
        connector: Arc<C>,
        consumer: Arc<R>,
        options: SessionOptions,
    ) -> Self {
        Self {
            client,
            peer,
            state: SessionState::Handshake,
            buffer: BytesMut::with_capacity(options.read_buffer_size),
            pending: PendingChunks::new(options.max_pending_bytes),
            connector,
            consumer,
            options,
        }
    }

    /// Current negotiation stage
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to completion.
    ///
    /// Protocol failures are answered on the wire and reported as
    /// [`SessionEnd::Rejected`]; only client I/O errors surface as `Err`.
    pub async fn run(mut self) -> Result<SessionEnd, ArgyleError> {
        let request = loop {
            match self.on_negotiation_step().await {
                Ok(Progress::Incomplete) => {
                    if self.fill_buffer().await? == 0 {
                        debug!("Client {:?} closed during {:?}", self.peer, self.state);
                        return Ok(SessionEnd::ClientClosed);
                    }
                }
                Ok(Progress::Advanced) => {}
                Ok(Progress::Connect(request)) => break request,
                Err(ArgyleError::Socks5(err)) => return Ok(self.reject(err).await),
                Err(err) => return Err(err),
            }
        };

        self.state = SessionState::Forwarding;
        self.connect_and_handoff(request).await
    }

    /// Run the parser for the current stage.
    ///
    /// Only Handshake and Request are visited here; `run` sets Forwarding
    /// after this loop has produced a CONNECT request.
    async fn on_negotiation_step(&mut self) -> Result<Progress, ArgyleError> {
        if self.state == SessionState::Handshake {
            self.on_handshake().await
        } else {
            self.on_request()
        }
    }

    async fn on_handshake(&mut self) -> Result<Progress, ArgyleError> {
        let consumed = match parse_handshake(&self.buffer)? {
            Some(consumed) => consumed,
            None => return Ok(Progress::Incomplete),
        };

        self.buffer.advance(consumed);
        self.client.write_all(&NO_AUTH_REPLY).await?;
        self.client.flush().await?;
        self.state = SessionState::Request;
        Ok(Progress::Advanced)
    }

    fn on_request(&mut self) -> Result<Progress, ArgyleError> {
        let decoded = match parse_request(&self.buffer)? {
            Some(decoded) => decoded,
            None => return Ok(Progress::Incomplete),
        };

        let template = ReplyTemplate::new(self.buffer.split_to(decoded.consumed));
        Ok(Progress::Connect(PendingConnect {
            target: decoded.target,
            template,
        }))
    }

    async fn fill_buffer(&mut self) -> std::io::Result<usize> {
        self.buffer.reserve(self.options.read_buffer_size);
        self.client.read_buf(&mut self.buffer).await
    }

    /// Send the fixed reply for `err`, if the protocol defines one, and close
    async fn reject(mut self, err: Socks5Error) -> SessionEnd {
        warn!("Closing SOCKS5 session from {:?}: {}", self.peer, err);

        if let Some(reply) = err.reply() {
            if let Err(e) = self.client.write_all(&reply).await {
                debug!("Failed to send rejection reply: {}", e);
            }
        }
        let _ = self.client.shutdown().await;

        SessionEnd::Rejected(err)
    }
}

impl<S, C, R> fmt::Debug for ConnectionSession<S, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
