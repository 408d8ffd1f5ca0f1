//! Server plumbing around the SOCKS5 session
//!
//! A session needs two collaborators: a [`Connector`] that dials the
//! requested destination, and a [`RelayConsumer`] that takes over both
//! streams once the client has been told the connection succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use argyle::config::ServerConfig;
//! use argyle::server::{Listener, TcpConnector, TcpRelay};
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = Listener::bind(&ServerConfig::default(), TcpConnector, TcpRelay).await?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!     listener.run(shutdown_rx).await
//! }
//! ```

mod listener;
mod relay;

pub use listener::Listener;
pub use relay::{relay_tcp, TcpRelay};

use crate::session::ReplayStream;
use crate::socks::TargetAddr;
use anyhow::Result;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Dials the destination of a CONNECT request.
///
/// The session calls [`connect`](Connector::connect) exactly once and never
/// retries.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Stream type of an established destination connection
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Open a connection to `target`
    async fn connect(&self, target: &TargetAddr) -> io::Result<Self::Stream>;
}

/// Plain TCP dialer; domain names are resolved by the system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait::async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, target: &TargetAddr) -> io::Result<TcpStream> {
        match target {
            TargetAddr::Ip(addr) => TcpStream::connect(*addr).await,
            TargetAddr::Domain(domain, port) => TcpStream::connect((domain.as_str(), *port)).await,
        }
    }
}

/// Everything the relay consumer receives once negotiation succeeds
#[derive(Debug)]
pub struct Handoff<C, D> {
    /// Client stream, replaying bytes buffered during negotiation first
    pub client: ReplayStream<C>,
    /// Connected destination stream
    pub destination: D,
    /// Destination as requested by the client
    pub target: TargetAddr,
    /// Client address, when the transport has one
    pub peer: Option<SocketAddr>,
}

/// Receiver of the "connected" notification.
///
/// The consumer owns both streams from the moment it is called and is
/// responsible for pumping bytes between them and closing them.
#[async_trait::async_trait]
pub trait RelayConsumer<C, D>: Send + Sync + 'static
where
    C: Send + 'static,
    D: Send + 'static,
{
    /// Take over a negotiated connection
    async fn on_connected(&self, handoff: Handoff<C, D>) -> Result<()>;
}
