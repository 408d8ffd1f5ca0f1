//! # Argyle - SOCKS5 CONNECT Gateway
//!
//! Argyle accepts SOCKS5 clients, negotiates the "no authentication" method,
//! parses a CONNECT request, dials the destination and then hands both
//! streams to a relay consumer. Bytes the client sends before the consumer
//! takes over are buffered and replayed to it, so the relay sees a gapless
//! stream.
//!
//! ## Features
//!
//! - **Incremental parsing**: protocol messages may arrive split across any
//!   number of TCP reads
//! - **IPv4, domain and IPv6 destinations**
//! - **Pluggable collaborators**: [`server::Connector`] dials, and
//!   [`server::RelayConsumer`] owns the relay after the handoff
//!
//! ## Usage
//!
//! ```rust,ignore
//! use argyle::config::load_config;
//! use argyle::server::{Listener, TcpConnector, TcpRelay};
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("argyle.toml")?;
//!     let listener = Listener::bind(&config.server, TcpConnector, TcpRelay).await?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     listener.run(shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Listener -> ConnectionSession -> Handshake -> Request -> dial -> RelayConsumer
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config, ServerConfig};
pub use error::{ArgyleError, Socks5Error};
pub use server::{Connector, Handoff, Listener, RelayConsumer, TcpConnector, TcpRelay};
pub use session::{ConnectionSession, SessionEnd, SessionState};

/// Version of the Argyle library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
