//! TCP listener that runs one session per accepted connection

use crate::config::ServerConfig;
use crate::server::{Connector, RelayConsumer};
use crate::session::{ConnectionSession, SessionOptions};
use anyhow::{Context, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Pause before accepting again after a failed accept
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accepts SOCKS5 clients and spawns a [`ConnectionSession`] for each
pub struct Listener<C, R> {
    listener: TcpListener,
    connector: Arc<C>,
    consumer: Arc<R>,
    options: SessionOptions,
}

impl<C, R> Listener<C, R>
where
    C: Connector,
    R: RelayConsumer<TcpStream, C::Stream>,
{
    /// Bind the configured host and port
    pub async fn bind(config: &ServerConfig, connector: C, consumer: R) -> Result<Self> {
        config
            .validate()
            .context("Invalid server configuration")?;

        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", bind_addr))?;

        Ok(Self {
            listener,
            connector: Arc::new(connector),
            consumer: Arc::new(consumer),
            options: SessionOptions::from(config),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until a shutdown signal arrives.
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("SOCKS server listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(stream, peer),
                    Err(e) => accept_backoff(e).await,
                },
                _ = shutdown_rx.recv() => {
                    info!("Listener shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        debug!("Accepted connection from {}", peer);

        let session = ConnectionSession::new(
            stream,
            Some(peer),
            Arc::clone(&self.connector),
            Arc::clone(&self.consumer),
            self.options,
        );

        tokio::spawn(async move {
            match session.run().await {
                Ok(end) => debug!("Session from {} ended: {}", peer, end),
                Err(e) => debug!("Session from {} failed: {}", peer, e),
            }
        });
    }
}

/// Log a failed accept and wait before the next one, so a persistent
/// error such as EMFILE does not spin the loop
async fn accept_backoff(e: io::Error) {
    warn!("Failed to accept connection: {}", e);
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}
