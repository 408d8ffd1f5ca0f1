//! Default relay consumer
//!
//! Pumps bytes between the client and the destination until both directions
//! have finished.

use crate::server::{Handoff, RelayConsumer};
use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Relay consumer that copies bytes in both directions
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpRelay;

#[async_trait::async_trait]
impl<C, D> RelayConsumer<C, D> for TcpRelay
where
    C: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn on_connected(&self, handoff: Handoff<C, D>) -> Result<()> {
        let Handoff {
            client,
            destination,
            target,
            ..
        } = handoff;

        let (sent, received) = relay_tcp(client, destination).await?;
        debug!(
            "Relay to {} finished: {} bytes sent, {} bytes received",
            target, sent, received
        );
        Ok(())
    }
}

/// Relay data bidirectionally between two streams
///
/// Returns the byte counts copied `a -> b` and `b -> a`. EOF on one side is
/// forwarded as a write shutdown on the other.
pub async fn relay_tcp<A, B>(mut a: A, mut b: B) -> std::io::Result<(u64, u64)>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    tokio::io::copy_bidirectional(&mut a, &mut b).await
}
