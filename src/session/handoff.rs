//! Destination dial and handoff to the relay consumer

use super::{ConnectionSession, PendingConnect, SessionEnd};
use crate::error::{ArgyleError, Socks5Error, Socks5ReplyCode};
use crate::server::{Connector, Handoff, RelayConsumer};
use crate::session::ReplayStream;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

impl<S, C, R> ConnectionSession<S, C, R>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    C: Connector,
    R: RelayConsumer<S, C::Stream>,
{
    /// Dial the destination, answer the client and hand both streams over.
    ///
    /// Client bytes read while the dial is outstanding go to the pending
    /// queue, uninterpreted. Reads pause once the queue is full or the
    /// client half-closes, until the dial resolves.
    pub(super) async fn connect_and_handoff(
        mut self,
        request: PendingConnect,
    ) -> Result<SessionEnd, ArgyleError> {
        let PendingConnect { target, template } = request;
        debug!("Request to {}", target);

        let connector = Arc::clone(&self.connector);
        let dialed = {
            let dial = connector.connect(&target);
            tokio::pin!(dial);

            let mut reading = !self.pending.is_full();
            loop {
                let mut chunk = BytesMut::with_capacity(self.options.read_buffer_size);
                tokio::select! {
                    biased;

                    dialed = &mut dial => break dialed,

                    read = self.client.read_buf(&mut chunk), if reading => match read {
                        Ok(0) => reading = false,
                        Ok(_) => {
                            self.pending.push(chunk.freeze());
                            reading = !self.pending.is_full();
                        }
                        Err(e) => {
                            debug!("Client {:?} failed while dialing {}: {}", self.peer, target, e);
                            return Err(e.into());
                        }
                    },
                }
            }
        };

        let destination = match dialed {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to connect to {}: {}", target, e);
                let reply = template.finish(Socks5ReplyCode::GeneralFailure);
                if let Err(err) = self.client.write_all(&reply).await {
                    debug!("Failed to send failure reply: {}", err);
                }
                let _ = self.client.shutdown().await;
                return Ok(SessionEnd::Rejected(Socks5Error::DestinationUnreachable(e)));
            }
        };

        let reply = template.finish(Socks5ReplyCode::Succeeded);
        self.client.write_all(&reply).await?;
        self.client.flush().await?;

        // Arena leftover arrived before anything read while dialing
        let mut replay = Vec::new();
        if !self.buffer.is_empty() {
            replay.push(self.buffer.split().freeze());
        }
        replay.extend(self.pending.drain());

        info!("SOCKS5 connection established to {}", target);

        let handoff = Handoff {
            client: ReplayStream::new(self.client, replay),
            destination,
            target,
            peer: self.peer,
        };
        if let Err(e) = self.consumer.on_connected(handoff).await {
            debug!("Relay consumer for {:?} finished with error: {:#}", self.peer, e);
        }

        Ok(SessionEnd::HandedOff)
    }
}
