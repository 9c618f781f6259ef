//! Outbound send path
//!
//! The protocol layer does not own a socket. Whatever does implements
//! [`PacketSink`], and [`Outbox`] encodes through the registry before handing
//! the payload over together with its delivery policy.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::{debug, warn};

use super::ConnectionId;
use super::registry::CommandRegistry;
use crate::protocol::metrics::Metrics;
use crate::protocol::{DeliveryPolicy, Direction, Message, Result};

/// Transport side of the send path.
pub trait PacketSink {
    /// Queue `payload` for `connection` using `policy`
    ///
    /// # Errors
    ///
    /// Implementations report failures as [`crate::protocol::Error::Transport`].
    fn send(&self, connection: ConnectionId, payload: Bytes, policy: DeliveryPolicy)
    -> Result<()>;
}

impl<S: PacketSink + ?Sized> PacketSink for Arc<S> {
    fn send(
        &self,
        connection: ConnectionId,
        payload: Bytes,
        policy: DeliveryPolicy,
    ) -> Result<()> {
        (**self).send(connection, payload, policy)
    }
}

/// Encodes typed messages and forwards them to a sink
#[derive(Debug, Clone)]
pub struct Outbox<S> {
    registry: Arc<CommandRegistry>,
    sink: S,
}

impl<S: PacketSink> Outbox<S> {
    /// Send through `sink` using the policies in `registry`
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>, sink: S) -> Self {
        Self { registry, sink }
    }

    /// Underlying sink
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send one message to one connection
    ///
    /// # Errors
    ///
    /// Returns error if the message is not registered for sending, exceeds
    /// the payload limit, or the sink fails.
    pub fn send<M: Message>(&self, connection: ConnectionId, message: &M) -> Result<()> {
        let (payload, policy) = self.registry.encode_for_send(message)?;
        let size = payload.len();
        self.sink
            .send(connection, payload, policy)
            .inspect_err(|err| {
                warn!(%connection, tag = %M::TAG, error = %err, "send failed");
                Metrics::record_send_error();
            })?;
        Metrics::record_message(Direction::Outgoing, M::TAG, size);
        Ok(())
    }

    /// Send one message to several connections, encoding it once.
    ///
    /// Stops at the first sink failure.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub fn broadcast<M, I>(&self, connections: I, message: &M) -> Result<usize>
    where
        M: Message,
        I: IntoIterator<Item = ConnectionId>,
    {
        let (payload, policy) = self.registry.encode_for_send(message)?;
        let mut sent = 0;
        for connection in connections {
            self.sink
                .send(connection, payload.clone(), policy)
                .inspect_err(|err| {
                    warn!(%connection, tag = %M::TAG, error = %err, "broadcast send failed");
                    Metrics::record_send_error();
                })?;
            Metrics::record_message(Direction::Outgoing, M::TAG, payload.len());
            sent += 1;
        }
        debug!(tag = %M::TAG, sent, "broadcast");
        Ok(sent)
    }
}

/// One payload captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    /// Destination
    pub connection: ConnectionId,
    /// Tag and body
    pub payload: Bytes,
    /// Requested delivery
    pub policy: DeliveryPolicy,
}

/// Sink that records every send in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentPacket>>,
}

impl MemorySink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything sent so far
    pub fn take(&self) -> Vec<SentPacket> {
        std::mem::take(&mut *self.sent.lock().expect("sink lock poisoned"))
    }

    /// Number of packets currently recorded
    pub fn len(&self) -> usize {
        self.sent.lock().expect("sink lock poisoned").len()
    }

    /// Check whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PacketSink for MemorySink {
    fn send(
        &self,
        connection: ConnectionId,
        payload: Bytes,
        policy: DeliveryPolicy,
    ) -> Result<()> {
        self.sent
            .lock()
            .expect("sink lock poisoned")
            .push(SentPacket {
                connection,
                payload,
                policy,
            });
        Ok(())
    }
}
