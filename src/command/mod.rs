//! Command registry, inbound dispatch and the outbound send path.

mod dispatcher;
mod outbox;
mod registry;
pub mod store;

use std::fmt;

pub use dispatcher::Dispatcher;
pub use outbox::{MemorySink, Outbox, PacketSink, SentPacket};
pub use registry::{
    CommandEntry, CommandRegistry, CommandRegistryBuilder, DecodedMessage, IncomingCommand,
};
pub use store::{ClientCommands, ServerCommands, client_registry, server_registry};

/// Peer connection handle assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection {}", self.0)
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
