//! Inbound payload dispatch
//!
//! Turns a complete payload received from a peer into a typed handler call.
//! A payload is consumed in three steps:
//!
//! ```text
//! Idle -> TagRead -> BodyDecoded -> HandlerInvoked
//! ```
//!
//! Any step may reject the payload instead. A rejected payload never reaches
//! a handler and leaves no state behind.

use std::sync::Arc;

use tracing::{instrument, trace, warn};

use super::ConnectionId;
use super::registry::CommandRegistry;
use crate::protocol::codec::read_tag;
use crate::protocol::metrics::Metrics;
use crate::protocol::{Direction, Error, MessageTag, Reader, Result};

/// Routes received payloads to the handlers of a sealed registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    /// Dispatch against `registry`
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Underlying registry
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Decode `payload` and invoke the handler bound to its tag.
    ///
    /// Returns the tag of the handled message.
    ///
    /// # Errors
    ///
    /// - [`Error::Truncated`] if the payload is empty
    /// - [`Error::UnknownTag`] if the tag byte is outside the catalog
    /// - [`Error::NotRegistered`] if the tag has no incoming entry
    /// - [`Error::MalformedBody`] if the body does not decode or has
    ///   trailing bytes
    #[instrument(level = "trace", skip(self, payload), fields(len = payload.len()))]
    pub fn dispatch(&self, connection: ConnectionId, payload: &[u8]) -> Result<MessageTag> {
        match self.route(connection, payload) {
            Ok(tag) => {
                Metrics::record_message(Direction::Incoming, tag, payload.len());
                Ok(tag)
            }
            Err(err) => {
                warn!(%connection, error = %err, kind = err.kind(), "rejected payload");
                Metrics::record_rejected(&err);
                Err(err)
            }
        }
    }

    fn route(&self, connection: ConnectionId, payload: &[u8]) -> Result<MessageTag> {
        let mut reader = Reader::with_limits(payload, *self.registry.limits());

        let tag = read_tag(&mut reader)?;
        trace!(%tag, "tag read");

        let command = self.registry.lookup_incoming(tag)?;
        let message = command
            .decode(&mut reader)
            .and_then(|message| reader.finish().map(|()| message))
            .map_err(|source| Error::MalformedBody {
                tag,
                source: Box::new(source),
            })?;
        trace!(%tag, "body decoded");

        command.invoke(connection, message);
        trace!(%tag, "handler invoked");
        Ok(tag)
    }
}
