//! Command registry
//!
//! Binds every catalog message to a name and, depending on direction, to a
//! delivery policy (outgoing) or a handler (incoming). Built once with
//! [`CommandRegistryBuilder`], then sealed into an immutable
//! [`CommandRegistry`] that can be shared across threads without locking.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::Xxh3;

use super::ConnectionId;
use crate::protocol::{
    CodecLimits, DeliveryPolicy, Direction, Error, Message, MessageTag, Reader, Reliability,
    Result, Writer,
};

/// Decoded message whose concrete type is known only to its entry.
pub type DecodedMessage = Box<dyn Any + Send>;

type EncodeFn = fn(&dyn Any, &mut Writer) -> Result<()>;
type DecodeFn = fn(&mut Reader<'_>) -> Result<DecodedMessage>;
type HandlerFn = Box<dyn Fn(ConnectionId, DecodedMessage) + Send + Sync>;

fn encode_erased<M: Message>(message: &dyn Any, writer: &mut Writer) -> Result<()> {
    match message.downcast_ref::<M>() {
        Some(message) => message.encode(writer),
        None => Err(Error::NotRegistered {
            tag: M::TAG,
            direction: Direction::Outgoing,
        }),
    }
}

fn decode_erased<M: Message>(reader: &mut Reader<'_>) -> Result<DecodedMessage> {
    Ok(Box::new(M::decode(reader)?))
}

/// Decoder and handler bound to an incoming message type.
pub struct IncomingCommand {
    decode: DecodeFn,
    handler: HandlerFn,
}

impl IncomingCommand {
    /// Decode a message body. The tag must already have been consumed.
    pub fn decode(&self, reader: &mut Reader<'_>) -> Result<DecodedMessage> {
        (self.decode)(reader)
    }

    /// Hand a decoded message to the bound handler
    pub fn invoke(&self, connection: ConnectionId, message: DecodedMessage) {
        (self.handler)(connection, message);
    }
}

enum Binding {
    Outgoing {
        policy: DeliveryPolicy,
        encode: EncodeFn,
    },
    Incoming(IncomingCommand),
}

/// One row of the registry.
pub struct CommandEntry {
    name: Cow<'static, str>,
    tag: MessageTag,
    binding: Binding,
}

impl CommandEntry {
    /// Registered name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message tag
    #[must_use]
    pub const fn tag(&self) -> MessageTag {
        self.tag
    }

    /// Direction the entry serves
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.binding {
            Binding::Outgoing { .. } => Direction::Outgoing,
            Binding::Incoming(_) => Direction::Incoming,
        }
    }

    /// Delivery policy, for outgoing entries
    #[must_use]
    pub const fn policy(&self) -> Option<DeliveryPolicy> {
        match self.binding {
            Binding::Outgoing { policy, .. } => Some(policy),
            Binding::Incoming(_) => None,
        }
    }

    /// Decoder and handler, for incoming entries
    #[must_use]
    pub const fn incoming(&self) -> Option<&IncomingCommand> {
        match &self.binding {
            Binding::Incoming(command) => Some(command),
            Binding::Outgoing { .. } => None,
        }
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("direction", &self.direction())
            .field("policy", &self.policy())
            .finish()
    }
}

/// Indexes shared by the builder and the sealed registry.
struct Table {
    entries: Vec<CommandEntry>,
    by_name: HashMap<Cow<'static, str>, usize>,
    by_tag: [Option<usize>; MessageTag::COUNT],
}

impl Default for Table {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_tag: [None; MessageTag::COUNT],
        }
    }
}

impl Table {
    fn insert(&mut self, entry: CommandEntry) -> Result<()> {
        let tag = entry.tag;
        if self.by_tag[tag.index()].is_some() || self.by_name.contains_key(&entry.name) {
            warn!(name = %entry.name, %tag, "duplicate command registration");
            return Err(Error::DuplicateRegistration {
                name: entry.name.into_owned(),
                tag,
            });
        }

        let index = self.entries.len();
        self.by_tag[tag.index()] = Some(index);
        self.by_name.insert(entry.name.clone(), index);
        debug!(
            name = %entry.name,
            %tag,
            direction = %entry.direction(),
            "registered command"
        );
        self.entries.push(entry);
        Ok(())
    }

    fn get(&self, tag: MessageTag) -> Option<&CommandEntry> {
        self.by_tag[tag.index()].map(|index| &self.entries[index])
    }
}

/// Build-phase registry. Consumed by [`seal`](Self::seal).
#[derive(Default)]
pub struct CommandRegistryBuilder {
    table: Table,
    limits: CodecLimits,
}

impl CommandRegistryBuilder {
    /// Start an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec limits applied when decoding and sending
    #[must_use]
    pub fn limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Bind `M` for sending with `policy`
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateRegistration`] if the name or `M`'s tag is taken.
    pub fn register_outgoing<M: Message>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        policy: DeliveryPolicy,
    ) -> Result<&mut Self> {
        self.table.insert(CommandEntry {
            name: name.into(),
            tag: M::TAG,
            binding: Binding::Outgoing {
                policy,
                encode: encode_erased::<M>,
            },
        })?;
        Ok(self)
    }

    /// Bind `M` for receiving, handled by `handler`
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateRegistration`] if the name or `M`'s tag is taken.
    pub fn register_incoming<M, F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        handler: F,
    ) -> Result<&mut Self>
    where
        M: Message,
        F: Fn(ConnectionId, M) + Send + Sync + 'static,
    {
        let handler: HandlerFn = Box::new(move |connection: ConnectionId, message: DecodedMessage| {
            match message.downcast::<M>() {
                Ok(message) => handler(connection, *message),
                Err(_) => warn!(%connection, tag = %M::TAG, "handler received foreign message type"),
            }
        });

        self.table.insert(CommandEntry {
            name: name.into(),
            tag: M::TAG,
            binding: Binding::Incoming(IncomingCommand {
                decode: decode_erased::<M>,
                handler,
            }),
        })?;
        Ok(self)
    }

    /// Freeze the registry
    #[must_use]
    pub fn seal(self) -> CommandRegistry {
        debug!(entries = self.table.entries.len(), "command registry sealed");
        CommandRegistry {
            table: self.table,
            limits: self.limits,
        }
    }
}

/// Immutable command table, shared read-only after startup.
pub struct CommandRegistry {
    table: Table,
    limits: CodecLimits,
}

impl CommandRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::new()
    }

    /// Codec limits
    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Encode `message` with its tag and return the bytes plus the declared
    /// delivery policy
    ///
    /// # Errors
    ///
    /// - [`Error::NotRegistered`] if `M` has no outgoing entry
    /// - [`Error::LimitExceeded`] if a string or sequence exceeds the limits
    /// - [`Error::PayloadTooLarge`] if the payload exceeds the limits
    pub fn encode_for_send<M: Message>(&self, message: &M) -> Result<(Bytes, DeliveryPolicy)> {
        let Some(Binding::Outgoing { policy, encode }) =
            self.table.get(M::TAG).map(|entry| &entry.binding)
        else {
            return Err(Error::NotRegistered {
                tag: M::TAG,
                direction: Direction::Outgoing,
            });
        };

        let mut writer = Writer::with_limits(self.limits);
        writer.put(&M::TAG.as_u8())?;
        encode(message, &mut writer)?;
        let payload = writer.finish()?;

        trace!(tag = %M::TAG, size = payload.len(), %policy, "encoded outgoing message");
        Ok((payload, *policy))
    }

    /// Decoder and handler for an incoming tag
    ///
    /// # Errors
    ///
    /// [`Error::NotRegistered`] if the tag has no incoming entry.
    pub fn lookup_incoming(&self, tag: MessageTag) -> Result<&IncomingCommand> {
        self.table
            .get(tag)
            .and_then(CommandEntry::incoming)
            .ok_or(Error::NotRegistered {
                tag,
                direction: Direction::Incoming,
            })
    }

    /// Delivery policy of an outgoing tag
    ///
    /// # Errors
    ///
    /// [`Error::NotRegistered`] if the tag has no outgoing entry.
    pub fn outgoing_policy(&self, tag: MessageTag) -> Result<DeliveryPolicy> {
        self.table
            .get(tag)
            .and_then(CommandEntry::policy)
            .ok_or(Error::NotRegistered {
                tag,
                direction: Direction::Outgoing,
            })
    }

    /// Entry bound to a tag
    #[must_use]
    pub fn get(&self, tag: MessageTag) -> Option<&CommandEntry> {
        self.table.get(tag)
    }

    /// Entry registered under a name
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&CommandEntry> {
        self.table
            .by_name
            .get(name)
            .map(|&index| &self.table.entries[index])
    }

    /// Entries in registration order
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.table.entries.iter()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    /// Check whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }

    /// Hash of the `(tag, name, direction, reliability, channel)` table.
    ///
    /// Independent of registration order. A server table and the matching
    /// client table differ only in direction, so compare
    /// [`contract_fingerprint`](Self::contract_fingerprint) across peers.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.hash_entries(true)
    }

    /// Like [`fingerprint`](Self::fingerprint) but ignoring direction and
    /// policy, so mirrored peer tables hash equal.
    #[must_use]
    pub fn contract_fingerprint(&self) -> u64 {
        self.hash_entries(false)
    }

    fn hash_entries(&self, with_binding: bool) -> u64 {
        let mut hasher = Xxh3::new();
        for tag in MessageTag::ALL {
            let Some(entry) = self.table.get(tag) else {
                continue;
            };
            hasher.update(&[tag.as_u8()]);
            hasher.update(entry.name.as_bytes());
            hasher.update(&[0]);
            if with_binding {
                let (direction, reliability, channel) = match entry.policy() {
                    Some(policy) => (
                        1u8,
                        u8::from(policy.reliability() == Reliability::Reliable),
                        policy.channel(),
                    ),
                    None => (0u8, 0u8, 0u8),
                };
                hasher.update(&[direction, reliability, channel]);
            }
        }
        hasher.digest()
    }
}

impl fmt::Debug for CommandRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistryBuilder")
            .field("entries", &self.table.entries)
            .field("limits", &self.limits)
            .finish()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("entries", &self.table.entries)
            .field("limits", &self.limits)
            .finish()
    }
}
