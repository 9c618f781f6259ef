//! Protocol error types

use thiserror::Error;

use super::MessageTag;

/// Protocol errors raised by the codec, the command registry and the dispatcher.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer ended before a field or sequence was complete
    #[error("truncated input: need {needed} more bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the current field required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// Varint does not fit the target integer width
    #[error("varint overflows {bits}-bit target")]
    Overflow {
        /// Width of the target integer
        bits: u32,
    },

    /// Leading tag byte is outside the message catalog
    #[error("unknown message tag: {tag:#04x}")]
    UnknownTag {
        /// Raw tag byte
        tag: u8,
    },

    /// Payload carries a different message than the one requested
    #[error("expected {expected} message, found {found}")]
    TagMismatch {
        /// Tag of the requested message type
        expected: MessageTag,
        /// Tag read from the payload
        found: MessageTag,
    },

    /// No command entry bound for the requested direction
    #[error("{tag} is not registered for {direction} use")]
    NotRegistered {
        /// Message tag that was looked up
        tag: MessageTag,
        /// Direction of the failed lookup
        direction: Direction,
    },

    /// Name or tag registered twice while building the registry
    #[error("duplicate registration of {tag} under name {name:?}")]
    DuplicateRegistration {
        /// Name passed to the failed registration
        name: String,
        /// Tag passed to the failed registration
        tag: MessageTag,
    },

    /// Body of a received payload failed to decode
    #[error("malformed {tag} body: {source}")]
    MalformedBody {
        /// Tag read from the payload
        tag: MessageTag,
        /// Underlying codec failure
        #[source]
        source: Box<Error>,
    },

    /// String field holds invalid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Declared length is over the configured codec limit
    #[error("{what} length {len} exceeds limit {max}")]
    LimitExceeded {
        /// Kind of field (`string` or `sequence`)
        what: &'static str,
        /// Declared length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Payload too large to send
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Encoded size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Bytes left over after a complete body decode
    #[error("{count} trailing bytes after message body")]
    TrailingBytes {
        /// Number of unread bytes
        count: usize,
    },

    /// Packet sink refused the payload
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Short, allocation-free label used for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "truncated",
            Self::Overflow { .. } => "overflow",
            Self::UnknownTag { .. } => "unknown_tag",
            Self::TagMismatch { .. } => "tag_mismatch",
            Self::NotRegistered { .. } => "not_registered",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::MalformedBody { .. } => "malformed_body",
            Self::InvalidUtf8(_) => "invalid_utf8",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::TrailingBytes { .. } => "trailing_bytes",
            Self::Transport(_) => "transport",
        }
    }
}

/// Direction of a command entry relative to the local peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Received from the remote peer
    Incoming,
    /// Sent to the remote peer
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incoming => write!(f, "incoming"),
            Self::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
