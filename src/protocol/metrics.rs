//! Process-wide protocol counters
//!
//! Outgoing messages are counted once per payload the sink accepted, incoming
//! ones once per payload handed to a handler.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::Direction;
use super::{Error, MessageTag};

/// Track protocol metrics without external dependencies.
pub(crate) struct Metrics;

static SENT_MESSAGES: AtomicU64 = AtomicU64::new(0);
static RECEIVED_MESSAGES: AtomicU64 = AtomicU64::new(0);
static SENT_BYTES: AtomicU64 = AtomicU64::new(0);
static RECEIVED_BYTES: AtomicU64 = AtomicU64::new(0);
static REJECTED_UNKNOWN_TAG: AtomicU64 = AtomicU64::new(0);
static REJECTED_NOT_REGISTERED: AtomicU64 = AtomicU64::new(0);
static REJECTED_MALFORMED: AtomicU64 = AtomicU64::new(0);
static SEND_ERRORS: AtomicU64 = AtomicU64::new(0);

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU64 = AtomicU64::new(0);

static SENT_BY_TAG: [AtomicU64; MessageTag::COUNT] = [ZERO; MessageTag::COUNT];
static RECEIVED_BY_TAG: [AtomicU64; MessageTag::COUNT] = [ZERO; MessageTag::COUNT];

impl Metrics {
    #[inline]
    pub(crate) fn record_message(direction: Direction, tag: MessageTag, len: usize) {
        let (total, bytes, per_tag) = match direction {
            Direction::Outgoing => (&SENT_MESSAGES, &SENT_BYTES, &SENT_BY_TAG),
            Direction::Incoming => (&RECEIVED_MESSAGES, &RECEIVED_BYTES, &RECEIVED_BY_TAG),
        };
        total.fetch_add(1, Ordering::Relaxed);
        bytes.fetch_add(len as u64, Ordering::Relaxed);
        per_tag[tag.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_rejected(error: &Error) {
        let counter = match error {
            Error::UnknownTag { .. } => &REJECTED_UNKNOWN_TAG,
            Error::NotRegistered { .. } => &REJECTED_NOT_REGISTERED,
            _ => &REJECTED_MALFORMED,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_send_error() {
        SEND_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            sent_messages: SENT_MESSAGES.load(Ordering::Relaxed),
            received_messages: RECEIVED_MESSAGES.load(Ordering::Relaxed),
            sent_bytes: SENT_BYTES.load(Ordering::Relaxed),
            received_bytes: RECEIVED_BYTES.load(Ordering::Relaxed),
            rejected_unknown_tag: REJECTED_UNKNOWN_TAG.load(Ordering::Relaxed),
            rejected_not_registered: REJECTED_NOT_REGISTERED.load(Ordering::Relaxed),
            rejected_malformed: REJECTED_MALFORMED.load(Ordering::Relaxed),
            send_errors: SEND_ERRORS.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn count_for(direction: Direction, tag: MessageTag) -> u64 {
        let per_tag = match direction {
            Direction::Outgoing => &SENT_BY_TAG,
            Direction::Incoming => &RECEIVED_BY_TAG,
        };
        per_tag[tag.index()].load(Ordering::Relaxed)
    }
}

/// Lightweight snapshot of process-wide protocol counters.
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    /// Payloads accepted by a sink
    pub sent_messages: u64,
    /// Payloads dispatched to a handler
    pub received_messages: u64,
    /// Bytes of sent payloads, tag included
    pub sent_bytes: u64,
    /// Bytes of dispatched payloads, tag included
    pub received_bytes: u64,
    /// Payloads whose first byte is no catalog tag
    pub rejected_unknown_tag: u64,
    /// Payloads with a known tag but no incoming handler
    pub rejected_not_registered: u64,
    /// Payloads whose body failed to decode
    pub rejected_malformed: u64,
    /// Sends the sink refused
    pub send_errors: u64,
}

impl MetricsSnapshot {
    /// Total payloads rejected by the dispatcher.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected_unknown_tag + self.rejected_not_registered + self.rejected_malformed
    }
}

/// Current process-wide counters.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    Metrics::totals()
}

/// Messages seen for one tag in one direction.
#[must_use]
pub fn message_count(direction: Direction, tag: MessageTag) -> u64 {
    Metrics::count_for(direction, tag)
}
