//! Erewhon wire protocol - message catalog, compact binary codec and command dispatch
//!
//! Every payload exchanged between an Erewhon client and server is one tagged
//! message: a single tag byte followed by the message body. This crate owns
//! that format and the command tables that bind each message to a delivery
//! policy or a handler. It does not open sockets; a transport plugs in through
//! [`command::PacketSink`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ewn_protocol::command::{CommandRegistry, ConnectionId, Dispatcher};
//! use ewn_protocol::protocol::{DeliveryPolicy, encode};
//! use ewn_protocol::protocol::message::{TimeSyncRequest, TimeSyncResponse};
//!
//! let mut builder = CommandRegistry::builder();
//! builder
//!     .register_incoming::<TimeSyncRequest, _>("TimeSyncRequest", |conn, request| {
//!         println!("{conn} asked for time, request {}", request.request_id);
//!     })?
//!     .register_outgoing::<TimeSyncResponse>("TimeSyncResponse", DeliveryPolicy::unreliable(0))?;
//! let registry = Arc::new(builder.seal());
//!
//! // Receive
//! let dispatcher = Dispatcher::new(Arc::clone(&registry));
//! dispatcher.dispatch(ConnectionId(1), &encode(&TimeSyncRequest { request_id: 7 })?)?;
//!
//! // Send
//! let (bytes, policy) = registry.encode_for_send(&TimeSyncResponse {
//!     request_id: 7,
//!     server_time: 1_000,
//! })?;
//! assert!(!policy.is_reliable());
//! assert_eq!(bytes.len(), 13);
//! # Ok::<(), ewn_protocol::Error>(())
//! ```
//!
//! # Features
//!
//! - **Compact encoding** - base-128 varints for counts and IDs, fixed-width
//!   little-endian scalars everywhere else
//! - **Typed catalog** - one Rust struct per message, tag bound at compile time
//! - **Sealed registry** - built once, shared read-only across threads
//! - **Resource interning** - batched ID allocation for strings, sounds,
//!   particle systems and prefabs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod command;
pub mod protocol;

pub use command::{CommandRegistry, ConnectionId, Dispatcher, Outbox, PacketSink};
pub use protocol::{
    DeliveryPolicy, Error, MAX_PAYLOAD_SIZE, Message, MessageTag, Reliability, Result,
};

/// Protocol version
pub const VERSION: &str = "0.1.0";
