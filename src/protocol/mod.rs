//! Wire format, message catalog and codec.

pub mod codec;
mod error;
pub mod interning;
pub mod math;
pub mod message;
pub mod metrics;
mod target;
mod types;
pub mod varint;

pub use codec::{
    CodecLimits, Decode, Encode, Reader, Writer, decode, decode_with_limits, encode,
    encode_with_limits,
};
pub use error::{Direction, Error, Result};
pub use interning::{
    InternTable, InternedBatch, InterningError, InterningProducer, SharedInternTable,
};
pub use math::{Quaternion, Vec3};
pub use message::{Message, VarU32};
pub use target::{EntityId, NavigationTarget};
pub use types::{DeliveryPolicy, MessageTag, Reliability};
pub use varint::CompressedUnsigned;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;
