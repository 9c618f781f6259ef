//! Message codec (encode/decode)
//!
//! Field rules shared by every catalog message:
//!
//! ```text
//! fixed scalar   native width, little-endian, no compression
//! bool           1 byte (0 = false)
//! varint         CompressedUnsigned<T>, see `varint`
//! string         [varint byte length] [UTF-8 bytes]
//! sequence       [varint element count] [element]*
//! record         fields in declaration order
//! ```
//!
//! A full payload is `[tag (1)] [body]`.

use bytes::{BufMut, Bytes, BytesMut};

use super::math::{Quaternion, Vec3};
use super::varint::{self, CompressedUnsigned, VarInt};
use super::{Error, Message, MessageTag, Result};

/// Size of the leading tag field in bytes
pub const TAG_SIZE: usize = 1;

/// Upper bounds applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    /// Longest accepted string, in bytes.
    pub max_string_len: usize,
    /// Largest accepted sequence element count.
    pub max_sequence_len: usize,
    /// Largest payload (tag included) accepted for sending.
    pub max_payload_size: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_string_len: 64 * 1024,
            max_sequence_len: 64 * 1024,
            max_payload_size: super::MAX_PAYLOAD_SIZE,
        }
    }
}

/// Types with a fixed wire encoding.
pub trait Encode {
    /// Append the wire form of `self`
    ///
    /// Fails with [`Error::LimitExceeded`] if a string or sequence is longer
    /// than the writer's limits allow.
    fn encode(&self, writer: &mut Writer) -> Result<()>;
}

/// Types that can be read back from their wire encoding.
pub trait Decode: Sized {
    /// Read one value, failing without consuming a partial value
    fn decode(reader: &mut Reader<'_>) -> Result<Self>;
}

/// Growable output buffer.
///
/// Applies the same [`CodecLimits`] a receiving [`Reader`] enforces, so
/// anything that encodes successfully also decodes on a peer using the same
/// limits.
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
    limits: CodecLimits,
}

impl Writer {
    /// Create an empty writer with default limits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with preallocated capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            limits: CodecLimits::default(),
        }
    }

    /// Create a writer with explicit limits
    #[must_use]
    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            buf: BytesMut::with_capacity(64),
            limits,
        }
    }

    /// Active limits
    #[must_use]
    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Encode a value
    pub fn put<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }

    /// Append a varint
    pub fn put_varint<T: VarInt>(&mut self, value: T) {
        varint::encode(value, &mut self.buf);
    }

    /// Append a length prefix after checking it against `max`
    pub fn put_len(&mut self, what: &'static str, len: usize, max: usize) -> Result<()> {
        if len > max {
            return Err(Error::LimitExceeded { what, len, max });
        }
        let wire = u32::try_from(len).map_err(|_| Error::LimitExceeded {
            what,
            len,
            max: u32::MAX as usize,
        })?;
        self.put_varint(wire);
        Ok(())
    }

    /// Append raw bytes
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check whether nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the written bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Check the payload size limit and convert into an immutable buffer
    pub fn finish(self) -> Result<Bytes> {
        let size = self.buf.len();
        if size > self.limits.max_payload_size {
            return Err(Error::PayloadTooLarge {
                size,
                max: self.limits.max_payload_size,
            });
        }
        Ok(self.buf.freeze())
    }
}

/// Cursor over a received payload.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    limits: CodecLimits,
}

impl<'a> Reader<'a> {
    /// Read `buf` with default limits
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, CodecLimits::default())
    }

    /// Read `buf` with explicit limits
    #[must_use]
    pub fn with_limits(buf: &'a [u8], limits: CodecLimits) -> Self {
        Self {
            buf,
            pos: 0,
            limits,
        }
    }

    /// Bytes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes consumed so far
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Active limits
    #[must_use]
    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Consume exactly `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(Error::Truncated {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Consume a fixed-size array
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Decode a value
    pub fn read<T: Decode>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Decode a varint
    pub fn read_varint<T: VarInt>(&mut self) -> Result<T> {
        let (value, used) = varint::decode::<T>(&self.buf[self.pos..])?;
        self.pos += used;
        Ok(value)
    }

    /// Decode a length prefix and check it against `max`
    pub fn read_len(&mut self, what: &'static str, max: usize) -> Result<usize> {
        let len = self.read_varint::<u32>()? as usize;
        if len > max {
            return Err(Error::LimitExceeded { what, len, max });
        }
        Ok(len)
    }

    /// Fail if any bytes are left unread
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(Error::TrailingBytes { count }),
        }
    }
}

macro_rules! impl_fixed {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode(&self, writer: &mut Writer) -> Result<()> {
                    writer.put_slice(&self.to_le_bytes());
                    Ok(())
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(reader: &mut Reader<'_>) -> Result<Self> {
                    reader.take_array().map(<$ty>::from_le_bytes)
                }
            }
        )*
    };
}

impl_fixed!(u8, u16, u32, u64, i8, i16, i32, i64, f32);

impl Encode for bool {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.put(&u8::from(*self))
    }
}

impl Decode for bool {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(reader.read::<u8>()? != 0)
    }
}

impl<T: VarInt> Encode for CompressedUnsigned<T> {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.put_varint(self.0);
        Ok(())
    }
}

impl<T: VarInt> Decode for CompressedUnsigned<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_varint().map(CompressedUnsigned)
    }
}

impl Encode for str {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        let max = writer.limits().max_string_len;
        writer.put_len("string", self.len(), max)?;
        writer.put_slice(self.as_bytes());
        Ok(())
    }
}

impl Encode for String {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        self.as_str().encode(writer)
    }
}

impl Decode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let max = reader.limits().max_string_len;
        let len = reader.read_len("string", max)?;
        let bytes = reader.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        let max = writer.limits().max_sequence_len;
        writer.put_len("sequence", self.len(), max)?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        self.as_slice().encode(writer)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let max = reader.limits().max_sequence_len;
        let count = reader.read_len("sequence", max)?;

        // Every element occupies at least one byte unless it is an empty
        // record, so `remaining` bounds any honest count.
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }
}

impl Encode for Vec3 {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.put(&self.x)?;
        writer.put(&self.y)?;
        writer.put(&self.z)
    }
}

impl Decode for Vec3 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read()?,
            y: reader.read()?,
            z: reader.read()?,
        })
    }
}

impl Encode for Quaternion {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.put(&self.w)?;
        writer.put(&self.x)?;
        writer.put(&self.y)?;
        writer.put(&self.z)
    }
}

impl Decode for Quaternion {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            w: reader.read()?,
            x: reader.read()?,
            y: reader.read()?,
            z: reader.read()?,
        })
    }
}

/// Encode a message to bytes
///
/// # Format
///
/// ```text
/// [TAG (1 byte)] [BODY (variable)]
/// ```
///
/// # Errors
///
/// - [`Error::LimitExceeded`] if a string or sequence exceeds the default limits
/// - [`Error::PayloadTooLarge`] if the whole payload does
pub fn encode<M: Message>(message: &M) -> Result<Bytes> {
    encode_with_limits(message, CodecLimits::default())
}

/// [`encode`] with explicit limits
pub fn encode_with_limits<M: Message>(message: &M, limits: CodecLimits) -> Result<Bytes> {
    let mut writer = Writer::with_limits(limits);
    writer.put(&M::TAG.as_u8())?;
    message.encode(&mut writer)?;
    writer.finish()
}

/// Decode a message of a known type from a complete payload
///
/// # Errors
///
/// Returns an error if:
/// - The payload is empty or the body is truncated
/// - The tag byte is outside the catalog ([`Error::UnknownTag`])
/// - The tag names a different message ([`Error::TagMismatch`])
/// - Bytes remain after the body
pub fn decode<M: Message>(bytes: &[u8]) -> Result<M> {
    decode_with_limits(bytes, CodecLimits::default())
}

/// [`decode`] with explicit limits
pub fn decode_with_limits<M: Message>(bytes: &[u8], limits: CodecLimits) -> Result<M> {
    let mut reader = Reader::with_limits(bytes, limits);
    let tag = read_tag(&mut reader)?;
    if tag != M::TAG {
        return Err(Error::TagMismatch {
            expected: M::TAG,
            found: tag,
        });
    }

    let message = M::decode(&mut reader)?;
    reader.finish()?;
    Ok(message)
}

/// Read the leading tag of a payload
pub fn read_tag(reader: &mut Reader<'_>) -> Result<MessageTag> {
    let byte = reader.read::<u8>()?;
    MessageTag::from_u8(byte).ok_or(Error::UnknownTag { tag: byte })
}
