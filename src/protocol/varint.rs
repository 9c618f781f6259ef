//! Variable-length unsigned integers
//!
//! Base-128 groups, least significant first. Each byte carries seven value
//! bits; the high bit is set when more bytes follow. The encoder always emits
//! the shortest form, so every value has exactly one encoding.

use bytes::BufMut;

use super::{Error, Result};

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;

/// Unsigned integer widths that can be carried as a varint.
pub trait VarInt: Copy + Sized {
    /// Width of the integer in bits
    const BITS: u32;
    /// Longest legal encoding for this width
    const MAX_LEN: usize = Self::BITS.div_ceil(7) as usize;

    /// Widen to `u64`
    fn to_u64(self) -> u64;

    /// Narrow from `u64`, `None` when the value does not fit
    fn from_u64(value: u64) -> Option<Self>;
}

macro_rules! impl_varint {
    ($($ty:ty),*) => {
        $(
            impl VarInt for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

impl_varint!(u8, u16, u32, u64);

/// Number of bytes `value` occupies on the wire.
#[must_use]
pub const fn encoded_len(value: u64) -> usize {
    let bits = u64::BITS - value.leading_zeros();
    if bits == 0 { 1 } else { bits.div_ceil(7) as usize }
}

/// Append the minimal encoding of `value` to `out`.
pub fn encode<T: VarInt>(value: T, out: &mut impl BufMut) {
    let mut value = value.to_u64();
    while value >= u64::from(CONTINUATION) {
        out.put_u8((value as u8 & PAYLOAD_MASK) | CONTINUATION);
        value >>= 7;
    }
    out.put_u8(value as u8);
}

/// Decode a varint from the start of `buf`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// - [`Error::Truncated`] if `buf` ends before a byte with the high bit clear
/// - [`Error::Overflow`] if the value does not fit `T`
pub fn decode<T: VarInt>(buf: &[u8]) -> Result<(T, usize)> {
    let mut value = 0u64;

    for index in 0..T::MAX_LEN {
        let Some(&byte) = buf.get(index) else {
            return Err(Error::Truncated {
                needed: 1,
                remaining: 0,
            });
        };

        let shift = 7 * index as u32;
        let bits = u64::from(byte & PAYLOAD_MASK);
        if (bits << shift) >> shift != bits {
            return Err(Error::Overflow { bits: T::BITS });
        }
        value |= bits << shift;

        if byte & CONTINUATION == 0 {
            let decoded = T::from_u64(value).ok_or(Error::Overflow { bits: T::BITS })?;
            return Ok((decoded, index + 1));
        }
    }

    Err(Error::Overflow { bits: T::BITS })
}

/// Marks an integer field as varint-encoded on the wire.
///
/// A plain `u32` field is written as four fixed bytes; a
/// `CompressedUnsigned<u32>` field is written with [`encode`]. Counts and
/// resource IDs always use this wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CompressedUnsigned<T>(pub T);

impl<T: VarInt> CompressedUnsigned<T> {
    /// Wrap a value
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Unwrap the value
    #[must_use]
    pub const fn get(self) -> T {
        self.0
    }
}

impl<T: VarInt> From<T> for CompressedUnsigned<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T: VarInt>(value: T) -> Vec<u8> {
        let mut out = Vec::new();
        encode(value, &mut out);
        out
    }

    #[test]
    fn test_boundary_lengths() {
        let cases: [(u32, usize); 6] = [
            (0, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (u32::MAX, 5),
        ];

        for (value, expected) in cases {
            let bytes = encoded(value);
            assert_eq!(bytes.len(), expected, "value {value}");
            assert_eq!(encoded_len(u64::from(value)), expected);
            assert_eq!(decode::<u32>(&bytes).unwrap(), (value, expected));
        }
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encoded(0u32), [0x00]);
        assert_eq!(encoded(300u32), [0xAC, 0x02]);
        assert_eq!(encoded(u64::MAX).len(), 10);
    }

    #[test]
    fn test_truncated() {
        let bytes = encoded(16_384u32);
        for cut in 0..bytes.len() {
            let result = decode::<u32>(&bytes[..cut]);
            assert!(matches!(result, Err(Error::Truncated { .. })), "cut {cut}");
        }
    }

    #[test]
    fn test_overflow_target_width() {
        let bytes = encoded(256u32);
        assert!(matches!(decode::<u8>(&bytes), Err(Error::Overflow { bits: 8 })));
        assert_eq!(decode::<u16>(&bytes).unwrap(), (256, 2));
    }

    #[test]
    fn test_overflow_too_many_bytes() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert!(matches!(decode::<u32>(&bytes), Err(Error::Overflow { bits: 32 })));

        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(decode::<u64>(&bytes), Err(Error::Overflow { bits: 64 })));
    }

    #[test]
    fn test_decode_ignores_following_bytes() {
        let mut bytes = encoded(128u32);
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode::<u32>(&bytes).unwrap(), (128, 2));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Encoding is minimal and decodes back to the same value
            #[test]
            fn prop_minimal_roundtrip(value in any::<u64>()) {
                let bytes = encoded(value);
                prop_assert_eq!(bytes.len(), encoded_len(value));
                prop_assert_eq!(bytes.last().copied().unwrap() & CONTINUATION, 0);
                if bytes.len() > 1 {
                    prop_assert_ne!(*bytes.last().unwrap(), 0);
                }
                prop_assert_eq!(decode::<u64>(&bytes).unwrap(), (value, bytes.len()));
            }

            /// Cutting an encoding anywhere never yields a value
            #[test]
            fn prop_truncation_rejected(value in 128u32.., cut_ratio in 0.0f64..1.0) {
                let bytes = encoded(value);
                let cut = ((bytes.len() as f64) * cut_ratio) as usize;
                let result = decode::<u32>(&bytes[..cut.min(bytes.len() - 1)]);
                let truncated = matches!(result, Err(Error::Truncated { .. }));
                prop_assert!(truncated, "expected truncation, got {:?}", result);
            }
        }
    }
}
