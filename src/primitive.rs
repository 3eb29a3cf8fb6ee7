//! Fixed-width little-endian encode/decode of primitive values (§4.1).
//!
//! Every multi-byte value here is little-endian, matching the wire format
//! exactly; there is no other endianness to select (§1 Non-goals), so these
//! functions operate directly on byte arrays rather than through a
//! configurable byte-order adapter.

use crate::error::{self, Result};

/// Splits `bytes` into the first `needed` bytes and the remainder, or fails
/// with [`Error::TruncatedInput`] if fewer than `needed` bytes are available.
pub fn take(bytes: &[u8], needed: usize) -> Result<(&[u8], &[u8])> {
    if bytes.len() < needed {
        return error::TruncatedInputSnafu {
            needed,
            available: bytes.len(),
        }
        .fail();
    }
    Ok(bytes.split_at(needed))
}

macro_rules! fixed_width_unsigned {
    ($encode:ident, $decode:ident, $ty:ty) => {
        /// Appends the little-endian encoding of `value` to `out`.
        pub fn $encode(out: &mut Vec<u8>, value: $ty) {
            out.extend_from_slice(&value.to_le_bytes());
        }

        /// Reads a little-endian
        #[doc = stringify!($ty)]
        /// from the front of `bytes`, returning the value and the remainder.
        pub fn $decode(bytes: &[u8]) -> Result<($ty, &[u8])> {
            let (head, rest) = take(bytes, std::mem::size_of::<$ty>())?;
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(head);
            Ok((<$ty>::from_le_bytes(buf), rest))
        }
    };
}

fixed_width_unsigned!(encode_u8, decode_u8, u8);
fixed_width_unsigned!(encode_u16, decode_u16, u16);
fixed_width_unsigned!(encode_u32, decode_u32, u32);
fixed_width_unsigned!(encode_u64, decode_u64, u64);
fixed_width_unsigned!(encode_u128, decode_u128, u128);

fixed_width_unsigned!(encode_i8, decode_i8, i8);
fixed_width_unsigned!(encode_i16, decode_i16, i16);
fixed_width_unsigned!(encode_i32, decode_i32, i32);
fixed_width_unsigned!(encode_i64, decode_i64, i64);
fixed_width_unsigned!(encode_i128, decode_i128, i128);

fixed_width_unsigned!(encode_f32, decode_f32, f32);
fixed_width_unsigned!(encode_f64, decode_f64, f64);

/// Encodes a boolean as a single byte: `0x01` for `true`, `0x00` for `false`.
pub fn encode_bool(out: &mut Vec<u8>, value: bool) {
    out.push(if value { 0x01 } else { 0x00 });
}

/// Decodes a single boolean byte. Any byte other than `0x00`/`0x01` is
/// [`Error::InvalidBool`].
pub fn decode_bool(bytes: &[u8]) -> Result<(bool, &[u8])> {
    let (head, rest) = take(bytes, 1)?;
    match head[0] {
        0x00 => Ok((false, rest)),
        0x01 => Ok((true, rest)),
        byte => error::InvalidBoolSnafu { byte }.fail(),
    }
}
