//! Length & discriminant policy (§4.3): resolves how collection lengths,
//! string byte-lengths, and enum discriminants are emitted, so the rest of
//! the recursion can stay policy-agnostic.

use crate::error::Result;
use crate::options::Options;
use crate::primitive;
use crate::varint;

/// Appends a length prefix for `len`, honoring `options.varint`: fixed `U64`
/// in default mode, varint otherwise.
pub fn encode_length(out: &mut Vec<u8>, len: u64, options: &Options) {
    if options.varint {
        varint::encode_unsigned(out, len as u128);
    } else {
        primitive::encode_u64(out, len);
    }
}

/// Reads a length prefix from the front of `bytes`.
pub fn decode_length(bytes: &[u8], options: &Options) -> Result<(u64, &[u8])> {
    if options.varint {
        let (len, rest) = varint::decode_unsigned(bytes)?;
        Ok((len as u64, rest))
    } else {
        primitive::decode_u64(bytes)
    }
}

/// Appends an enum discriminant for `index`, honoring `options.varint`:
/// fixed `U32` in default mode, varint otherwise.
pub fn encode_discriminant(out: &mut Vec<u8>, index: u32, options: &Options) {
    if options.varint {
        varint::encode_unsigned(out, index as u128);
    } else {
        primitive::encode_u32(out, index);
    }
}

/// Reads an enum discriminant from the front of `bytes`.
pub fn decode_discriminant(bytes: &[u8], options: &Options) -> Result<(u32, &[u8])> {
    if options.varint {
        let (value, rest) = varint::decode_unsigned(bytes)?;
        Ok((value as u32, rest))
    } else {
        primitive::decode_u32(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_uses_fixed_u64_length() {
        let mut buf = Vec::new();
        encode_length(&mut buf, 4, &Options::fixed());
        assert_eq!(buf, vec![4, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn varint_mode_uses_varint_length() {
        let mut buf = Vec::new();
        encode_length(&mut buf, 12, &Options::varint());
        assert_eq!(buf, vec![12]);
    }

    #[test]
    fn default_mode_uses_fixed_u32_discriminant() {
        let mut buf = Vec::new();
        encode_discriminant(&mut buf, 0, &Options::fixed());
        assert_eq!(buf, vec![0, 0, 0, 0]);
    }

    #[test]
    fn varint_mode_uses_varint_discriminant() {
        let mut buf = Vec::new();
        encode_discriminant(&mut buf, 0, &Options::varint());
        assert_eq!(buf, vec![0]);
    }
}
