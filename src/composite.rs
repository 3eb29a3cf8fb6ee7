//! Composite codec (§4.4): length-prefixed sequences, key/value mappings,
//! sets, options, and fixed-arity tuples. Each function recurses back into
//! the top-level dispatcher ([`crate::codec::encode_value`] /
//! [`crate::codec::decode_value`]) for its element descriptor(s).

use crate::codec::{decode_value, encode_value};
use crate::descriptor::Descriptor;
use crate::error::{self, Result};
use crate::length;
use crate::options::Options;
use crate::registry::Registry;
use crate::value::Value;

/// Encodes `Seq(elem_ty)`: length prefix, then each element in order.
pub fn encode_seq(
    out: &mut Vec<u8>,
    items: &[Value],
    elem_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    length::encode_length(out, items.len() as u64, options);
    for item in items {
        encode_value(out, item, elem_ty, options, registry)?;
    }
    Ok(())
}

/// Decodes `Seq(elem_ty)`: a length prefix followed by that many elements.
pub fn decode_seq<'a>(
    bytes: &'a [u8],
    elem_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Vec<Value>, &'a [u8])> {
    let (len, mut rest) = length::decode_length(bytes, options)?;
    let mut items = Vec::with_capacity(len.min(4096) as usize);
    for _ in 0..len {
        let (item, tail) = decode_value(rest, elem_ty, options, registry)?;
        items.push(item);
        rest = tail;
    }
    Ok((items, rest))
}

/// Encodes `Map(key_ty, value_ty)`: length prefix, then `len` `(key, value)`
/// pairs in the host's iteration order.
pub fn encode_map(
    out: &mut Vec<u8>,
    pairs: &[(Value, Value)],
    key_ty: &Descriptor,
    value_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    length::encode_length(out, pairs.len() as u64, options);
    for (key, value) in pairs {
        encode_value(out, key, key_ty, options, registry)?;
        encode_value(out, value, value_ty, options, registry)?;
    }
    Ok(())
}

/// Decodes `Map(key_ty, value_ty)`. A later pair with an equal key replaces
/// an earlier one (§3 Invariants).
pub fn decode_map<'a>(
    bytes: &'a [u8],
    key_ty: &Descriptor,
    value_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Vec<(Value, Value)>, &'a [u8])> {
    let (len, mut rest) = length::decode_length(bytes, options)?;
    let mut pairs = Vec::new();
    for _ in 0..len {
        let (key, tail) = decode_value(rest, key_ty, options, registry)?;
        let (value, tail) = decode_value(tail, value_ty, options, registry)?;
        rest = tail;
        pairs.push((key, value));
    }
    Ok((crate::value::dedup_last_write_wins(pairs), rest))
}

/// Encodes `Set(elem_ty)` exactly like `Seq(elem_ty)` (§4.4).
pub fn encode_set(
    out: &mut Vec<u8>,
    items: &[Value],
    elem_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    encode_seq(out, items, elem_ty, options, registry)
}

/// Decodes `Set(elem_ty)` as a sequence, then collapses duplicates by
/// structural equality (§9 Open Questions).
pub fn decode_set<'a>(
    bytes: &'a [u8],
    elem_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Vec<Value>, &'a [u8])> {
    let (items, rest) = decode_seq(bytes, elem_ty, options, registry)?;
    Ok((crate::value::dedup_first_seen(items), rest))
}

/// Encodes `Opt(inner_ty)`: `0x00` if absent, else `0x01` then the payload.
pub fn encode_opt(
    out: &mut Vec<u8>,
    value: &Option<Box<Value>>,
    inner_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    match value {
        None => out.push(0x00),
        Some(inner) => {
            out.push(0x01);
            encode_value(out, inner, inner_ty, options, registry)?;
        }
    }
    Ok(())
}

/// Decodes `Opt(inner_ty)`. Any tag byte other than `0x00`/`0x01` is
/// [`crate::error::Error::InvalidOption`].
pub fn decode_opt<'a>(
    bytes: &'a [u8],
    inner_ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Option<Box<Value>>, &'a [u8])> {
    let (head, rest) = crate::primitive::take(bytes, 1)?;
    match head[0] {
        0x00 => Ok((None, rest)),
        0x01 => {
            let (inner, rest) = decode_value(rest, inner_ty, options, registry)?;
            Ok((Some(Box::new(inner)), rest))
        }
        byte => error::InvalidOptionSnafu { byte }.fail(),
    }
}

/// Encodes `Tup(component_tys)`: each component in order, no length prefix.
/// Arity mismatch between `items` and `component_tys` is
/// [`crate::error::Error::ArityMismatch`].
pub fn encode_tup(
    out: &mut Vec<u8>,
    items: &[Value],
    component_tys: &[Descriptor],
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    if items.len() != component_tys.len() {
        return error::ArityMismatchSnafu {
            expected: component_tys.len(),
            actual: items.len(),
        }
        .fail();
    }
    for (item, ty) in items.iter().zip(component_tys) {
        encode_value(out, item, ty, options, registry)?;
    }
    Ok(())
}

/// Decodes `Tup(component_tys)`: each component read in order.
pub fn decode_tup<'a>(
    bytes: &'a [u8],
    component_tys: &[Descriptor],
    options: &Options,
    registry: &Registry,
) -> Result<(crate::value::TupleValues, &'a [u8])> {
    let mut items = crate::value::TupleValues::with_capacity(component_tys.len());
    let mut rest = bytes;
    for ty in component_tys {
        let (item, tail) = decode_value(rest, ty, options, registry)?;
        items.push(item);
        rest = tail;
    }
    Ok((items, rest))
}
