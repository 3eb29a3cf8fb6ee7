//! The type-directed dispatcher (§4.6) and the struct/enum handling that
//! backs `UserRef` (§4.5). This is the single choke point where
//! [`Options`] threads through every recursive call; no other component
//! reads options from ambient state.

use crate::composite;
use crate::descriptor::Descriptor;
use crate::error::{self, Result};
use crate::options::Options;
use crate::primitive;
use crate::registry::{Definition, EnumDef, Registry, StructDef};
use crate::value::Value;
use crate::varint;

/// Encodes `value` at descriptor `ty`, appending its wire image to `out`.
///
/// This is the recursive entry point every composite and user-defined case
/// calls back into (§4.6).
pub fn encode_value(
    out: &mut Vec<u8>,
    value: &Value,
    ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    match (ty, value) {
        (Descriptor::U8, Value::U8(v)) => {
            primitive::encode_u8(out, *v);
            Ok(())
        }
        (Descriptor::U16, Value::U16(v)) => {
            encode_unsigned_width(out, *v as u128, options, |out, v| {
                primitive::encode_u16(out, v as u16)
            });
            Ok(())
        }
        (Descriptor::U32, Value::U32(v)) => {
            encode_unsigned_width(out, *v as u128, options, |out, v| {
                primitive::encode_u32(out, v as u32)
            });
            Ok(())
        }
        (Descriptor::U64, Value::U64(v)) => {
            encode_unsigned_width(out, *v as u128, options, |out, v| {
                primitive::encode_u64(out, v as u64)
            });
            Ok(())
        }
        (Descriptor::U128, Value::U128(v)) => {
            if options.varint {
                varint::encode_unsigned(out, *v);
            } else {
                primitive::encode_u128(out, *v);
            }
            Ok(())
        }
        (Descriptor::I8, Value::I8(v)) => {
            primitive::encode_i8(out, *v);
            Ok(())
        }
        (Descriptor::I16, Value::I16(v)) => {
            encode_signed_width(out, *v as i128, options, |out, v| {
                primitive::encode_i16(out, v as i16)
            });
            Ok(())
        }
        (Descriptor::I32, Value::I32(v)) => {
            encode_signed_width(out, *v as i128, options, |out, v| {
                primitive::encode_i32(out, v as i32)
            });
            Ok(())
        }
        (Descriptor::I64, Value::I64(v)) => {
            encode_signed_width(out, *v as i128, options, |out, v| {
                primitive::encode_i64(out, v as i64)
            });
            Ok(())
        }
        (Descriptor::I128, Value::I128(v)) => {
            if options.varint {
                varint::encode_signed(out, *v);
            } else {
                primitive::encode_i128(out, *v);
            }
            Ok(())
        }
        (Descriptor::F32, Value::F32(v)) => {
            primitive::encode_f32(out, *v);
            Ok(())
        }
        (Descriptor::F64, Value::F64(v)) => {
            primitive::encode_f64(out, *v);
            Ok(())
        }
        (Descriptor::Bool, Value::Bool(v)) => {
            primitive::encode_bool(out, *v);
            Ok(())
        }
        (Descriptor::Str, Value::Str(bytes)) => {
            crate::length::encode_length(out, bytes.len() as u64, options);
            out.extend_from_slice(bytes);
            Ok(())
        }
        (Descriptor::Opt(inner_ty), Value::Opt(inner)) => {
            composite::encode_opt(out, inner, inner_ty, options, registry)
        }
        (Descriptor::Seq(elem_ty), Value::Seq(items)) => {
            composite::encode_seq(out, items, elem_ty, options, registry)
        }
        (Descriptor::Map(key_ty, value_ty), Value::Map(pairs)) => {
            composite::encode_map(out, pairs, key_ty, value_ty, options, registry)
        }
        (Descriptor::Set(elem_ty), Value::Set(items)) => {
            composite::encode_set(out, items, elem_ty, options, registry)
        }
        (Descriptor::Tup(component_tys), Value::Tup(items)) => {
            check_tuple_size(component_tys.len(), options)?;
            composite::encode_tup(out, items, component_tys, options, registry)
        }
        (Descriptor::UserRef(name), _) => encode_user_ref(out, value, name, options, registry),
        _ => error::TypeMismatchSnafu {
            value: format!("{:?} ({})", value, value.shape_name()),
            descriptor: ty.clone(),
        }
        .fail(),
    }
}

/// Decodes a value at descriptor `ty` from the front of `bytes`, returning
/// the value and whatever bytes remain (§4.6, §8 property 2).
pub fn decode_value<'a>(
    bytes: &'a [u8],
    ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Value, &'a [u8])> {
    match ty {
        Descriptor::U8 => primitive::decode_u8(bytes).map(|(v, r)| (Value::U8(v), r)),
        Descriptor::U16 => {
            decode_unsigned_width(bytes, options, primitive::decode_u16, |v| Value::U16(v as u16))
        }
        Descriptor::U32 => {
            decode_unsigned_width(bytes, options, primitive::decode_u32, |v| Value::U32(v as u32))
        }
        Descriptor::U64 => {
            decode_unsigned_width(bytes, options, primitive::decode_u64, |v| Value::U64(v as u64))
        }
        Descriptor::U128 => {
            if options.varint {
                let (v, rest) = varint::decode_unsigned(bytes)?;
                Ok((Value::U128(v), rest))
            } else {
                primitive::decode_u128(bytes).map(|(v, r)| (Value::U128(v), r))
            }
        }
        Descriptor::I8 => primitive::decode_i8(bytes).map(|(v, r)| (Value::I8(v), r)),
        Descriptor::I16 => {
            decode_signed_width(bytes, options, primitive::decode_i16, |v| Value::I16(v as i16))
        }
        Descriptor::I32 => {
            decode_signed_width(bytes, options, primitive::decode_i32, |v| Value::I32(v as i32))
        }
        Descriptor::I64 => {
            decode_signed_width(bytes, options, primitive::decode_i64, |v| Value::I64(v as i64))
        }
        Descriptor::I128 => {
            if options.varint {
                let (v, rest) = varint::decode_signed(bytes)?;
                Ok((Value::I128(v), rest))
            } else {
                primitive::decode_i128(bytes).map(|(v, r)| (Value::I128(v), r))
            }
        }
        Descriptor::F32 => primitive::decode_f32(bytes).map(|(v, r)| (Value::F32(v), r)),
        Descriptor::F64 => primitive::decode_f64(bytes).map(|(v, r)| (Value::F64(v), r)),
        Descriptor::Bool => primitive::decode_bool(bytes).map(|(v, r)| (Value::Bool(v), r)),
        Descriptor::Str => {
            let (len, rest) = crate::length::decode_length(bytes, options)?;
            let (head, rest) = primitive::take(rest, len as usize)?;
            Ok((Value::Str(head.to_vec()), rest))
        }
        Descriptor::Opt(inner_ty) => {
            let (v, rest) = composite::decode_opt(bytes, inner_ty, options, registry)?;
            Ok((Value::Opt(v), rest))
        }
        Descriptor::Seq(elem_ty) => {
            let (items, rest) = composite::decode_seq(bytes, elem_ty, options, registry)?;
            Ok((Value::Seq(items), rest))
        }
        Descriptor::Map(key_ty, value_ty) => {
            let (pairs, rest) = composite::decode_map(bytes, key_ty, value_ty, options, registry)?;
            Ok((Value::Map(pairs), rest))
        }
        Descriptor::Set(elem_ty) => {
            let (items, rest) = composite::decode_set(bytes, elem_ty, options, registry)?;
            Ok((Value::Set(items), rest))
        }
        Descriptor::Tup(component_tys) => {
            check_tuple_size(component_tys.len(), options)?;
            let (items, rest) = composite::decode_tup(bytes, component_tys, options, registry)?;
            Ok((Value::Tup(items), rest))
        }
        Descriptor::UserRef(name) => decode_user_ref(bytes, name, options, registry),
    }
}

fn check_tuple_size(arity: usize, options: &Options) -> Result<()> {
    if arity > options.max_tuple_size {
        return error::TupleTooLargeSnafu {
            arity,
            max: options.max_tuple_size,
        }
        .fail();
    }
    Ok(())
}

fn encode_unsigned_width(
    out: &mut Vec<u8>,
    value: u128,
    options: &Options,
    fixed: impl FnOnce(&mut Vec<u8>, u128),
) {
    if options.varint {
        varint::encode_unsigned(out, value);
    } else {
        fixed(out, value);
    }
}

fn encode_signed_width(
    out: &mut Vec<u8>,
    value: i128,
    options: &Options,
    fixed: impl FnOnce(&mut Vec<u8>, i128),
) {
    if options.varint {
        varint::encode_signed(out, value);
    } else {
        fixed(out, value);
    }
}

/// Turns a concrete fixed-width integer back into its `Value` case, so
/// [`decode_unsigned_width`] can stay generic over width instead of
/// duplicating its match arm per type.
trait WrapUnsigned: Copy {
    fn wrap(self) -> Value;
}
impl WrapUnsigned for u16 {
    fn wrap(self) -> Value {
        Value::U16(self)
    }
}
impl WrapUnsigned for u32 {
    fn wrap(self) -> Value {
        Value::U32(self)
    }
}
impl WrapUnsigned for u64 {
    fn wrap(self) -> Value {
        Value::U64(self)
    }
}

fn decode_unsigned_width<'a, T: WrapUnsigned>(
    bytes: &'a [u8],
    options: &Options,
    fixed: impl FnOnce(&'a [u8]) -> Result<(T, &'a [u8])>,
    wrap_varint: impl FnOnce(u128) -> Value,
) -> Result<(Value, &'a [u8])> {
    if options.varint {
        let (v, rest) = varint::decode_unsigned(bytes)?;
        Ok((wrap_varint(v), rest))
    } else {
        let (v, rest) = fixed(bytes)?;
        Ok((v.wrap(), rest))
    }
}

trait WrapSigned: Copy {
    fn wrap(self) -> Value;
}
impl WrapSigned for i16 {
    fn wrap(self) -> Value {
        Value::I16(self)
    }
}
impl WrapSigned for i32 {
    fn wrap(self) -> Value {
        Value::I32(self)
    }
}
impl WrapSigned for i64 {
    fn wrap(self) -> Value {
        Value::I64(self)
    }
}

fn decode_signed_width<'a, T: WrapSigned>(
    bytes: &'a [u8],
    options: &Options,
    fixed: impl FnOnce(&'a [u8]) -> Result<(T, &'a [u8])>,
    wrap: impl FnOnce(i128) -> Value,
) -> Result<(Value, &'a [u8])> {
    if options.varint {
        let (v, rest) = varint::decode_signed(bytes)?;
        Ok((wrap(v), rest))
    } else {
        let (v, rest) = fixed(bytes)?;
        Ok((v.wrap(), rest))
    }
}

fn encode_user_ref(
    out: &mut Vec<u8>,
    value: &Value,
    name: &str,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    match registry.resolve(name)? {
        Definition::Struct(def) => match value {
            Value::Struct {
                name: value_name,
                fields,
            } => {
                if value_name != name {
                    return error::SchemaMismatchSnafu {
                        type_name: name.to_string(),
                        reason: format!("value is tagged as `{value_name}`"),
                    }
                    .fail();
                }
                encode_struct_fields(out, fields, def, options, registry)
            }
            _ => error::SchemaMismatchSnafu {
                type_name: name.to_string(),
                reason: format!("expected a Struct value, found {}", value.shape_name()),
            }
            .fail(),
        },
        Definition::Enum(def) => match value {
            Value::Enum {
                name: value_name,
                variant,
                fields,
            } => {
                if value_name != name {
                    return error::SchemaMismatchSnafu {
                        type_name: name.to_string(),
                        reason: format!("value is tagged as `{value_name}`"),
                    }
                    .fail();
                }
                let index = def.index_of(variant).ok_or_else(|| {
                    error::SchemaMismatchSnafu {
                        type_name: name.to_string(),
                        reason: format!("no such variant `{variant}`"),
                    }
                    .build()
                })?;
                let (_, struct_def) = &def.variants[index];
                crate::length::encode_discriminant(out, index as u32, options);
                encode_struct_fields(out, fields, struct_def, options, registry)
            }
            _ => error::SchemaMismatchSnafu {
                type_name: name.to_string(),
                reason: format!("expected an Enum value, found {}", value.shape_name()),
            }
            .fail(),
        },
    }
}

fn decode_user_ref<'a>(
    bytes: &'a [u8],
    name: &str,
    options: &Options,
    registry: &Registry,
) -> Result<(Value, &'a [u8])> {
    match registry.resolve(name)? {
        Definition::Struct(def) => {
            let (fields, rest) = decode_struct_fields(bytes, def, options, registry)?;
            Ok((
                Value::Struct {
                    name: name.to_string(),
                    fields,
                },
                rest,
            ))
        }
        Definition::Enum(def) => decode_enum(bytes, name, def, options, registry),
    }
}

/// Enum decode state machine (§4.8): `ReadTag -> DispatchVariant ->
/// DecodeBody -> Done`. The discriminant is consumed exactly once, in
/// `ReadTag`; `DecodeBody` only ever sees the bytes remaining after it
/// (§9 Open Questions — the reference implementation re-reads it here).
fn decode_enum<'a>(
    bytes: &'a [u8],
    name: &str,
    def: &EnumDef,
    options: &Options,
    registry: &Registry,
) -> Result<(Value, &'a [u8])> {
    // ReadTag
    let (discriminant, after_tag) = crate::length::decode_discriminant(bytes, options)?;
    tracing::trace!(type_name = name, discriminant, "decoded enum discriminant");

    // DispatchVariant
    let (variant_name, struct_def) = def.variant_at(discriminant as usize).ok_or_else(|| {
        error::UnknownVariantSnafu {
            type_name: name.to_string(),
            discriminant: discriminant as u64,
        }
        .build()
    })?;

    // DecodeBody (consumes only `after_tag`, never re-reads the tag)
    let (fields, rest) = decode_struct_fields(after_tag, struct_def, options, registry)?;

    // Done
    Ok((
        Value::Enum {
            name: name.to_string(),
            variant: variant_name.clone(),
            fields,
        },
        rest,
    ))
}

fn encode_struct_fields(
    out: &mut Vec<u8>,
    field_values: &[(String, Value)],
    def: &StructDef,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    if field_values.len() != def.fields.len() {
        return error::ArityMismatchSnafu {
            expected: def.fields.len(),
            actual: field_values.len(),
        }
        .fail();
    }
    for ((value_name, value), (decl_name, ty)) in field_values.iter().zip(&def.fields) {
        if value_name != decl_name {
            return error::SchemaMismatchSnafu {
                type_name: decl_name.clone(),
                reason: format!("expected field `{decl_name}`, found `{value_name}`"),
            }
            .fail();
        }
        encode_value(out, value, ty, options, registry)?;
    }
    Ok(())
}

fn decode_struct_fields<'a>(
    bytes: &'a [u8],
    def: &StructDef,
    options: &Options,
    registry: &Registry,
) -> Result<(Vec<(String, Value)>, &'a [u8])> {
    let mut fields = Vec::with_capacity(def.fields.len());
    let mut rest = bytes;
    for (name, ty) in &def.fields {
        let (value, tail) = decode_value(rest, ty, options, registry)?;
        fields.push((name.clone(), value));
        rest = tail;
    }
    Ok((fields, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip_addr_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_enum(
            "IpAddr",
            vec![
                (
                    "V4".to_string(),
                    vec![(
                        "0".to_string(),
                        Descriptor::Tup(vec![
                            Descriptor::U8,
                            Descriptor::U8,
                            Descriptor::U8,
                            Descriptor::U8,
                        ]),
                    )],
                ),
                (
                    "V6".to_string(),
                    vec![(
                        "0".to_string(),
                        Descriptor::Tup(vec![Descriptor::U16; 8]),
                    )],
                ),
            ],
        );
        registry
    }

    fn ipv4_value() -> Value {
        Value::Enum {
            name: "IpAddr".to_string(),
            variant: "V4".to_string(),
            fields: vec![(
                "0".to_string(),
                Value::Tup(smallvec::smallvec![
                    Value::U8(127),
                    Value::U8(0),
                    Value::U8(0),
                    Value::U8(1),
                ]),
            )],
        }
    }

    #[test]
    fn enum_default_mode_matches_scenario_table() {
        let registry = ip_addr_registry();
        let mut out = Vec::new();
        encode_value(
            &mut out,
            &ipv4_value(),
            &Descriptor::user_ref("IpAddr"),
            &Options::fixed(),
            &registry,
        )
        .unwrap();
        assert_eq!(out, vec![0, 0, 0, 0, 127, 0, 0, 1]);
    }

    #[test]
    fn enum_varint_mode_matches_scenario_table() {
        let registry = ip_addr_registry();
        let mut out = Vec::new();
        encode_value(
            &mut out,
            &ipv4_value(),
            &Descriptor::user_ref("IpAddr"),
            &Options::varint(),
            &registry,
        )
        .unwrap();
        assert_eq!(out, vec![0, 127, 0, 0, 1]);
    }

    #[test]
    fn enum_round_trips_in_both_modes() {
        let registry = ip_addr_registry();
        for options in [Options::fixed(), Options::varint()] {
            let mut out = Vec::new();
            encode_value(
                &mut out,
                &ipv4_value(),
                &Descriptor::user_ref("IpAddr"),
                &options,
                &registry,
            )
            .unwrap();
            let (decoded, rest) =
                decode_value(&out, &Descriptor::user_ref("IpAddr"), &options, &registry).unwrap();
            assert!(rest.is_empty());
            assert_eq!(decoded, ipv4_value());
        }
    }

    #[test]
    fn unknown_discriminant_is_rejected_on_decode() {
        let registry = ip_addr_registry();
        // discriminant 9 does not name a declared variant
        let bytes = [9u8, 0, 0, 0];
        let err = decode_value(
            &bytes,
            &Descriptor::user_ref("IpAddr"),
            &Options::fixed(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::UnknownVariant { discriminant: 9, .. }
        ));
    }

    #[test]
    fn signed_value_against_unsigned_descriptor_is_a_type_mismatch() {
        // `Value::U32` only ever holds a `u32`, so a negative host value
        // cannot reach the unsigned encode path at all; the nearest a host
        // can get is a signed `Value` variant paired with an unsigned
        // descriptor, which is a shape mismatch rather than a sign check.
        let err = encode_value(
            &mut Vec::new(),
            &Value::I32(-1),
            &Descriptor::U32,
            &Options::fixed(),
            &Registry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::TypeMismatch { .. }));
    }

    #[test]
    fn trailing_bytes_are_untouched_concatenation_property() {
        let registry = Registry::new();
        let mut out = Vec::new();
        encode_value(&mut out, &Value::U8(255), &Descriptor::U8, &Options::fixed(), &registry)
            .unwrap();
        out.extend_from_slice(b"tail");
        let (v, rest) =
            decode_value(&out, &Descriptor::U8, &Options::fixed(), &registry).unwrap();
        assert_eq!(v, Value::U8(255));
        assert_eq!(rest, b"tail");
    }
}
