#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! A type-descriptor-driven codec for the Bincode binary wire format.
//!
//! This crate provides a recursive encoder/decoder for structured values
//! whose shape is described at run time by a [`Descriptor`], rather than by
//! a static Rust type. Given a value and a descriptor, [`encode`] produces
//! the Bincode-compatible byte sequence the reference implementation would;
//! given bytes and the same descriptor, [`decode`] reconstructs the value
//! and returns any trailing bytes.
//!
//! User-defined struct/enum schemas are declared once, at startup, in a
//! [`Registry`]; descriptors reference them by name through
//! [`Descriptor::UserRef`]. A [`Codec`] bundles a registry with default
//! [`Options`] for repeated use.
//!
//! For the time being, all APIs operate on complete in-memory buffers; there
//! is no streaming/incremental decode.

pub mod codec;
pub mod composite;
pub mod descriptor;
pub mod error;
pub mod length;
pub mod options;
pub mod primitive;
pub mod registry;
pub mod value;
pub mod varint;

pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use options::Options;
pub use registry::{Definition, EnumDef, Registry, StructDef};
pub use value::Value;

/// Encodes `value` at descriptor `ty` under `options`, returning the wire
/// image or an error (§4.7 Public façade, non-raising form).
pub fn encode(value: &Value, ty: &Descriptor, options: &Options) -> Result<Vec<u8>> {
    encode_with_registry(value, ty, options, &Registry::new())
}

/// As [`encode`], but resolves `UserRef` descriptors against `registry`.
pub fn encode_with_registry(
    value: &Value,
    ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<Vec<u8>> {
    tracing::trace!(descriptor = ?ty, "encoding value");
    let mut out = Vec::new();
    codec::encode_value(&mut out, value, ty, options, registry)?;
    Ok(out)
}

/// As [`encode`], but panics on error instead of returning a `Result`
/// (§4.7 Public façade, strict form).
pub fn encode_strict(value: &Value, ty: &Descriptor, options: &Options) -> Vec<u8> {
    encode(value, ty, options).expect("encode_strict: encoding failed")
}

/// Decodes a value at descriptor `ty` from the front of `bytes`, returning
/// the value and any trailing bytes, or an error.
pub fn decode<'a>(
    bytes: &'a [u8],
    ty: &Descriptor,
    options: &Options,
) -> Result<(Value, &'a [u8])> {
    decode_with_registry(bytes, ty, options, &Registry::new())
}

/// As [`decode`], but resolves `UserRef` descriptors against `registry`.
pub fn decode_with_registry<'a>(
    bytes: &'a [u8],
    ty: &Descriptor,
    options: &Options,
    registry: &Registry,
) -> Result<(Value, &'a [u8])> {
    tracing::trace!(descriptor = ?ty, "decoding value");
    codec::decode_value(bytes, ty, options, registry)
}

/// As [`decode`], but panics on error instead of returning a `Result`.
pub fn decode_strict<'a>(bytes: &'a [u8], ty: &Descriptor, options: &Options) -> (Value, &'a [u8]) {
    decode(bytes, ty, options).expect("decode_strict: decoding failed")
}

/// A registry of user-defined types bundled with default codec settings,
/// for hosts that declare their schemas once at startup and then encode or
/// decode named types repeatedly (§4.7 Codec handle).
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Registry,
    options: Options,
}

impl Default for Codec {
    fn default() -> Self {
        Codec {
            registry: Registry::new(),
            options: Options::default(),
        }
    }
}

impl Codec {
    /// Creates a codec with an empty registry and default (fixed-width)
    /// options.
    pub fn new() -> Self {
        Codec::default()
    }

    /// Creates a codec with an empty registry and the given options.
    pub fn with_options(options: Options) -> Self {
        Codec {
            registry: Registry::new(),
            options,
        }
    }

    /// Grants mutable access to the underlying registry, so the host can
    /// call `register_struct`/`register_enum` on it.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The options this codec applies by default.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Encodes `value` against `ty`, resolving any `UserRef` against this
    /// codec's registry.
    pub fn encode(&self, value: &Value, ty: &Descriptor) -> Result<Vec<u8>> {
        encode_with_registry(value, ty, &self.options, &self.registry)
    }

    /// Decodes a value at `ty` from `bytes`, resolving any `UserRef`
    /// against this codec's registry.
    pub fn decode<'a>(&self, bytes: &'a [u8], ty: &Descriptor) -> Result<(Value, &'a [u8])> {
        decode_with_registry(bytes, ty, &self.options, &self.registry)
    }

    /// Encodes a value of a registered type, named `type_name`, using the
    /// `UserRef(type_name)` descriptor as a thin adapter over [`Codec::encode`]
    /// (§4.7: "Each user-defined type name also exposes its own encode/decode
    /// pair bound to its descriptor").
    pub fn encode_named(&self, type_name: &str, value: &Value) -> Result<Vec<u8>> {
        self.encode(value, &Descriptor::user_ref(type_name))
    }

    /// Decodes a value of a registered type, named `type_name`, from `bytes`.
    pub fn decode_named<'a>(
        &self,
        type_name: &str,
        bytes: &'a [u8],
    ) -> Result<(Value, &'a [u8])> {
        self.decode(bytes, &Descriptor::user_ref(type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_u8() {
        let bytes = encode(&Value::U8(255), &Descriptor::U8, &Options::fixed()).unwrap();
        assert_eq!(bytes, vec![255]);
    }

    #[test]
    fn scenario_2_u64_default() {
        let bytes = encode(&Value::U64(12), &Descriptor::U64, &Options::fixed()).unwrap();
        assert_eq!(bytes, vec![12, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn scenario_3_u64_varint() {
        let bytes = encode(&Value::U64(12), &Descriptor::U64, &Options::varint()).unwrap();
        assert_eq!(bytes, vec![12]);
    }

    #[test]
    fn scenario_4_u16_varint() {
        let bytes = encode(&Value::U16(34561), &Descriptor::U16, &Options::varint()).unwrap();
        assert_eq!(bytes, vec![251, 0x01, 0x87]);
    }

    #[test]
    fn scenario_5_str_default() {
        let bytes = encode(
            &Value::Str(b"Bincode".to_vec()),
            &Descriptor::Str,
            &Options::fixed(),
        )
        .unwrap();
        assert_eq!(
            bytes,
            vec![7, 0, 0, 0, 0, 0, 0, 0, 66, 105, 110, 99, 111, 100, 101]
        );
    }

    #[test]
    fn scenario_6_tuple_default() {
        let bytes = encode(
            &Value::Tup(smallvec::smallvec![Value::U16(144), Value::Bool(false)]),
            &Descriptor::Tup(vec![Descriptor::U16, Descriptor::Bool]),
            &Options::fixed(),
        )
        .unwrap();
        assert_eq!(bytes, vec![144, 0, 0]);
    }

    #[test]
    fn scenario_7_seq_default() {
        let bytes = encode(
            &Value::Seq(vec![
                Value::U8(1),
                Value::U8(2),
                Value::U8(3),
                Value::U8(4),
            ]),
            &Descriptor::seq(Descriptor::U8),
            &Options::fixed(),
        )
        .unwrap();
        assert_eq!(bytes, vec![4, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn scenario_8_map_default() {
        let bytes = encode(
            &Value::Map(vec![(
                Value::Str(b"some string key".to_vec()),
                Value::U64(429876423428),
            )]),
            &Descriptor::map(Descriptor::Str, Descriptor::U64),
            &Options::fixed(),
        )
        .unwrap();
        let mut expected = vec![1, 0, 0, 0, 0, 0, 0, 0, 15, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(b"some string key");
        expected.extend_from_slice(&429876423428u64.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn round_trip_preserves_value_across_primitives_and_composites() {
        let ty = Descriptor::Tup(vec![
            Descriptor::Bool,
            Descriptor::seq(Descriptor::I32),
            Descriptor::opt(Descriptor::Str),
            Descriptor::map(Descriptor::U8, Descriptor::F64),
        ]);
        let value = Value::Tup(smallvec::smallvec![
            Value::Bool(true),
            Value::Seq(vec![Value::I32(-1), Value::I32(2)]),
            Value::Opt(Some(Box::new(Value::Str(b"hi".to_vec())))),
            Value::Map(vec![(Value::U8(9), Value::F64(2.5))]),
        ]);
        for options in [Options::fixed(), Options::varint()] {
            let bytes = encode(&value, &ty, &options).unwrap();
            let (decoded, rest) = decode(&bytes, &ty, &options).unwrap();
            assert!(rest.is_empty());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn concatenation_property_leaves_suffix_untouched() {
        let bytes = encode(&Value::Bool(true), &Descriptor::Bool, &Options::fixed()).unwrap();
        let mut with_suffix = bytes.clone();
        with_suffix.extend_from_slice(&[9, 9, 9]);
        let (value, rest) = decode(&with_suffix, &Descriptor::Bool, &Options::fixed()).unwrap();
        assert_eq!(value, Value::Bool(true));
        assert_eq!(rest, &[9, 9, 9]);
    }

    #[test]
    fn strict_api_panics_on_error() {
        let result = std::panic::catch_unwind(|| {
            decode_strict(&[], &Descriptor::U32, &Options::fixed());
        });
        assert!(result.is_err());
    }

    #[test]
    fn codec_named_helpers_round_trip_through_registry() {
        let mut codec = Codec::new();
        codec.registry_mut().register_struct(
            "Point",
            vec![
                ("x".to_string(), Descriptor::I32),
                ("y".to_string(), Descriptor::I32),
            ],
        );
        let value = Value::Struct {
            name: "Point".to_string(),
            fields: vec![
                ("x".to_string(), Value::I32(3)),
                ("y".to_string(), Value::I32(-7)),
            ],
        };
        let bytes = codec.encode_named("Point", &value).unwrap();
        let (decoded, rest) = codec.decode_named("Point", &bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, value);
    }

    #[test]
    fn unregistered_type_name_fails_with_unknown_type() {
        let codec = Codec::new();
        let err = codec
            .encode_named("Nope", &Value::U8(1))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownType { .. }));
    }
}
