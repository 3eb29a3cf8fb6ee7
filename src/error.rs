//! Crate-level error types.

use crate::descriptor::Descriptor;
use snafu::Snafu;

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// The main data type for errors raised while encoding or decoding a value.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Raised when a host value does not match the shape demanded by a descriptor.
    #[snafu(display("value `{value:?}` does not match descriptor {descriptor:?}"))]
    TypeMismatch { value: String, descriptor: Descriptor },

    /// Raised when decoding runs out of input bytes.
    #[snafu(display("truncated input: needed {needed} bytes, only {available} available"))]
    TruncatedInput { needed: usize, available: usize },

    /// Raised when a boolean byte is neither `0x00` nor `0x01`.
    #[snafu(display("invalid boolean byte 0x{byte:02x}"))]
    InvalidBool { byte: u8 },

    /// Raised when an option tag byte is neither `0x00` nor `0x01`.
    #[snafu(display("invalid option tag byte 0x{byte:02x}"))]
    InvalidOption { byte: u8 },

    /// Raised when a varint's leading byte is outside the recognized tag set.
    #[snafu(display("invalid varint leading byte 0x{byte:02x}"))]
    InvalidVarint { byte: u8 },

    /// Raised when a tuple or struct has the wrong number of components.
    #[snafu(display("arity mismatch: expected {expected}, found {actual}"))]
    ArityMismatch { expected: usize, actual: usize },

    /// Raised when a value's shape does not match the registered struct/enum it targets.
    #[snafu(display("value does not match schema for `{type_name}`: {reason}"))]
    SchemaMismatch { type_name: String, reason: String },

    /// Raised when an enum discriminant does not name a declared variant.
    #[snafu(display("unknown variant discriminant {discriminant} for enum `{type_name}`"))]
    UnknownVariant { type_name: String, discriminant: u64 },

    /// Raised when a `UserRef` names a type that was never registered.
    #[snafu(display("unknown user-defined type `{name}`"))]
    UnknownType { name: String },

    /// Raised when a tuple descriptor exceeds the configured `max_tuple_size`.
    #[snafu(display("tuple arity {arity} exceeds configured max_tuple_size {max}"))]
    TupleTooLarge { arity: usize, max: usize },
}
