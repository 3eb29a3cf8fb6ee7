//! Encoding/decoding options threaded through every recursive call.

/// The default cap on `Tup` arity (§6 Configuration).
pub const DEFAULT_MAX_TUPLE_SIZE: usize = 12;

/// Settings consulted by the dispatcher (§4.6) and nowhere else.
///
/// `varint` toggles between fixed-width (`U64`/`U32`) and variable-length
/// encoding for every length prefix and enum discriminant (§4.3); `U8`/`I8`
/// values are never affected. `max_tuple_size` bounds the arity accepted by
/// `Tup` descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    /// When `true`, lengths and discriminants are varint-encoded.
    pub varint: bool,
    /// Upper bound on tuple arity, inclusive.
    pub max_tuple_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            varint: false,
            max_tuple_size: DEFAULT_MAX_TUPLE_SIZE,
        }
    }
}

impl Options {
    /// The default, fixed-width options record.
    pub fn fixed() -> Self {
        Options::default()
    }

    /// The default options record with `varint` enabled.
    pub fn varint() -> Self {
        Options {
            varint: true,
            ..Options::default()
        }
    }

    /// Returns a copy of these options with `max_tuple_size` overridden.
    pub fn with_max_tuple_size(self, max_tuple_size: usize) -> Self {
        Options {
            max_tuple_size,
            ..self
        }
    }
}
