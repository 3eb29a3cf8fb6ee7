//! The dynamic, descriptor-shaped host value representation (§3 Host value
//! model). Since the codec dispatches on a runtime [`Descriptor`], not a
//! static Rust type, values flowing through it are represented the same way:
//! one case per descriptor shape.
//!
//! [`Descriptor`]: crate::descriptor::Descriptor

use smallvec::SmallVec;

/// Storage for `Tup` components. Tuples are bounded by `max_tuple_size`
/// (12 by default, §6), so most fit inline without a heap allocation —
/// the same trade-off the teacher's core crate makes for its bounded
/// primitive-value collections.
pub type TupleValues = SmallVec<[Value; 8]>;

/// A host value, shaped to match exactly one [`Descriptor`](crate::descriptor::Descriptor) case.
#[derive(Debug, Clone)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    F32(f32),
    F64(f64),
    Bool(bool),
    /// UTF-8-agnostic byte string (§3).
    Str(Vec<u8>),
    Opt(Option<Box<Value>>),
    Seq(Vec<Value>),
    /// Ordered `(key, value)` pairs; insertion order is emission order (§4.4).
    Map(Vec<(Value, Value)>),
    /// Insertion-deduplicated, so structural equality holds regardless of
    /// the order elements were inserted in (§9 Open Questions).
    Set(Vec<Value>),
    Tup(TupleValues),
    /// A value of a registered struct type.
    Struct {
        name: String,
        fields: Vec<(String, Value)>,
    },
    /// A value of a registered enum type.
    Enum {
        name: String,
        variant: String,
        fields: Vec<(String, Value)>,
    },
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (U8(a), U8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (U128(a), U128(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (I128(a), I128(b)) => a == b,
            (F32(a), F32(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Opt(a), Opt(b)) => a == b,
            (Seq(a), Seq(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            // Structural, order-independent equality (§9 Open Questions):
            // two sets are equal when every element of one occurs in the
            // other, regardless of insertion order.
            (Set(a), Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Tup(a), Tup(b)) => a == b,
            (
                Struct {
                    name: n1,
                    fields: f1,
                },
                Struct {
                    name: n2,
                    fields: f2,
                },
            ) => n1 == n2 && f1 == f2,
            (
                Enum {
                    name: n1,
                    variant: v1,
                    fields: f1,
                },
                Enum {
                    name: n2,
                    variant: v2,
                    fields: f2,
                },
            ) => n1 == n2 && v1 == v2 && f1 == f2,
            _ => false,
        }
    }
}

impl Value {
    /// A human-readable summary of this value's shape, for error messages
    /// that must not echo potentially sensitive payload data (§4.6).
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::U128(_) => "U128",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::I128(_) => "I128",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::Bool(_) => "Bool",
            Value::Str(_) => "Str",
            Value::Opt(_) => "Opt",
            Value::Seq(_) => "Seq",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
            Value::Tup(_) => "Tup",
            Value::Struct { .. } => "Struct",
            Value::Enum { .. } => "Enum",
        }
    }

    /// Builds a `Set` from an iterator, collapsing duplicates by structural
    /// equality and keeping first-seen order (§4.4, §9).
    pub fn set_from_iter(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(dedup_first_seen(items))
    }

    /// Builds a `Map` from `(key, value)` pairs; a later pair with an
    /// equal key replaces an earlier one (§3 Invariants, decode semantics).
    pub fn map_from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Map(dedup_last_write_wins(pairs))
    }
}

/// Collapses an iterator of values to first-seen order by structural
/// equality (§4.4, §9 Open Questions). Shared by [`Value::set_from_iter`]
/// and `composite::decode_set`, so `Set` values built from either a host
/// iterable or a decoded wire sequence collapse duplicates the same way.
pub(crate) fn dedup_first_seen(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Collapses `(key, value)` pairs by key, later pairs winning, keeping each
/// key's first-seen position (§3 Invariants). Shared by
/// [`Value::map_from_pairs`] and `composite::decode_map`.
pub(crate) fn dedup_last_write_wins(
    pairs: impl IntoIterator<Item = (Value, Value)>,
) -> Vec<(Value, Value)> {
    let mut out: Vec<(Value, Value)> = Vec::new();
    for (k, v) in pairs {
        if let Some(slot) = out.iter_mut().find(|(existing, _)| *existing == k) {
            slot.1 = v;
        } else {
            out.push((k, v));
        }
    }
    out
}
