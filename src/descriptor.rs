//! The type-descriptor grammar (§3): a structural value naming a type, used
//! to drive the dispatcher instead of Rust's own type system.

/// A compositional type descriptor.
///
/// Descriptors are ordinary data — typically built once at startup and
/// reused across many `encode`/`decode` calls (§3 Lifecycles).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    Bool,
    Str,
    Opt(Box<Descriptor>),
    Seq(Box<Descriptor>),
    Map(Box<Descriptor>, Box<Descriptor>),
    Set(Box<Descriptor>),
    Tup(Vec<Descriptor>),
    /// A reference to a named entry in the [`crate::registry::Registry`].
    UserRef(String),
}

impl Descriptor {
    /// Convenience constructor for [`Descriptor::Opt`].
    pub fn opt(inner: Descriptor) -> Self {
        Descriptor::Opt(Box::new(inner))
    }

    /// Convenience constructor for [`Descriptor::Seq`].
    pub fn seq(inner: Descriptor) -> Self {
        Descriptor::Seq(Box::new(inner))
    }

    /// Convenience constructor for [`Descriptor::Map`].
    pub fn map(key: Descriptor, value: Descriptor) -> Self {
        Descriptor::Map(Box::new(key), Box::new(value))
    }

    /// Convenience constructor for [`Descriptor::Set`].
    pub fn set(inner: Descriptor) -> Self {
        Descriptor::Set(Box::new(inner))
    }

    /// Convenience constructor for [`Descriptor::UserRef`].
    pub fn user_ref(name: impl Into<String>) -> Self {
        Descriptor::UserRef(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_descriptor_equality() {
        let a = Descriptor::seq(Descriptor::opt(Descriptor::U32));
        let b = Descriptor::seq(Descriptor::opt(Descriptor::U32));
        assert_eq!(a, b);
    }
}
