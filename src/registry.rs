//! Schema registry (§4.5): declarative definitions of user-defined product
//! types (structs) and sum types (enums), resolved by name at codec time.

use std::collections::HashMap;

use crate::descriptor::Descriptor;
use crate::error::{self, Result};

/// A product type: an ordered list of `(field_name, field_descriptor)`.
/// Wire image is the concatenation of fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub fields: Vec<(String, Descriptor)>,
}

impl StructDef {
    pub fn new(fields: Vec<(String, Descriptor)>) -> Self {
        StructDef { fields }
    }
}

/// A sum type: an ordered list of `(variant_name, struct_body)`. The i-th
/// variant carries an implicit discriminant of `i` (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub variants: Vec<(String, StructDef)>,
}

impl EnumDef {
    pub fn new(variants: Vec<(String, StructDef)>) -> Self {
        EnumDef { variants }
    }

    /// Looks up a variant by its zero-based declaration index.
    pub fn variant_at(&self, index: usize) -> Option<&(String, StructDef)> {
        self.variants.get(index)
    }

    /// Looks up a variant's declaration index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|(n, _)| n == name)
    }
}

/// A named schema entry: either a struct or an enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Struct(StructDef),
    Enum(EnumDef),
}

/// The write-once, read-many table of user-defined type declarations (§4.5,
/// §5). Forward references are permitted: `register_struct`/`register_enum`
/// accept `Descriptor::UserRef` fields naming types that have not been
/// registered yet, since resolution happens by name at codec time rather
/// than at registration time.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<String, Definition>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers a struct type under `name`, returning the `UserRef`
    /// descriptor bound to it (§9 Design Notes, option (a): an opaque
    /// registry handle — here, simply the registered name).
    pub fn register_struct(
        &mut self,
        name: impl Into<String>,
        fields: Vec<(String, Descriptor)>,
    ) -> Descriptor {
        let name = name.into();
        self.definitions
            .insert(name.clone(), Definition::Struct(StructDef::new(fields)));
        Descriptor::UserRef(name)
    }

    /// Registers an enum type under `name`, returning the `UserRef`
    /// descriptor bound to it.
    pub fn register_enum(
        &mut self,
        name: impl Into<String>,
        variants: Vec<(String, Vec<(String, Descriptor)>)>,
    ) -> Descriptor {
        let name = name.into();
        let variants = variants
            .into_iter()
            .map(|(variant_name, fields)| (variant_name, StructDef::new(fields)))
            .collect();
        self.definitions
            .insert(name.clone(), Definition::Enum(EnumDef::new(variants)));
        Descriptor::UserRef(name)
    }

    /// Resolves a registered name to its definition, failing with
    /// [`crate::error::Error::UnknownType`] if `name` was never registered.
    pub fn resolve(&self, name: &str) -> Result<&Definition> {
        self.definitions.get(name).ok_or_else(|| {
            tracing::debug!(type_name = name, "UserRef resolution failed: no such registered type");
            error::UnknownTypeSnafu { name }.build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve_struct() {
        let mut registry = Registry::new();
        let r#ref = registry.register_struct(
            "Point",
            vec![
                ("x".to_string(), Descriptor::I32),
                ("y".to_string(), Descriptor::I32),
            ],
        );
        assert_eq!(r#ref, Descriptor::UserRef("Point".to_string()));
        let def = registry.resolve("Point").unwrap();
        assert!(matches!(def, Definition::Struct(_)));
    }

    #[test]
    fn forward_reference_resolves_once_registered() {
        let mut registry = Registry::new();
        // `Node` refers to itself before being (re)registered -- legal,
        // since resolution happens at codec time, not registration time.
        registry.register_struct(
            "Node",
            vec![
                ("value".to_string(), Descriptor::I32),
                (
                    "next".to_string(),
                    Descriptor::opt(Descriptor::user_ref("Node")),
                ),
            ],
        );
        assert!(registry.resolve("Node").is_ok());
    }

    #[test]
    fn unknown_type_fails() {
        let registry = Registry::new();
        let err = registry.resolve("Nope").unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownType { .. }));
    }

    #[test]
    fn enum_variant_lookup_by_index_and_name() {
        let def = EnumDef::new(vec![
            ("A".to_string(), StructDef::new(vec![])),
            ("B".to_string(), StructDef::new(vec![])),
        ]);
        assert_eq!(def.variant_at(1).unwrap().0, "B");
        assert_eq!(def.index_of("B"), Some(1));
        assert_eq!(def.index_of("Z"), None);
    }
}
