//! Property schema to target type mapping

use crate::config::TargetNames;
use crate::resolver::{TypeHandle, TypeResolver};
use schemata_model::{PropertySchema, PropertyType};
use std::collections::BTreeSet;

/// How generated setters compare old and new values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    /// Ordinal string comparison
    Ordinal,
    /// `==` on primitives and enums
    Operator,
    /// `Equals(a, b)` for everything else
    Object,
}

/// A mapped target type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Type name as written in generated code, nullable marker included
    pub name: String,
    pub is_value_type: bool,
    pub equality: Equality,
    /// Handle of the referenced definition, when the schema names one
    pub handle: Option<TypeHandle>,
    /// Namespaces the type needs
    pub imports: BTreeSet<String>,
}

impl MappedType {
    fn new(name: impl Into<String>, is_value_type: bool, equality: Equality) -> Self {
        Self {
            name: name.into(),
            is_value_type,
            equality,
            handle: None,
            imports: BTreeSet::new(),
        }
    }

    fn import(mut self, namespace: &str) -> Self {
        if !namespace.is_empty() {
            self.imports.insert(namespace.to_string());
        }
        self
    }

    fn nullable_if(mut self, nullable: bool) -> Self {
        if nullable && self.is_value_type && !self.name.ends_with('?') {
            self.name.push('?');
        }
        self
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_value_type || self.name.ends_with('?')
    }

    /// Type name without the nullable marker
    pub fn bare_name(&self) -> &str {
        self.name.trim_end_matches('?')
    }

    pub fn is_enum(&self) -> bool {
        self.handle.as_ref().is_some_and(TypeHandle::is_enum)
    }
}

/// Maps property schemas to target type names.
///
/// `nullable_default` is used when the schema carries no explicit nullability.
/// Model properties pass `!required`, operation parameters pass `true`.
pub struct TypeMapper<'a> {
    names: &'a TargetNames,
}

impl<'a> TypeMapper<'a> {
    pub fn new(names: &'a TargetNames) -> Self {
        Self { names }
    }

    pub fn map(
        &self,
        schema: &PropertySchema,
        container: &str,
        nullable_default: bool,
        resolver: &mut dyn TypeResolver,
    ) -> MappedType {
        let nullable = schema.nullable.unwrap_or(nullable_default);
        let names = self.names;

        match schema.kind {
            PropertyType::Integer | PropertyType::Number | PropertyType::String
                if schema.is_enum =>
            {
                self.map_object(schema, nullable, resolver)
            }
            PropertyType::Integer => {
                let name = if schema.format_is("int64") {
                    &names.int64
                } else {
                    &names.int32
                };
                MappedType::new(name, true, Equality::Operator).nullable_if(nullable)
            }
            PropertyType::Boolean => {
                MappedType::new(&names.boolean, true, Equality::Operator).nullable_if(nullable)
            }
            PropertyType::Number => {
                let name = schema.format.as_deref().unwrap_or(&names.decimal);
                MappedType::new(name, true, Equality::Operator).nullable_if(nullable)
            }
            PropertyType::String => match schema.format.as_deref() {
                Some("byte") => MappedType::new(&names.bytes, false, Equality::Object),
                Some("binary") => self.stream(),
                Some("date") | Some("date-time") => {
                    MappedType::new(&names.date_time, true, Equality::Operator)
                        .import("System")
                        .nullable_if(nullable)
                }
                _ => MappedType::new(&names.string, false, Equality::Ordinal),
            },
            PropertyType::Array => {
                let item = match schema.item.as_deref() {
                    Some(item) => self.map(item, &names.list, false, resolver),
                    None => MappedType::new(&names.any, false, Equality::Object),
                };
                let mut mapped = MappedType::new(
                    format!("{}<{}>", container, item.name),
                    false,
                    Equality::Object,
                );
                mapped.imports = item.imports;
                if container == names.list {
                    mapped.imports.insert("System.Collections.Generic".to_string());
                }
                mapped
            }
            PropertyType::File => self.stream(),
            PropertyType::Object | PropertyType::None => self.map_object(schema, nullable, resolver),
        }
    }

    fn stream(&self) -> MappedType {
        MappedType::new(&self.names.stream, false, Equality::Object).import("System.IO")
    }

    fn map_object(
        &self,
        schema: &PropertySchema,
        nullable: bool,
        resolver: &mut dyn TypeResolver,
    ) -> MappedType {
        let Some(reference) = schema.reference.as_deref() else {
            if is_file_wrapper(schema) {
                return MappedType::new(&self.names.any, false, Equality::Object);
            }
            return MappedType::new(&self.names.string, false, Equality::Ordinal);
        };

        let resolution = resolver.resolve(reference);
        let Some(handle) = resolution.handle.or_else(|| resolver.planned(reference)) else {
            tracing::debug!(reference, "Unresolved reference mapped to string");
            return MappedType::new(&self.names.string, false, Equality::Ordinal);
        };

        let equality = if handle.is_enum() {
            Equality::Operator
        } else {
            Equality::Object
        };
        // Enum-typed properties are only nullable when the schema says so
        let nullable = if schema.is_enum {
            schema.nullable == Some(true)
        } else {
            nullable
        };

        let mut mapped = MappedType::new(&handle.name, handle.is_value_type(), equality)
            .import(&handle.namespace)
            .nullable_if(nullable);
        mapped.handle = Some(handle);
        mapped
    }
}

/// Nameless object whose only property is a file
fn is_file_wrapper(schema: &PropertySchema) -> bool {
    schema.properties.len() == 1
        && schema
            .properties
            .values()
            .all(|p| p.kind == PropertyType::File || p.format_is("binary"))
}

/// Numeric type names: the configured integer and decimal names, plus the
/// ones a `number` format can spell out directly
pub(crate) fn is_numeric(names: &TargetNames, name: &str) -> bool {
    name == names.int32
        || name == names.int64
        || name == names.decimal
        || matches!(name, "short" | "byte" | "double" | "float")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeKind;
    use crate::resolver::{Origin, Resolution};

    /// Resolver with a fixed set of known definitions
    struct Fixed(Vec<TypeHandle>);

    impl TypeResolver for Fixed {
        fn resolve(&mut self, name: &str) -> Resolution {
            Resolution {
                newly_resolved: false,
                handle: self.0.iter().find(|h| h.name == name).cloned(),
            }
        }

        fn planned(&self, _name: &str) -> Option<TypeHandle> {
            None
        }
    }

    fn resolver() -> Fixed {
        Fixed(vec![
            TypeHandle {
                name: "Customer".into(),
                namespace: "Shop.Models".into(),
                kind: TypeKind::Class,
                origin: Origin::Generated,
            },
            TypeHandle {
                name: "Status".into(),
                namespace: "Shop.Models".into(),
                kind: TypeKind::Enum,
                origin: Origin::Generated,
            },
        ])
    }

    fn map(schema: &PropertySchema, nullable_default: bool) -> MappedType {
        let names = TargetNames::default();
        TypeMapper::new(&names).map(schema, "List", nullable_default, &mut resolver())
    }

    #[test]
    fn test_primitives() {
        assert_eq!(map(&PropertySchema::integer(), false).name, "int");
        assert_eq!(map(&PropertySchema::integer().format("int64"), true).name, "long?");
        assert_eq!(map(&PropertySchema::of(PropertyType::Boolean), false).name, "bool");
        assert_eq!(map(&PropertySchema::of(PropertyType::Number), false).name, "decimal");
        assert_eq!(
            map(&PropertySchema::of(PropertyType::Number).format("double"), true).name,
            "double?"
        );
        assert_eq!(map(&PropertySchema::string(), true).name, "string");
    }

    #[test]
    fn test_explicit_nullability_wins() {
        let schema = PropertySchema::integer().nullable(false);
        assert_eq!(map(&schema, true).name, "int");
        let schema = PropertySchema::integer().nullable(true);
        assert_eq!(map(&schema, false).name, "int?");
    }

    #[test]
    fn test_string_formats() {
        let bytes = map(&PropertySchema::string().format("byte"), true);
        assert_eq!(bytes.name, "byte[]");
        assert!(!bytes.is_value_type);

        let stream = map(&PropertySchema::string().format("binary"), true);
        assert_eq!(stream.name, "Stream");
        assert!(stream.imports.contains("System.IO"));

        let date = map(&PropertySchema::string().format("date-time"), true);
        assert_eq!(date.name, "DateTime?");
        assert!(date.imports.contains("System"));
    }

    #[test]
    fn test_arrays() {
        let list = map(&PropertySchema::array_of(PropertySchema::string()), true);
        assert_eq!(list.name, "List<string>");
        assert!(list.imports.contains("System.Collections.Generic"));

        let names = TargetNames::default();
        let tracked = TypeMapper::new(&names).map(
            &PropertySchema::array_of(PropertySchema::reference_to("Customer")),
            "ReferenceList",
            true,
            &mut resolver(),
        );
        assert_eq!(tracked.name, "ReferenceList<Customer>");
        assert!(!tracked.imports.contains("System.Collections.Generic"));
        assert!(tracked.imports.contains("Shop.Models"));
    }

    #[test]
    fn test_references() {
        let customer = map(&PropertySchema::reference_to("Customer"), true);
        assert_eq!(customer.name, "Customer");
        assert_eq!(customer.equality, Equality::Object);

        let unknown = map(&PropertySchema::reference_to("Missing"), true);
        assert_eq!(unknown.name, "string");
    }

    #[test]
    fn test_enum_nullability_is_explicit_only() {
        let mut status = PropertySchema::string().enumeration();
        status.reference = Some("Status".into());
        assert_eq!(map(&status, true).name, "Status");

        let status = status.nullable(true);
        let mapped = map(&status, false);
        assert_eq!(mapped.name, "Status?");
        assert!(mapped.is_enum());
    }

    #[test]
    fn test_inline_file_wrapper() {
        let mut wrapper = PropertySchema::of(PropertyType::Object);
        wrapper
            .properties
            .insert("file".into(), PropertySchema::of(PropertyType::File));
        assert_eq!(map(&wrapper, true).name, "object");
        assert_eq!(map(&PropertySchema::of(PropertyType::Object), true).name, "string");
    }
}
