//! Schema document types and structural queries

use crate::extensions::Extensions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Root of a parsed schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Document title (`info.title`)
    pub title: Option<String>,
    /// Named definitions in declaration order
    pub definitions: IndexMap<String, SchemaDefinition>,
    /// Operations in document order
    pub operations: Vec<OperationDescriptor>,
}

impl SchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a definition, keyed by its name
    pub fn add_definition(&mut self, definition: SchemaDefinition) {
        self.definitions
            .insert(definition.name.clone(), definition);
    }

    /// Get a definition by name
    pub fn definition(&self, name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(name)
    }

    /// Iterate over all definitions in declaration order
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.definitions.values()
    }

    /// Parent definition of `definition`, if it declares one that exists.
    pub fn parent(&self, definition: &SchemaDefinition) -> Option<&SchemaDefinition> {
        definition
            .inherited
            .as_deref()
            .and_then(|name| self.definition(name))
    }

    /// The definition itself followed by its parents, root last.
    ///
    /// Stops at a missing parent or when a name repeats.
    pub fn ancestors<'a>(&'a self, definition: &'a SchemaDefinition) -> Ancestors<'a> {
        Ancestors {
            document: self,
            next: Some(definition),
            seen: HashSet::new(),
        }
    }

    /// Look up an extension on the definition, climbing to parents until one
    /// declares it. The nearest declaring ancestor wins.
    ///
    /// Returns the selected value and the definition that declares it.
    pub fn lookup_extension<'a, T>(
        &'a self,
        definition: &'a SchemaDefinition,
        select: impl Fn(&'a Extensions) -> Option<T>,
    ) -> Option<(T, &'a SchemaDefinition)> {
        self.ancestors(definition)
            .find_map(|def| select(&def.extensions).map(|value| (value, def)))
    }

    /// Find a declared property by name on the definition or its parents.
    pub fn find_property<'a>(
        &'a self,
        definition: &'a SchemaDefinition,
        name: &str,
    ) -> Option<(NamedProperty<'a>, &'a SchemaDefinition)> {
        self.ancestors(definition)
            .find_map(|def| def.property(name).map(|prop| (prop, def)))
    }

    /// Primary-key property named by the nearest `x-id`, with the definition
    /// that declares the property.
    pub fn primary_key<'a>(
        &'a self,
        definition: &'a SchemaDefinition,
    ) -> Option<(NamedProperty<'a>, &'a SchemaDefinition)> {
        let (key, declaring) = self.lookup_extension(definition, |ext| ext.id.as_deref())?;
        self.find_property(declaring, key)
    }

    /// Type-discriminator property named by the nearest `x-type`.
    pub fn type_key<'a>(
        &'a self,
        definition: &'a SchemaDefinition,
    ) -> Option<(NamedProperty<'a>, &'a SchemaDefinition)> {
        let (key, declaring) =
            self.lookup_extension(definition, |ext| ext.type_key.as_deref())?;
        self.find_property(declaring, key)
    }

    /// Non-zero discriminator value from the nearest `x-type-id`.
    pub fn type_id(&self, definition: &SchemaDefinition) -> Option<i64> {
        self.lookup_extension(definition, Extensions::type_id)
            .map(|(id, _)| id)
    }

    /// Whether the definition declares `x-id` itself.
    pub fn is_local_primary_key(&self, definition: &SchemaDefinition) -> bool {
        definition.extensions.id.is_some() && self.primary_key(definition).is_some()
    }

    /// Whether any parent (excluding the definition itself) declares `x-id`.
    pub fn has_inherited_local_key(&self, definition: &SchemaDefinition) -> bool {
        self.ancestors(definition)
            .skip(1)
            .any(|def| def.extensions.id.is_some())
    }

    /// Definition named by a property's reference, if it exists.
    pub fn referenced_definition(&self, schema: &PropertySchema) -> Option<&SchemaDefinition> {
        schema
            .reference
            .as_deref()
            .and_then(|name| self.definition(name))
    }
}

/// Iterator over a definition and its parents.
pub struct Ancestors<'a> {
    document: &'a SchemaDocument,
    next: Option<&'a SchemaDefinition>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a SchemaDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.seen.insert(current.name.as_str()) {
            return None;
        }
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Kind of named definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionKind {
    #[default]
    Object,
    Enumeration,
}

/// One named type of the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Key of the definition in the document
    pub name: String,
    pub kind: DefinitionKind,
    pub description: Option<String>,
    /// Declared properties, in declaration order
    pub properties: IndexMap<String, PropertySchema>,
    /// Parent definition name (first parent wins)
    pub inherited: Option<String>,
    /// Declared values of an enumeration
    pub enum_values: Vec<EnumValue>,
    pub extensions: Extensions,
}

impl SchemaDefinition {
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn enumeration(name: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            kind: DefinitionKind::Enumeration,
            enum_values: values.into_iter().map(EnumValue).collect(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.inherited = Some(parent.into());
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn is_enumeration(&self) -> bool {
        self.kind == DefinitionKind::Enumeration
    }

    /// Declared property by name
    pub fn property(&self, name: &str) -> Option<NamedProperty<'_>> {
        self.properties
            .get_key_value(name)
            .map(|(name, schema)| NamedProperty { name, schema })
    }

    /// Declared properties in order
    pub fn named_properties(&self) -> impl Iterator<Item = NamedProperty<'_>> {
        self.properties
            .iter()
            .map(|(name, schema)| NamedProperty { name, schema })
    }

    /// The property whose `x-id` names `key`, i.e. the object-valued half of
    /// a key/reference pair.
    pub fn property_identified_by(&self, key: &str) -> Option<NamedProperty<'_>> {
        self.named_properties()
            .find(|prop| prop.schema.extensions.id.as_deref() == Some(key))
    }

    /// Member names of an enumeration: `x-enumNames` when it covers every
    /// value, otherwise the raw values.
    pub fn enum_value_names(&self) -> Vec<String> {
        if !self.extensions.enum_names.is_empty()
            && self.extensions.enum_names.len() == self.enum_values.len()
        {
            self.extensions.enum_names.clone()
        } else {
            self.enum_values.iter().map(EnumValue::as_text).collect()
        }
    }
}

/// Borrowed property together with its declared name
#[derive(Debug, Clone, Copy)]
pub struct NamedProperty<'a> {
    pub name: &'a str,
    pub schema: &'a PropertySchema,
}

/// One declared enumeration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue(pub Value);

impl EnumValue {
    /// Value as text (strings unquoted)
    pub fn as_text(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

/// Primitive kind of a property schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Integer,
    Boolean,
    Number,
    String,
    Array,
    Object,
    File,
    #[default]
    None,
}

impl PropertyType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "integer" => PropertyType::Integer,
            "boolean" => PropertyType::Boolean,
            "number" => PropertyType::Number,
            "string" => PropertyType::String,
            "array" => PropertyType::Array,
            "object" => PropertyType::Object,
            "file" => PropertyType::File,
            _ => PropertyType::None,
        }
    }
}

/// Attribute of a definition, array element, parameter or response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub kind: PropertyType,
    pub format: Option<String>,
    /// Explicit nullability; `None` inherits the caller default
    pub nullable: Option<bool>,
    /// Element schema, present for arrays
    pub item: Option<Box<PropertySchema>>,
    /// Name of the referenced definition
    pub reference: Option<String>,
    /// Enumeration-typed (inline values or a referenced enumeration)
    pub is_enum: bool,
    /// Inline enumeration values
    pub enum_values: Vec<EnumValue>,
    /// Inline object properties (anonymous objects only)
    pub properties: IndexMap<String, PropertySchema>,
    pub required: bool,
    pub max_length: Option<u64>,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub extensions: Extensions,
}

impl PropertySchema {
    pub fn of(kind: PropertyType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of(PropertyType::String)
    }

    pub fn integer() -> Self {
        Self::of(PropertyType::Integer)
    }

    /// Array of `item`
    pub fn array_of(item: PropertySchema) -> Self {
        Self {
            kind: PropertyType::Array,
            item: Some(Box::new(item)),
            ..Self::default()
        }
    }

    /// Object property referencing a named definition
    pub fn reference_to(name: impl Into<String>) -> Self {
        Self {
            kind: PropertyType::Object,
            reference: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn enumeration(mut self) -> Self {
        self.is_enum = true;
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn is_array(&self) -> bool {
        self.kind == PropertyType::Array
    }

    /// Array carrying `x-ref-key`: a relationship collection
    pub fn is_reference_collection(&self) -> bool {
        self.is_array() && self.extensions.ref_key.is_some()
    }

    pub fn format_is(&self, format: &str) -> bool {
        self.format.as_deref() == Some(format)
    }
}

/// HTTP verb of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    /// Lower-case key used in path items
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }

    /// Capitalized verb name ("Get", "Post", ...)
    pub fn pascal_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Put => "Put",
            HttpMethod::Post => "Post",
            HttpMethod::Delete => "Delete",
            HttpMethod::Options => "Options",
            HttpMethod::Head => "Head",
            HttpMethod::Patch => "Patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Where an operation parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "body" => Some(ParameterLocation::Body),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

/// One operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub schema: PropertySchema,
    pub required: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation, schema: PropertySchema) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParameterLocation::Path,
            schema,
        }
    }
}

/// One (path, method) pair of the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Path template with `{name}` placeholders
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Schema of the 200-class response
    pub response: Option<PropertySchema>,
    pub tags: Vec<String>,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            operation_id: None,
            summary: None,
            parameters: Vec::new(),
            response: None,
            tags: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_response(mut self, response: PropertySchema) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Grouping hint: the first tag
    pub fn tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn body_parameter(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn returns_list(&self) -> bool {
        self.response.as_ref().is_some_and(PropertySchema::is_array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(def: SchemaDefinition, key: &str) -> SchemaDefinition {
        let mut ext = Extensions::default();
        ext.id = Some(key.to_string());
        def.with_extensions(ext)
    }

    fn chain() -> SchemaDocument {
        let mut doc = SchemaDocument::new();
        doc.add_definition(with_id(
            SchemaDefinition::object("A").with_property("code", PropertySchema::string()),
            "code",
        ));
        doc.add_definition(
            SchemaDefinition::object("B")
                .with_parent("A")
                .with_property("name", PropertySchema::string()),
        );
        doc.add_definition(
            SchemaDefinition::object("C")
                .with_parent("B")
                .with_property("total", PropertySchema::integer()),
        );
        doc
    }

    #[test]
    fn test_primary_key_walks_to_root() {
        let doc = chain();
        let c = doc.definition("C").unwrap();

        let (key, owner) = doc.primary_key(c).unwrap();
        assert_eq!(key.name, "code");
        assert_eq!(owner.name, "A");
        assert!(!doc.is_local_primary_key(c));
        assert!(doc.is_local_primary_key(doc.definition("A").unwrap()));
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let mut doc = chain();
        let b = doc.definitions.get_mut("B").unwrap();
        b.extensions.id = Some("name".into());

        let c = doc.definition("C").unwrap();
        let (key, owner) = doc.primary_key(c).unwrap();
        assert_eq!(key.name, "name");
        assert_eq!(owner.name, "B");
    }

    #[test]
    fn test_ancestors_stop_on_cycle() {
        let mut doc = SchemaDocument::new();
        doc.add_definition(SchemaDefinition::object("X").with_parent("Y"));
        doc.add_definition(SchemaDefinition::object("Y").with_parent("X"));

        let x = doc.definition("X").unwrap();
        let names: Vec<_> = doc.ancestors(x).map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert!(doc.primary_key(x).is_none());
    }

    #[test]
    fn test_missing_parent_ends_walk() {
        let mut doc = SchemaDocument::new();
        doc.add_definition(SchemaDefinition::object("Orphan").with_parent("Gone"));

        let orphan = doc.definition("Orphan").unwrap();
        assert_eq!(doc.ancestors(orphan).count(), 1);
        assert!(doc.parent(orphan).is_none());
    }

    #[test]
    fn test_property_identified_by() {
        let mut ext = Extensions::default();
        ext.id = Some("orderId".into());
        let def = SchemaDefinition::object("LineItem")
            .with_property("orderId", PropertySchema::integer())
            .with_property("order", PropertySchema::reference_to("Order").with_extensions(ext));

        let prop = def.property_identified_by("orderId").unwrap();
        assert_eq!(prop.name, "order");
        assert!(def.property_identified_by("order").is_none());
    }

    #[test]
    fn test_http_method_names() {
        assert_eq!(HttpMethod::from_name("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::Patch.pascal_name(), "Patch");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::from_name("trace"), None);
    }
}
