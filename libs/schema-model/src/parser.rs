//! Parser for Swagger 2.0 and OpenAPI 3 documents
//!
//! Builds a [`SchemaDocument`] from the JSON form of the document. Only the
//! parts relevant to code synthesis are read: named schemas, their
//! properties and extensions, and the operations with their parameters and
//! success responses.

use crate::document::{
    DefinitionKind, EnumValue, HttpMethod, OperationDescriptor, Parameter, ParameterLocation,
    PropertySchema, PropertyType, SchemaDefinition, SchemaDocument,
};
use crate::error::{Error, Result};
use crate::extensions::Extensions;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

impl SchemaDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        parse_document(&root)
    }

    /// Read and parse a document from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Parse a Swagger 2.0 / OpenAPI 3 document
pub fn parse_document(root: &Value) -> Result<SchemaDocument> {
    let root_obj = root
        .as_object()
        .ok_or_else(|| Error::InvalidDocument("document root must be an object".into()))?;

    let schemas = root_obj.get("definitions").or_else(|| {
        root.pointer("/components/schemas")
    });
    let paths = root_obj.get("paths");

    if schemas.is_none() && paths.is_none() {
        return Err(Error::InvalidDocument(
            "document declares neither schemas nor paths".into(),
        ));
    }

    let mut document = SchemaDocument::new();
    document.title = root
        .pointer("/info/title")
        .and_then(Value::as_str)
        .map(String::from);

    if let Some(schemas) = schemas {
        let schemas = schemas
            .as_object()
            .ok_or_else(|| Error::InvalidDocument("schema definitions must be an object".into()))?;

        for (name, value) in schemas {
            let definition = parse_definition(name, value)?;
            document.add_definition(definition);
        }
    }

    if let Some(paths) = paths {
        let paths = paths
            .as_object()
            .ok_or_else(|| Error::InvalidDocument("'paths' must be an object".into()))?;

        for (path, item) in paths {
            parse_path_item(root, path, item, &mut document.operations)?;
        }
    }

    flag_enum_references(&mut document);

    tracing::debug!(
        definitions = document.definitions.len(),
        operations = document.operations.len(),
        "parsed schema document"
    );

    Ok(document)
}

/// Parse one named schema into a definition
fn parse_definition(name: &str, value: &Value) -> Result<SchemaDefinition> {
    let obj = value.as_object().ok_or_else(|| Error::InvalidSchema {
        name: name.to_string(),
        reason: "schema must be an object".into(),
    })?;

    let mut definition = SchemaDefinition::object(name);
    definition.description = string_field(obj, "description");
    definition.extensions = Extensions::from_object(obj);

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        definition.kind = DefinitionKind::Enumeration;
        definition.enum_values = values.iter().cloned().map(EnumValue).collect();
    }

    let mut required: Vec<String> = string_list(obj.get("required"));

    if let Some(parts) = obj.get("allOf").and_then(Value::as_array) {
        for part in parts {
            if let Some(parent) = ref_name(part) {
                if definition.inherited.is_none() {
                    definition.inherited = Some(parent);
                } else {
                    tracing::debug!(schema = name, ignored = %parent, "additional parent ignored");
                }
                continue;
            }

            if let Some(part_obj) = part.as_object() {
                definition
                    .properties
                    .extend(parse_properties(name, part_obj)?);
                required.extend(string_list(part_obj.get("required")));
            }
        }
    }

    definition.properties.extend(parse_properties(name, obj)?);

    for key in &required {
        if let Some(property) = definition.properties.get_mut(key) {
            property.required = true;
        }
    }

    Ok(definition)
}

fn parse_properties(owner: &str, obj: &Map<String, Value>) -> Result<IndexMap<String, PropertySchema>> {
    let mut properties = IndexMap::new();

    let Some(declared) = obj.get("properties").and_then(Value::as_object) else {
        return Ok(properties);
    };

    for (prop_name, value) in declared {
        let context = format!("{}.{}", owner, prop_name);
        properties.insert(prop_name.clone(), parse_property(&context, value)?);
    }

    Ok(properties)
}

/// Parse a property (or element, parameter, response) schema
fn parse_property(context: &str, value: &Value) -> Result<PropertySchema> {
    let obj = value.as_object().ok_or_else(|| Error::InvalidSchema {
        name: context.to_string(),
        reason: "property schema must be an object".into(),
    })?;

    let mut schema = PropertySchema::default();

    if let Some(reference) = ref_name(value) {
        schema.kind = PropertyType::Object;
        schema.reference = Some(reference);
    } else if let Some(alias) = alias_target(obj) {
        // Wrapper such as `allOf: [{$ref}]`, used to attach nullability or
        // docs to a reference. The referenced schema is the actual type.
        schema.kind = PropertyType::None;
        schema.reference = Some(alias);
    }

    match obj.get("type") {
        Some(Value::String(kind)) => schema.kind = PropertyType::from_name(kind),
        Some(Value::Array(kinds)) => {
            for kind in kinds.iter().filter_map(Value::as_str) {
                if kind == "null" {
                    schema.nullable = Some(true);
                } else {
                    schema.kind = PropertyType::from_name(kind);
                }
            }
        }
        _ => {}
    }

    schema.format = string_field(obj, "format");
    schema.description = string_field(obj, "description");
    schema.default = obj.get("default").cloned();
    schema.max_length = obj.get("maxLength").and_then(Value::as_u64);
    schema.extensions = Extensions::from_object(obj);

    if let Some(nullable) = obj
        .get("nullable")
        .or_else(|| obj.get("x-nullable"))
        .and_then(Value::as_bool)
    {
        schema.nullable = Some(nullable);
    }

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        schema.is_enum = true;
        schema.enum_values = values.iter().cloned().map(EnumValue).collect();
    }

    if schema.kind == PropertyType::Array {
        let items = obj.get("items").ok_or_else(|| Error::InvalidSchema {
            name: context.to_string(),
            reason: "array schema without 'items'".into(),
        })?;
        schema.item = Some(Box::new(parse_property(&format!("{}[]", context), items)?));
    }

    if schema.reference.is_none() {
        schema.properties = parse_properties(context, obj)?;
    }

    Ok(schema)
}

/// Target of a single-entry `allOf`/`oneOf`/`anyOf` reference wrapper
fn alias_target(obj: &Map<String, Value>) -> Option<String> {
    ["allOf", "oneOf", "anyOf"].iter().find_map(|key| {
        let parts = obj.get(*key)?.as_array()?;
        match parts.as_slice() {
            [single] => ref_name(single),
            _ => None,
        }
    })
}

fn parse_path_item(
    root: &Value,
    path: &str,
    item: &Value,
    operations: &mut Vec<OperationDescriptor>,
) -> Result<()> {
    let Some(item) = item.as_object() else {
        return Err(Error::InvalidDocument(format!("path item '{}' must be an object", path)));
    };

    let shared = match item.get("parameters") {
        Some(params) => parse_parameters(root, path, "*", params)?,
        None => Vec::new(),
    };

    for (key, value) in item {
        let Some(method) = HttpMethod::from_name(key) else {
            continue;
        };
        let operation = parse_operation(root, path, method, value, &shared)?;
        operations.push(operation);
    }

    Ok(())
}

fn parse_operation(
    root: &Value,
    path: &str,
    method: HttpMethod,
    value: &Value,
    shared: &[Parameter],
) -> Result<OperationDescriptor> {
    let obj = value.as_object().ok_or_else(|| Error::InvalidOperation {
        method: method.to_string(),
        path: path.to_string(),
        reason: "operation must be an object".into(),
    })?;

    let mut operation = OperationDescriptor::new(method, path);
    operation.operation_id = string_field(obj, "operationId");
    operation.summary = string_field(obj, "summary");
    operation.tags = string_list(obj.get("tags"));

    let own = match obj.get("parameters") {
        Some(params) => parse_parameters(root, path, method.as_str(), params)?,
        None => Vec::new(),
    };

    // Operation-level parameters override shared ones with the same name and location
    for param in shared {
        if !own
            .iter()
            .any(|p| p.name == param.name && p.location == param.location)
        {
            operation.parameters.push(param.clone());
        }
    }
    operation.parameters.extend(own);

    if let Some(body) = obj.get("requestBody") {
        let body = resolve(root, body);
        operation
            .parameters
            .extend(parse_request_body(path, method, body)?);
    }

    if let Some(responses) = obj.get("responses").and_then(Value::as_object) {
        operation.response = parse_success_response(root, path, method, responses)?;
    }

    Ok(operation)
}

fn parse_parameters(root: &Value, path: &str, method: &str, value: &Value) -> Result<Vec<Parameter>> {
    let Some(items) = value.as_array() else {
        return Err(Error::InvalidOperation {
            method: method.to_uppercase(),
            path: path.to_string(),
            reason: "'parameters' must be an array".into(),
        });
    };

    let mut parameters = Vec::new();

    for item in items {
        let item = resolve(root, item);
        let Some(obj) = item.as_object() else {
            continue;
        };

        let Some(name) = string_field(obj, "name") else {
            return Err(Error::InvalidOperation {
                method: method.to_uppercase(),
                path: path.to_string(),
                reason: "parameter without a name".into(),
            });
        };

        let Some(location) = obj
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParameterLocation::from_name)
        else {
            tracing::debug!(path, parameter = %name, "skipping parameter with unsupported location");
            continue;
        };

        let context = format!("{} {} parameter {}", method.to_uppercase(), path, name);
        // Swagger 2 declares the type inline except for body parameters
        let schema = match obj.get("schema") {
            Some(schema) => parse_property(&context, schema)?,
            None => parse_property(&context, item)?,
        };

        let mut parameter = Parameter::new(name, location, schema);
        parameter.required = location == ParameterLocation::Path
            || obj.get("required").and_then(Value::as_bool).unwrap_or(false);
        parameters.push(parameter);
    }

    Ok(parameters)
}

/// OpenAPI 3 `requestBody` as body or form-data parameters
fn parse_request_body(path: &str, method: HttpMethod, body: &Value) -> Result<Vec<Parameter>> {
    let Some(content) = body.get("content").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };
    let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
    let context = format!("{} {} body", method, path);

    if let Some(form) = content
        .get("multipart/form-data")
        .and_then(|media| media.get("schema"))
    {
        let schema = parse_property(&context, form)?;
        return Ok(schema
            .properties
            .into_iter()
            .map(|(name, schema)| {
                let mut parameter = Parameter::new(name, ParameterLocation::FormData, schema);
                parameter.required = required;
                parameter
            })
            .collect());
    }

    let Some(schema) = content.values().find_map(|media| media.get("schema")) else {
        return Ok(Vec::new());
    };

    let name = body
        .get("x-name")
        .and_then(Value::as_str)
        .unwrap_or("body");
    let mut parameter = Parameter::new(name, ParameterLocation::Body, parse_property(&context, schema)?);
    parameter.required = required;

    Ok(vec![parameter])
}

/// Schema of the first 2xx response, preferring 200 then 201
fn parse_success_response(
    root: &Value,
    path: &str,
    method: HttpMethod,
    responses: &Map<String, Value>,
) -> Result<Option<PropertySchema>> {
    let response = responses
        .get("200")
        .or_else(|| responses.get("201"))
        .or_else(|| {
            responses
                .iter()
                .find(|(code, _)| code.starts_with('2'))
                .map(|(_, value)| value)
        });

    let Some(response) = response.map(|r| resolve(root, r)) else {
        return Ok(None);
    };

    let schema = response.get("schema").or_else(|| {
        response
            .get("content")
            .and_then(Value::as_object)
            .and_then(|content| content.values().find_map(|media| media.get("schema")))
    });

    match schema {
        Some(schema) => {
            let context = format!("{} {} response", method, path);
            Ok(Some(parse_property(&context, schema)?))
        }
        None => Ok(None),
    }
}

/// Mark every property that references an enumeration definition
fn flag_enum_references(document: &mut SchemaDocument) {
    let enums: HashSet<String> = document
        .definitions()
        .filter(|def| def.is_enumeration())
        .map(|def| def.name.clone())
        .collect();

    if enums.is_empty() {
        return;
    }

    for definition in document.definitions.values_mut() {
        for property in definition.properties.values_mut() {
            flag_schema(property, &enums);
        }
    }

    for operation in &mut document.operations {
        for parameter in &mut operation.parameters {
            flag_schema(&mut parameter.schema, &enums);
        }
        if let Some(response) = operation.response.as_mut() {
            flag_schema(response, &enums);
        }
    }
}

fn flag_schema(schema: &mut PropertySchema, enums: &HashSet<String>) {
    if schema
        .reference
        .as_ref()
        .is_some_and(|name| enums.contains(name))
    {
        schema.is_enum = true;
    }
    if let Some(item) = schema.item.as_mut() {
        flag_schema(item, enums);
    }
    for property in schema.properties.values_mut() {
        flag_schema(property, enums);
    }
}

/// Follow a local `$ref` to its target, or return the value itself
fn resolve<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|pointer| pointer.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(value)
}

/// Extract the definition name from a `$ref`
/// E.g., "#/definitions/Customer" -> "Customer"
fn ref_name(value: &Value) -> Option<String> {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .map(|pointer| pointer.rsplit('/').next().unwrap_or(pointer).to_string())
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_name() {
        assert_eq!(
            ref_name(&json!({ "$ref": "#/definitions/Customer" })),
            Some("Customer".to_string())
        );
        assert_eq!(
            ref_name(&json!({ "$ref": "#/components/schemas/Order" })),
            Some("Order".to_string())
        );
        assert_eq!(ref_name(&json!({ "type": "string" })), None);
    }

    #[test]
    fn test_alias_wrapper_is_untyped_reference() {
        let schema = parse_property(
            "T.p",
            &json!({ "allOf": [{ "$ref": "#/definitions/Customer" }], "x-nullable": true }),
        )
        .unwrap();

        assert_eq!(schema.kind, PropertyType::None);
        assert_eq!(schema.reference.as_deref(), Some("Customer"));
        assert_eq!(schema.nullable, Some(true));
    }

    #[test]
    fn test_array_requires_items() {
        let err = parse_property("T.tags", &json!({ "type": "array" })).unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn test_type_list_with_null() {
        let schema = parse_property("T.p", &json!({ "type": ["integer", "null"] })).unwrap();
        assert_eq!(schema.kind, PropertyType::Integer);
        assert_eq!(schema.nullable, Some(true));
    }
}
