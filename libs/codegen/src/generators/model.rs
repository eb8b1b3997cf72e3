//! Model classes for object definitions
//!
//! A model is a partial class deriving from the runtime's synchronized item
//! base (or from the model generated for its parent definition). Every
//! property is backed by a private field and raises change notifications
//! when written. Definitions with a primary key also implement the key
//! capability interface.

use super::enumeration::{member_identifiers, synthesize_enumeration};
use super::{render_unit, unit_dependencies, write_summary};
use crate::catalog::TypeShape;
use crate::config::{GeneratorConfig, TargetNames};
use crate::error::{Error, Result};
use crate::manifest::{KeyInfo, ModelManifest, ReferenceField};
use crate::mapper::{is_numeric, Equality, MappedType, TypeMapper};
use crate::naming::{field_name, pascal_identifier, string_literal};
use crate::resolver::{TypeHandle, TypeResolver};
use crate::sink::{GeneratedUnit, UnitKind};
use crate::writer::CodeWriter;
use indexmap::IndexMap;
use schemata_model::{NamedProperty, PropertySchema, SchemaDefinition, SchemaDocument};
use serde_json::Value;
use std::collections::BTreeSet;

const DATA_ANNOTATIONS: &str = "System.ComponentModel.DataAnnotations";
const JSON_SERIALIZATION: &str = "System.Text.Json.Serialization";

/// A generated model together with what it publishes
#[derive(Debug)]
pub struct SynthesizedModel {
    pub handle: TypeHandle,
    pub unit: GeneratedUnit,
    pub manifest: ModelManifest,
}

/// Primary key of the definition being generated
struct KeyPlan {
    info: KeyInfo,
    mapped: MappedType,
    /// The definition declares `x-id` itself
    local: bool,
    /// The key property is declared on the definition itself
    declared_here: bool,
    /// An ancestor already implements the key capability
    inherited_capability: bool,
}

struct PropertyPlan {
    accessor: String,
    field: String,
    mapped: MappedType,
    description: Option<String>,
    attributes: Vec<String>,
    /// Primary-key accessor, overridable by subtypes
    is_key: bool,
    default: Option<String>,
    reference_field: bool,
    /// Statement keeping the identity property in sync with this object
    identity: Option<String>,
    /// Object-valued properties to re-resolve when this identity changes
    resolves: Vec<ReverseReference>,
}

/// `_customer` re-resolved from `CustomerId`
struct ReverseReference {
    field: String,
    accessor: String,
    target_type: String,
    target_key: String,
}

struct ModelPlan {
    base: String,
    interfaces: Vec<String>,
    imports: BTreeSet<String>,
    properties: Vec<PropertyPlan>,
    key: Option<KeyPlan>,
    type_assignment: Option<String>,
    type_key: Option<String>,
    type_id: Option<i64>,
    reference_fields: Vec<ReferenceField>,
    accessors: IndexMap<String, String>,
}

pub struct ModelSynthesizer<'a> {
    document: &'a SchemaDocument,
    config: &'a GeneratorConfig,
    mapper: TypeMapper<'a>,
}

impl<'a> ModelSynthesizer<'a> {
    pub fn new(document: &'a SchemaDocument, config: &'a GeneratorConfig) -> Self {
        Self {
            document,
            config,
            mapper: TypeMapper::new(&config.names),
        }
    }

    pub fn synthesize(
        &self,
        definition: &SchemaDefinition,
        resolver: &mut dyn TypeResolver,
    ) -> Result<SynthesizedModel> {
        let handle = TypeHandle::planned(definition, self.config)?;

        if definition.is_enumeration() {
            let unit = synthesize_enumeration(self.config, definition, &handle.name);
            let manifest = ModelManifest {
                definition: definition.name.clone(),
                handle: handle.clone(),
                is_enumeration: true,
                accessors: IndexMap::new(),
                key: None,
                type_key: None,
                type_id: None,
                reference_fields: Vec::new(),
            };
            return Ok(SynthesizedModel {
                handle,
                unit,
                manifest,
            });
        }

        let plan = self.plan(definition, &handle, resolver)?;
        let unit = self.render(definition, &handle, &plan);
        let manifest = ModelManifest {
            definition: definition.name.clone(),
            handle: handle.clone(),
            is_enumeration: false,
            accessors: plan.accessors,
            key: plan.key.map(|k| k.info),
            type_key: plan.type_key,
            type_id: plan.type_id,
            reference_fields: plan.reference_fields,
        };

        Ok(SynthesizedModel {
            handle,
            unit,
            manifest,
        })
    }

    /// Manifest for a definition satisfied by an external type. Accessors
    /// follow the candidate's property names where they match.
    pub fn external_manifest(
        &self,
        definition: &SchemaDefinition,
        handle: TypeHandle,
        shape: &TypeShape,
        resolver: &mut dyn TypeResolver,
    ) -> ModelManifest {
        let mut accessors = IndexMap::new();
        for owner in self.lineage(definition) {
            for prop in owner.named_properties() {
                let derived = pascal_identifier(prop.name).unwrap_or_else(|_| prop.name.to_string());
                let accessor = if shape.properties.contains(&derived) {
                    derived
                } else if shape.properties.iter().any(|p| p == prop.name) {
                    prop.name.to_string()
                } else {
                    derived
                };
                accessors.insert(prop.name.to_string(), accessor);
            }
        }

        let key = self.document.primary_key(definition).map(|(prop, _)| {
            let mapped = self.map_property(prop.schema, resolver);
            KeyInfo {
                property: prop.name.to_string(),
                accessor: accessors
                    .get(prop.name)
                    .cloned()
                    .unwrap_or_else(|| prop.name.to_string()),
                type_name: mapped.name,
                is_value_type: mapped.is_value_type,
            }
        });
        let type_key = self
            .document
            .type_key(definition)
            .and_then(|(prop, _)| accessors.get(prop.name).cloned());

        ModelManifest {
            definition: definition.name.clone(),
            is_enumeration: definition.is_enumeration(),
            handle,
            accessors,
            key,
            type_key,
            type_id: self.document.type_id(definition),
            reference_fields: Vec::new(),
        }
    }

    /// Ancestors root first, the definition itself last
    fn lineage<'d>(&'d self, definition: &'d SchemaDefinition) -> Vec<&'d SchemaDefinition> {
        let mut chain: Vec<_> = self.document.ancestors(definition).collect();
        chain.reverse();
        chain
    }

    fn map_property(&self, schema: &PropertySchema, resolver: &mut dyn TypeResolver) -> MappedType {
        self.mapper
            .map(schema, &self.config.names.list, !schema.required, resolver)
    }

    /// Accessor a property gets on the model generated for `owner`
    fn accessor_name(&self, owner: &SchemaDefinition, property: &str) -> Result<String> {
        let accessor = pascal_identifier(property)?;
        if accessor == pascal_identifier(&owner.name)? {
            Ok(format!("{}Value", accessor))
        } else {
            Ok(accessor)
        }
    }

    /// Accessor of a property found on the definition or its ancestors
    fn inherited_accessor(&self, definition: &SchemaDefinition, property: &str) -> Result<Option<String>> {
        match self.document.find_property(definition, property) {
            Some((prop, owner)) => self.accessor_name(owner, prop.name).map(Some),
            None => Ok(None),
        }
    }

    fn plan(
        &self,
        definition: &SchemaDefinition,
        handle: &TypeHandle,
        resolver: &mut dyn TypeResolver,
    ) -> Result<ModelPlan> {
        let names = &self.config.names;
        let document = self.document;

        let mut imports = BTreeSet::new();
        imports.insert("System".to_string());

        let base = match definition.inherited.as_deref() {
            Some(parent) if document.definition(parent).is_some() => {
                let resolution = resolver.resolve(parent);
                match resolution.handle.or_else(|| resolver.planned(parent)) {
                    Some(parent) => {
                        imports.insert(parent.namespace.clone());
                        parent.name
                    }
                    None => {
                        imports.insert(self.config.runtime_namespace.clone());
                        names.model_base.clone()
                    }
                }
            }
            _ => {
                imports.insert(self.config.runtime_namespace.clone());
                names.model_base.clone()
            }
        };

        let mut accessors = IndexMap::new();
        for owner in self.lineage(definition) {
            for prop in owner.named_properties() {
                accessors.insert(prop.name.to_string(), self.accessor_name(owner, prop.name)?);
            }
        }

        let key = match document.primary_key(definition) {
            Some((prop, owner)) => {
                let mapped = self.map_property(prop.schema, resolver);
                Some(KeyPlan {
                    info: KeyInfo {
                        property: prop.name.to_string(),
                        accessor: self.accessor_name(owner, prop.name)?,
                        type_name: mapped.name.clone(),
                        is_value_type: mapped.is_value_type,
                    },
                    mapped,
                    local: document.is_local_primary_key(definition),
                    declared_here: owner.name == definition.name,
                    inherited_capability: document.has_inherited_local_key(definition),
                })
            }
            None => None,
        };

        let mut interfaces = Vec::new();
        if key.as_ref().is_some_and(|k| k.local && !k.inherited_capability) {
            imports.insert(self.config.runtime_namespace.clone());
            interfaces.push(names.primary_key_interface.clone());
        }

        let type_key = document.type_key(definition);
        let type_id = document.type_id(definition);
        let type_assignment = match (&type_key, type_id) {
            (Some((prop, owner)), Some(id)) => {
                let mapped = self.map_property(prop.schema, resolver);
                let value = if mapped.is_enum() {
                    format!("({}){}", mapped.bare_name(), id)
                } else {
                    id.to_string()
                };
                Some(format!("{} = {};", self.accessor_name(owner, prop.name)?, value))
            }
            _ => None,
        };
        let type_key_name = type_key.map(|(prop, _)| prop.name.to_string());
        let type_key_accessor = match &type_key_name {
            Some(name) => self.inherited_accessor(definition, name)?,
            None => None,
        };

        let type_name = &handle.name;
        let mut seen: IndexMap<String, String> = IndexMap::new();
        let mut properties = Vec::new();
        let mut reference_fields = Vec::new();

        for prop in definition.named_properties() {
            let accessor = self.accessor_name(definition, prop.name)?;
            if let Some(first) = seen.insert(accessor.clone(), prop.name.to_string()) {
                return Err(Error::DuplicateAccessor {
                    definition: definition.name.clone(),
                    accessor,
                    first,
                    second: prop.name.to_string(),
                });
            }

            let (mapped, reference_field) = if prop.schema.is_reference_collection() {
                let (field, mapped) =
                    self.reference_field(definition, type_name, prop, &accessor, resolver)?;
                reference_fields.push(field);
                (mapped, true)
            } else {
                (self.map_property(prop.schema, resolver), false)
            };
            imports.extend(mapped.imports.iter().cloned());
            if reference_field {
                imports.insert(self.config.runtime_namespace.clone());
            }

            let key_like = |name: &str| {
                key.as_ref().is_some_and(|k| k.info.property == name)
                    || type_key_name.as_deref() == Some(name)
            };
            let attributes = self.validation_attributes(
                definition,
                type_name,
                prop,
                &accessor,
                key_like(prop.name)
                    || prop.schema.extensions.id.as_deref().is_some_and(key_like),
            );
            if !attributes.is_empty() {
                imports.insert(DATA_ANNOTATIONS.to_string());
            }

            let default = if reference_field {
                None
            } else if prop.schema.is_array() {
                Some(format!("new {}()", mapped.name))
            } else {
                self.default_literal(definition, prop, &mapped)?
            };

            properties.push(PropertyPlan {
                field: field_name(accessor.trim_start_matches('@')),
                is_key: self.is_key_property(definition, prop.name),
                identity: self.identity_assignment(definition, prop, &mapped, resolver)?,
                resolves: Vec::new(),
                description: prop.schema.description.clone(),
                accessor,
                mapped,
                attributes,
                default,
                reference_field,
            });
        }

        // Identity properties re-resolve the objects that name them
        for index in 0..properties.len() {
            let Some(prop) = definition.named_properties().nth(index) else {
                continue;
            };
            let Some(target) = prop.schema.extensions.id.as_deref() else {
                continue;
            };
            let Some(target_index) = definition.properties.get_index_of(target) else {
                continue;
            };
            if target_index == index {
                continue;
            }
            let Some(reverse) = self.reverse_reference(prop, &properties[index]) else {
                continue;
            };
            properties[target_index].resolves.push(reverse);
        }

        if key.as_ref().is_some_and(|k| k.local) {
            imports.insert(JSON_SERIALIZATION.to_string());
        }

        Ok(ModelPlan {
            base,
            interfaces,
            imports,
            properties,
            key,
            type_assignment,
            type_key: type_key_accessor,
            type_id,
            reference_fields,
            accessors,
        })
    }

    /// Whether the property is the primary key of its definition or of any
    /// definition deriving from it. Subtypes may override such accessors.
    fn is_key_property(&self, definition: &SchemaDefinition, property: &str) -> bool {
        self.document.definitions().any(|def| {
            self.document
                .primary_key(def)
                .is_some_and(|(key, owner)| owner.name == definition.name && key.name == property)
        })
    }

    fn reference_field(
        &self,
        definition: &SchemaDefinition,
        type_name: &str,
        prop: NamedProperty<'_>,
        accessor: &str,
        resolver: &mut dyn TypeResolver,
    ) -> Result<(ReferenceField, MappedType)> {
        let invalid = |reason: String| Error::ReferenceKey {
            definition: definition.name.clone(),
            property: prop.name.to_string(),
            reason,
        };

        let foreign_key = prop
            .schema
            .extensions
            .ref_key
            .as_deref()
            .ok_or_else(|| invalid("missing x-ref-key".into()))?;
        let element = prop
            .schema
            .item
            .as_deref()
            .and_then(|item| item.reference.as_deref())
            .ok_or_else(|| invalid("items must reference a named definition".into()))?;
        let element_def = self
            .document
            .definition(element)
            .ok_or_else(|| invalid(format!("unknown element definition '{}'", element)))?;
        let (fk, fk_owner) = self
            .document
            .find_property(element_def, foreign_key)
            .ok_or_else(|| invalid(format!("{} has no property '{}'", element, foreign_key)))?;

        let fk_mapped = self.map_property(fk.schema, resolver);
        let back_reference = self
            .document
            .ancestors(element_def)
            .find_map(|def| def.property_identified_by(foreign_key).map(|p| (p, def)));
        let back_reference = match back_reference {
            Some((p, owner)) => Some(self.accessor_name(owner, p.name)?),
            None => None,
        };

        let mapped = self.mapper.map(
            prop.schema,
            &self.config.names.reference_list,
            !prop.schema.required,
            resolver,
        );
        let resolution = resolver.resolve(element);
        let element_type = match resolution.handle.or_else(|| resolver.planned(element)) {
            Some(handle) => handle.name,
            None => pascal_identifier(element)?,
        };

        let field = ReferenceField {
            owner: definition.name.clone(),
            owner_type: type_name.to_string(),
            property: prop.name.to_string(),
            accessor: accessor.to_string(),
            element: element.to_string(),
            element_type,
            foreign_key: foreign_key.to_string(),
            foreign_key_accessor: self.accessor_name(fk_owner, fk.name)?,
            foreign_key_type: fk_mapped.name,
            foreign_key_value_type: fk_mapped.is_value_type,
            back_reference,
        };
        Ok((field, mapped))
    }

    /// Required and max-length markers. A property naming another through
    /// `x-id` inherits that property's constraints.
    fn validation_attributes(
        &self,
        definition: &SchemaDefinition,
        type_name: &str,
        prop: NamedProperty<'_>,
        accessor: &str,
        key_like: bool,
    ) -> Vec<String> {
        let target = prop
            .schema
            .extensions
            .id
            .as_deref()
            .filter(|target| *target != prop.name)
            .and_then(|target| self.document.find_property(definition, target))
            .map(|(target, _)| target.schema);

        let required = prop.schema.required || target.is_some_and(|t| t.required);
        let max_length = prop.schema.max_length.or_else(|| target.and_then(|t| t.max_length));

        let mut attributes = Vec::new();
        if required {
            let message = if key_like {
                format!("{} is a key field of {} and must be specified", accessor, type_name)
            } else {
                format!("{} is required", accessor)
            };
            attributes.push(format!("[Required(ErrorMessage = {})]", string_literal(&message)));
        }
        if let Some(max) = max_length {
            let message = format!("{} exceeds the maximum length of {}", accessor, max);
            attributes.push(format!(
                "[MaxLength({}, ErrorMessage = {})]",
                max,
                string_literal(&message)
            ));
        }
        attributes
    }

    /// Target-language literal for a declared default
    fn default_literal(
        &self,
        definition: &SchemaDefinition,
        prop: NamedProperty<'_>,
        mapped: &MappedType,
    ) -> Result<Option<String>> {
        let Some(value) = prop.schema.default.as_ref().filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let names = &self.config.names;

        if mapped.is_enum() {
            let Some(enum_def) = self.document.referenced_definition(prop.schema) else {
                return Ok(None);
            };
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let identifiers = member_identifiers(enum_def);
            let index = enum_def
                .enum_values
                .iter()
                .position(|v| v.as_text() == text)
                .or_else(|| enum_def.enum_value_names().iter().position(|n| *n == text))
                .or_else(|| identifiers.iter().position(|i| *i == text));

            return match index {
                Some(i) => Ok(Some(format!("{}.{}", mapped.bare_name(), identifiers[i]))),
                None => Err(Error::UnknownEnumDefault {
                    definition: definition.name.clone(),
                    property: prop.name.to_string(),
                    enumeration: enum_def.name.clone(),
                    value: text,
                }),
            };
        }

        let bare = mapped.bare_name();
        let literal = match value {
            Value::Bool(b) if bare == names.boolean => b.to_string(),
            Value::String(s)
                if bare == names.boolean && (s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) =>
            {
                s.to_lowercase()
            }
            Value::String(s) if bare == names.string => string_literal(s),
            Value::String(s) if bare == names.date_time => {
                format!("DateTime.Parse({})", string_literal(s))
            }
            Value::Number(n) if bare == names.decimal => format!("{}m", n),
            Value::Number(n) if bare == "float" => format!("{}f", n),
            Value::Number(n) if is_numeric(names, bare) => n.to_string(),
            _ => {
                tracing::debug!(
                    definition = %definition.name,
                    property = prop.name,
                    "Ignoring default without a literal form"
                );
                return Ok(None);
            }
        };
        Ok(Some(literal))
    }

    /// `CustomerId = value?.Id ?? 0;` for an object property whose `x-id`
    /// names an identity property.
    fn identity_assignment(
        &self,
        definition: &SchemaDefinition,
        prop: NamedProperty<'_>,
        mapped: &MappedType,
        resolver: &mut dyn TypeResolver,
    ) -> Result<Option<String>> {
        let Some(target) = prop.schema.extensions.id.as_deref() else {
            return Ok(None);
        };
        if target == prop.name || mapped.is_value_type {
            return Ok(None);
        }
        let Some(target_key) = self.referenced_key_accessor(prop.schema)? else {
            return Ok(None);
        };
        let Some((target_prop, owner)) = self.document.find_property(definition, target) else {
            return Ok(None);
        };

        let target_accessor = self.accessor_name(owner, target_prop.name)?;
        let target_mapped = self.map_property(target_prop.schema, resolver);
        let fallback = if target_mapped.is_nullable() {
            String::new()
        } else if is_numeric(&self.config.names, target_mapped.bare_name()) {
            " ?? 0".to_string()
        } else {
            " ?? default".to_string()
        };

        Ok(Some(format!(
            "{} = value?.{}{};",
            target_accessor, target_key, fallback
        )))
    }

    fn reverse_reference(&self, prop: NamedProperty<'_>, plan: &PropertyPlan) -> Option<ReverseReference> {
        if plan.mapped.is_value_type || plan.mapped.handle.is_none() {
            return None;
        }
        let target_key = self.referenced_key_accessor(prop.schema).ok().flatten()?;
        Some(ReverseReference {
            field: plan.field.clone(),
            accessor: plan.accessor.clone(),
            target_type: plan.mapped.bare_name().to_string(),
            target_key,
        })
    }

    /// Key accessor of the definition a property references
    fn referenced_key_accessor(&self, schema: &PropertySchema) -> Result<Option<String>> {
        let Some(target) = self.document.referenced_definition(schema) else {
            return Ok(None);
        };
        match self.document.primary_key(target) {
            Some((key, owner)) => self.accessor_name(owner, key.name).map(Some),
            None => Ok(None),
        }
    }

    fn render(&self, definition: &SchemaDefinition, handle: &TypeHandle, plan: &ModelPlan) -> GeneratedUnit {
        let dependencies = unit_dependencies(self.config, &plan.imports);
        let type_name = &handle.name;

        let source = render_unit(self.config, &dependencies, |w| {
            write_summary(w, self.config, definition.description.as_deref());

            let mut header = format!("public partial class {} : {}", type_name, plan.base);
            for interface in &plan.interfaces {
                header.push_str(", ");
                header.push_str(interface);
            }
            w.open(header);

            for prop in &plan.properties {
                w.line(format!("private {} {};", prop.mapped.name, prop.field));
            }

            self.render_constructor(w, type_name, plan);

            for prop in &plan.properties {
                w.blank();
                render_accessor(w, self.config, prop);
            }

            if let Some(key) = &plan.key {
                if key.local {
                    w.blank();
                    render_identity(w, &self.config.names, key);
                } else if !key.declared_here && !plan.reference_fields.is_empty() {
                    w.blank();
                    render_key_override(w, key);
                }
            }

            w.close();
        });

        let kind = UnitKind::Model;
        GeneratedUnit::new(type_name.as_str(), kind, source, dependencies)
    }

    fn render_constructor(&self, w: &mut CodeWriter, type_name: &str, plan: &ModelPlan) {
        let reference_list = &self.config.names.reference_list;
        let mut body = Vec::new();

        if let Some(assignment) = &plan.type_assignment {
            body.push(assignment.clone());
        }
        for prop in plan.properties.iter().filter(|p| p.reference_field) {
            let element = prop
                .mapped
                .name
                .strip_prefix(reference_list.as_str())
                .unwrap_or(&prop.mapped.name);
            body.push(format!(
                "{} = new {}{}(this, nameof({}));",
                prop.field, reference_list, element, prop.accessor
            ));
        }
        for prop in &plan.properties {
            if let Some(default) = &prop.default {
                body.push(format!("{} = {};", prop.field, default));
            }
        }

        if body.is_empty() {
            return;
        }

        w.blank();
        w.open(format!("public {}()", type_name));
        for line in body {
            w.line(line);
        }
        w.close();
    }
}

fn equality_test(equality: Equality, left: &str, right: &str) -> String {
    match equality {
        Equality::Ordinal => format!("string.Equals({}, {}, StringComparison.Ordinal)", left, right),
        Equality::Operator => format!("{} == {}", left, right),
        Equality::Object => format!("Equals({}, {})", left, right),
    }
}

fn render_accessor(w: &mut CodeWriter, config: &GeneratorConfig, prop: &PropertyPlan) {
    write_summary(w, config, prop.description.as_deref());
    for attribute in &prop.attributes {
        w.line(attribute);
    }

    let modifier = if prop.is_key { "public virtual" } else { "public" };
    w.open(format!("{} {} {}", modifier, prop.mapped.name, prop.accessor));
    w.line(format!("get => {};", prop.field));
    w.open("set");

    w.line(format!("if ({})", equality_test(prop.mapped.equality, &prop.field, "value")));
    w.indent().line("return;").dedent();
    w.blank();
    w.line(format!("var oldValue = {};", prop.field));
    w.line(format!("{} = value;", prop.field));

    if let Some(identity) = &prop.identity {
        w.line(identity);
    }
    for reverse in &prop.resolves {
        w.open(format!("if ({}?.{} != value)", reverse.field, reverse.target_key));
        w.line(format!(
            "{} = ResolveReference<{}>(value);",
            reverse.field, reverse.target_type
        ));
        w.line(format!("OnPropertyChanged(nameof({}));", reverse.accessor));
        w.close();
    }

    w.line(format!(
        "OnPropertyChanged(nameof({}), oldValue, value);",
        prop.accessor
    ));
    w.close();
    w.close();
}

/// Key conversion from an untyped value
fn key_conversion(names: &TargetNames, key: &KeyPlan) -> String {
    let bare = key.mapped.bare_name();
    let converted = if bare == names.int32 {
        "Convert.ToInt32(value)".to_string()
    } else if bare == names.int64 {
        "Convert.ToInt64(value)".to_string()
    } else if bare == names.decimal {
        "Convert.ToDecimal(value)".to_string()
    } else if bare == "short" {
        "Convert.ToInt16(value)".to_string()
    } else {
        format!("({})value", bare)
    };

    if key.mapped.is_value_type && key.mapped.is_nullable() {
        format!("value == null ? ({})null : {}", key.mapped.name, converted)
    } else {
        converted
    }
}

fn render_identity(w: &mut CodeWriter, names: &TargetNames, key: &KeyPlan) {
    let accessor = &key.info.accessor;
    let modifier = if key.inherited_capability {
        "override"
    } else {
        "virtual"
    };

    w.line("[JsonIgnore]");
    w.open(format!("public {} object PrimaryKey", modifier));
    w.line(format!("get => {};", accessor));
    w.line(format!("set => {} = {};", accessor, key_conversion(names, key)));
    w.close();
    w.blank();

    let text = if key.mapped.is_value_type && !key.mapped.is_nullable() {
        format!("{}.ToString()", accessor)
    } else if key.mapped.bare_name() == names.string {
        format!("{} ?? string.Empty", accessor)
    } else {
        format!("{}?.ToString() ?? string.Empty", accessor)
    };
    w.line(format!("public override string ToString() => {};", text));
}

/// Subtype specialization of an inherited key accessor
fn render_key_override(w: &mut CodeWriter, key: &KeyPlan) {
    let accessor = &key.info.accessor;
    let inherited = format!("base.{}", accessor);

    w.open(format!("public override {} {}", key.mapped.name, accessor));
    w.line(format!("get => {};", inherited));
    w.open("set");
    w.line(format!("if ({})", equality_test(key.mapped.equality, &inherited, "value")));
    w.indent().line("return;").dedent();
    w.blank();
    w.line(format!("{} = value;", inherited));
    w.close();
    w.close();
}
