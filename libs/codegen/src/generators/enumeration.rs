//! Enumeration units

use super::{render_unit, unit_dependencies, write_summary};
use crate::config::GeneratorConfig;
use crate::naming::{pascal_identifier, string_literal};
use crate::sink::{GeneratedUnit, UnitKind};
use schemata_model::SchemaDefinition;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Member identifiers of an enumeration definition, in declaration order.
///
/// Names come from `x-enumNames` when present, otherwise from the values.
/// Collisions get the member index appended.
pub fn member_identifiers(definition: &SchemaDefinition) -> Vec<String> {
    let mut seen = HashSet::new();
    definition
        .enum_value_names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut ident = pascal_identifier(name).unwrap_or_else(|_| format!("Value{}", i));
            if !seen.insert(ident.clone()) {
                ident = format!("{}{}", ident, i);
                seen.insert(ident.clone());
            }
            ident
        })
        .collect()
}

/// Wire value of each member, when it differs from the identifier
fn member_aliases(definition: &SchemaDefinition, identifiers: &[String]) -> Vec<Option<String>> {
    let declared = &definition.extensions.enum_members;
    if !declared.is_empty() && declared.len() == identifiers.len() {
        return declared.iter().cloned().map(Some).collect();
    }

    definition
        .enum_values
        .iter()
        .zip(identifiers)
        .map(|(value, ident)| match &value.0 {
            Value::String(text) if text != ident => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn synthesize_enumeration(
    config: &GeneratorConfig,
    definition: &SchemaDefinition,
    type_name: &str,
) -> GeneratedUnit {
    let identifiers = member_identifiers(definition);
    let aliases = member_aliases(definition, &identifiers);
    let flags = definition.extensions.flags;
    let integral = !definition.enum_values.is_empty()
        && definition.enum_values.iter().all(|v| v.as_i64().is_some());

    let mut imports = BTreeSet::new();
    if flags {
        imports.insert("System".to_string());
    }
    if aliases.iter().any(Option::is_some) {
        imports.insert("System.Runtime.Serialization".to_string());
    }
    let dependencies = unit_dependencies(config, &imports);

    let source = render_unit(config, &dependencies, |w| {
        write_summary(w, config, definition.description.as_deref());
        if flags {
            w.line("[Flags]");
        }
        w.open(format!("public enum {}", type_name));

        for (i, ident) in identifiers.iter().enumerate() {
            if let Some(alias) = &aliases[i] {
                w.line(format!("[EnumMember(Value = {})]", string_literal(alias)));
            }
            let value = if integral {
                definition.enum_values[i].as_i64().map(|n| n.to_string())
            } else if flags {
                Some((1u64 << i.min(63)).to_string())
            } else {
                None
            };
            match value {
                Some(value) => w.line(format!("{} = {},", ident, value)),
                None => w.line(format!("{},", ident)),
            };
        }

        w.close();
    });

    GeneratedUnit::new(type_name, UnitKind::Enumeration, source, dependencies)
}
