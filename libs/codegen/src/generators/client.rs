//! Client classes, one per operation group
//!
//! Clients are generated from published model manifests only. A group whose
//! name matches an object definition becomes a table client bound to that
//! model; any other group becomes a plain client.

use super::{render_unit, unit_dependencies, write_summary};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::manifest::{ModelManifest, ModelTable, ReferenceField};
use crate::mapper::TypeMapper;
use crate::naming::{camel_identifier, pascal_identifier, string_literal};
use crate::report::{GenerationReport, CLIENT_GENERATOR};
use crate::resolver::TableResolver;
use crate::sink::{GeneratedUnit, UnitKind};
use crate::writer::CodeWriter;
use indexmap::IndexMap;
use schemata_model::{OperationDescriptor, ParameterLocation, SchemaDocument};
use std::collections::{BTreeSet, HashSet};

/// Method names a table client's base type already declares as virtual
pub const LIFECYCLE_METHODS: [&str; 13] = [
    "Get",
    "Put",
    "Post",
    "Search",
    "Delete",
    "Copy",
    "GenerateId",
    "Merge",
    "GetItemLogs",
    "GetLogs",
    "RedoLog",
    "RemoveLog",
    "UndoLog",
];

/// Trailing parameter names every method declares
const RESERVED_PARAMETERS: [&str; 4] = ["list", "settings", "cancellationToken", "requestPath"];

fn is_path_parameter(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

fn sanitize(raw: &str) -> String {
    pascal_identifier(raw).unwrap_or_else(|_| "Default".to_string())
}

/// Client group of an operation: the first tag, else the first path segment
/// that is neither `api` nor a parameter, else the whole path.
pub fn group_name(operation: &OperationDescriptor) -> String {
    if let Some(tag) = operation.tag() {
        return sanitize(tag);
    }

    operation
        .path
        .split('/')
        .filter(|s| !s.is_empty())
        .find(|s| !s.eq_ignore_ascii_case("api") && !is_path_parameter(s))
        .map(sanitize)
        .unwrap_or_else(|| sanitize(&operation.path))
}

/// Method name of an operation within its group: the remaining path
/// segments joined, or the HTTP verb when none remain.
pub fn method_name(operation: &OperationDescriptor, group: &str) -> String {
    let name: String = operation
        .path
        .split('/')
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("api") && !is_path_parameter(s))
        .filter_map(|s| pascal_identifier(s).ok())
        .filter(|s| !s.eq_ignore_ascii_case(group))
        .collect();

    if name.is_empty() {
        operation.method.pascal_name().to_string()
    } else {
        name
    }
}

struct ParameterPlan {
    wire_name: String,
    ident: String,
    type_name: String,
    location: ParameterLocation,
}

struct MethodPlan<'o> {
    operation: &'o OperationDescriptor,
    name: String,
    return_type: String,
    parameters: Vec<ParameterPlan>,
    paged: bool,
    imports: BTreeSet<String>,
}

impl MethodPlan<'_> {
    fn signature(&self) -> (String, Vec<String>) {
        (
            self.name.clone(),
            self.parameters.iter().map(|p| p.type_name.clone()).collect(),
        )
    }
}

pub struct ClientSynthesizer<'a> {
    document: &'a SchemaDocument,
    config: &'a GeneratorConfig,
    models: &'a ModelTable,
    mapper: TypeMapper<'a>,
}

impl<'a> ClientSynthesizer<'a> {
    pub fn new(document: &'a SchemaDocument, config: &'a GeneratorConfig, models: &'a ModelTable) -> Self {
        Self {
            document,
            config,
            models,
            mapper: TypeMapper::new(&config.names),
        }
    }

    /// Operations by group, groups in order of first appearance
    pub fn groups(&self) -> IndexMap<String, Vec<&'a OperationDescriptor>> {
        let mut groups: IndexMap<String, Vec<&'a OperationDescriptor>> = IndexMap::new();
        for operation in &self.document.operations {
            groups.entry(group_name(operation)).or_default().push(operation);
        }
        groups
    }

    /// Model the group's table client is bound to
    fn entity(&self, group: &str) -> Option<&'a ModelManifest> {
        self.models
            .iter()
            .find(|m| !m.is_enumeration && (m.definition == group || m.type_name() == group))
    }

    /// Generate the client for one group. Operations that cannot be
    /// generated are reported and left out of the client.
    pub fn synthesize(
        &self,
        group: &str,
        operations: &[&OperationDescriptor],
        report: &mut GenerationReport,
    ) -> Result<GeneratedUnit> {
        let names = &self.config.names;
        let class_name = format!("{}Client", pascal_identifier(group)?);
        let entity = self.entity(group);

        let mut imports: BTreeSet<String> = [
            "System",
            "System.Net.Http",
            "System.Text",
            "System.Threading",
            "System.Threading.Tasks",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        imports.insert(self.config.runtime_namespace.clone());

        let mut methods = Vec::new();
        for operation in operations {
            match self.plan_method(operation, group) {
                Ok(plan) => methods.push(plan),
                Err(e) => {
                    let subject = format!("{} {}", operation.method, operation.path);
                    tracing::warn!(operation = %subject, "Skipping operation: {}", e);
                    report.failure(CLIENT_GENERATOR, &subject, &e);
                }
            }
        }

        let log_type = methods
            .iter()
            .find(|m| m.name == "GetItemLogs")
            .and_then(|m| m.operation.response.as_ref())
            .and_then(|response| response.item.as_deref())
            .map(|item| {
                let mapped = self.mapper.map(item, &names.list, false, &mut TableResolver::new(self.models));
                imports.extend(mapped.imports.iter().cloned());
                mapped.bare_name().to_string()
            });

        // Later duplicates of a signature are prefixed with their verb
        let mut signatures = HashSet::new();
        for method in &mut methods {
            if !signatures.insert(method.signature()) {
                method.name = format!("{}{}", method.operation.method.pascal_name(), method.name);
                let mut counter = 2;
                let base = method.name.clone();
                while !signatures.insert(method.signature()) {
                    method.name = format!("{}{}", base, counter);
                    counter += 1;
                }
            }
            imports.extend(method.imports.iter().cloned());
            if method
                .parameters
                .iter()
                .any(|p| p.location == ParameterLocation::Query)
            {
                imports.insert("System.Globalization".to_string());
            }
        }

        let reference_fields = match entity {
            Some(entity) => self.models.reference_fields_targeting(&entity.definition),
            None => Vec::new(),
        };
        if let Some(entity) = entity {
            imports.insert(entity.handle.namespace.clone());
        }
        if !reference_fields.is_empty() {
            imports.insert("System.Collections.Generic".to_string());
        }

        let dependencies = unit_dependencies(self.config, &imports);
        let source = render_unit(self.config, &dependencies, |w| {
            let base = match entity {
                Some(entity) => {
                    let key = entity
                        .key
                        .as_ref()
                        .map(|k| k.bare_type().to_string())
                        .unwrap_or_else(|| names.any.clone());
                    match &log_type {
                        Some(log) => format!(
                            "{}<{}, {}, {}>",
                            names.logged_client_base,
                            entity.type_name(),
                            key,
                            log
                        ),
                        None => format!("{}<{}, {}>", names.table_client_base, entity.type_name(), key),
                    }
                }
                None => names.client_base.clone(),
            };
            w.open(format!("public partial class {} : {}", class_name, base));

            self.render_constructor(w, &class_name, entity, &reference_fields);

            for method in &methods {
                w.blank();
                self.render_method(w, method, entity.is_some());
            }

            if let Some(entity) = entity {
                if !reference_fields.is_empty() {
                    w.blank();
                    render_reference_hook(w, entity, &reference_fields, "OnItemsAdded", "Add");
                    w.blank();
                    render_reference_hook(w, entity, &reference_fields, "OnItemsRemoved", "Remove");
                }
            }

            w.close();
        });

        Ok(GeneratedUnit::new(class_name, UnitKind::Client, source, dependencies))
    }

    fn plan_method<'o>(&self, operation: &'o OperationDescriptor, group: &str) -> Result<MethodPlan<'o>> {
        let names = &self.config.names;
        let mut resolver = TableResolver::new(self.models);
        let mut imports = BTreeSet::new();
        let name = method_name(operation, group);

        let return_type = match &operation.response {
            Some(_) if name == "GenerateId" => names.any.clone(),
            Some(response) => {
                let mapped = self.mapper.map(response, &names.list, true, &mut resolver);
                imports.extend(mapped.imports);
                mapped.name
            }
            None => names.any.clone(),
        };

        let mut idents = HashSet::new();
        let mut parameters = Vec::new();
        for parameter in &operation.parameters {
            if parameter.location == ParameterLocation::Header {
                tracing::debug!(parameter = %parameter.name, "Header parameters are not part of client signatures");
                continue;
            }

            let mut ident = camel_identifier(&parameter.name)?;
            if RESERVED_PARAMETERS.contains(&ident.as_str()) {
                ident.push_str("Value");
            }
            if !idents.insert(ident.clone()) {
                ident = format!("{}{}", ident, parameters.len());
                idents.insert(ident.clone());
            }

            let mapped = self.mapper.map(&parameter.schema, &names.list, true, &mut resolver);
            imports.extend(mapped.imports);
            parameters.push(ParameterPlan {
                wire_name: parameter.name.clone(),
                ident,
                type_name: mapped.name,
                location: parameter.location,
            });
        }

        Ok(MethodPlan {
            operation,
            paged: operation.returns_list() && operation.body_parameter().is_none(),
            name,
            return_type,
            parameters,
            imports,
        })
    }

    fn render_constructor(
        &self,
        w: &mut CodeWriter,
        class_name: &str,
        entity: Option<&ModelManifest>,
        reference_fields: &[&ReferenceField],
    ) {
        let provider = &self.config.names.provider;
        w.line(format!("public {}({} provider)", class_name, provider));
        w.indent();
        match entity {
            Some(entity) => {
                let key = entity
                    .key
                    .as_ref()
                    .map(|k| format!("nameof({}.{})", entity.type_name(), k.accessor))
                    .unwrap_or_else(|| "null".to_string());
                let type_key = entity
                    .type_key
                    .as_ref()
                    .map(|accessor| format!("nameof({}.{})", entity.type_name(), accessor))
                    .unwrap_or_else(|| "null".to_string());
                w.line(format!(
                    ": base(provider, {}, {}, {})",
                    key,
                    type_key,
                    entity.type_id.unwrap_or(0)
                ));
            }
            None => {
                w.line(": base(provider)");
            }
        }
        w.dedent();
        w.line("{");
        w.indent();

        let mut indexed = HashSet::new();
        for field in reference_fields {
            if indexed.insert(field.foreign_key_accessor.as_str()) {
                w.line(format!(
                    "Items.AddIndex(item => item.{});",
                    field.foreign_key_accessor
                ));
            }
        }
        w.close();
    }

    fn render_method(&self, w: &mut CodeWriter, method: &MethodPlan<'_>, table_client: bool) {
        let names = &self.config.names;
        let operation = method.operation;

        write_summary(w, self.config, operation.summary.as_deref());

        let mut parameters: Vec<String> = method
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.ident))
            .collect();
        if method.paged {
            parameters.push(format!("{} list = null", names.page_settings));
        }
        parameters.push(format!("{} settings = null", names.json_settings));
        parameters.push("CancellationToken cancellationToken = default".to_string());

        let modifier = if table_client && LIFECYCLE_METHODS.contains(&method.name.as_str()) {
            "override"
        } else {
            "virtual"
        };
        w.open(format!(
            "public {} async Task<{}> {}Async({})",
            modifier,
            method.return_type,
            method.name,
            parameters.join(", ")
        ));

        w.line(format!(
            "var requestPath = new StringBuilder({});",
            string_literal(&operation.path)
        ));
        let mut separator = '?';
        for parameter in method
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
        {
            w.line(format!(
                "requestPath.Append({}).Append(Uri.EscapeDataString(Convert.ToString({}, CultureInfo.InvariantCulture)));",
                string_literal(&format!("{}{}=", separator, parameter.wire_name)),
                parameter.ident
            ));
            separator = '&';
        }

        let media_type = if method
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::FormData)
        {
            "multipart/form-data"
        } else {
            "application/json"
        };
        let body = match method
            .parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
        {
            Some(body) => body.ident.clone(),
            None if method.paged => "list".to_string(),
            None => "null".to_string(),
        };

        let mut arguments = vec![
            format!("HttpMethod.{}", operation.method.pascal_name()),
            "requestPath.ToString()".to_string(),
            string_literal(media_type),
            body,
            "settings".to_string(),
            "cancellationToken".to_string(),
        ];
        arguments.extend(
            method
                .parameters
                .iter()
                .filter(|p| matches!(p.location, ParameterLocation::Path | ParameterLocation::FormData))
                .map(|p| p.ident.clone()),
        );

        w.line(format!(
            "return await RequestAsync<{}>({}).ConfigureAwait(false);",
            method.return_type,
            arguments.join(", ")
        ));
        w.close();
    }
}

/// Keeps owners' reference collections in step with the client's item set
fn render_reference_hook(
    w: &mut CodeWriter,
    entity: &ModelManifest,
    reference_fields: &[&ReferenceField],
    hook: &str,
    mutation: &str,
) {
    w.open(format!(
        "protected override void {}(IEnumerable<{}> items)",
        hook,
        entity.type_name()
    ));
    w.line(format!("base.{}(items);", hook));
    w.open("foreach (var item in items)");

    for field in reference_fields {
        let foreign_key = format!("item.{}", field.foreign_key_accessor);
        let (guard, value) = if !field.foreign_key_value_type {
            (format!("{} != null", foreign_key), foreign_key.clone())
        } else if field.foreign_key_nullable() {
            (format!("{} != null", foreign_key), format!("{}.Value", foreign_key))
        } else {
            (format!("{} != default", foreign_key), foreign_key.clone())
        };
        let lookup = format!("Provider.GetClient<{}>().Select({})", field.owner_type, value);

        w.open(format!("if ({})", guard));
        match &field.back_reference {
            Some(back) => w.line(format!("var owner = item.{} ??= {};", back, lookup)),
            None => w.line(format!("var owner = {};", lookup)),
        };
        w.line(format!("owner?.{}.{}(item);", field.accessor, mutation));
        w.close();
    }

    w.close();
    w.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_model::HttpMethod;

    #[test]
    fn test_group_from_path() {
        let op = OperationDescriptor::new(HttpMethod::Get, "/api/Customer/{id}/Orders");
        let group = group_name(&op);
        assert_eq!(group, "Customer");
        assert_eq!(method_name(&op, &group), "Orders");
    }

    #[test]
    fn test_verb_fallback() {
        let op = OperationDescriptor::new(HttpMethod::Get, "/api/Customer/{id}");
        assert_eq!(method_name(&op, "Customer"), "Get");
        let op = OperationDescriptor::new(HttpMethod::Delete, "/api/customer");
        assert_eq!(method_name(&op, "Customer"), "Delete");
    }

    #[test]
    fn test_tag_wins() {
        let op = OperationDescriptor::new(HttpMethod::Post, "/api/Order/Search").with_tag("sales order");
        assert_eq!(group_name(&op), "SalesOrder");
        assert_eq!(method_name(&op, "SalesOrder"), "OrderSearch");
    }

    #[test]
    fn test_group_without_plain_segment() {
        let op = OperationDescriptor::new(HttpMethod::Get, "/api/{id}");
        assert_eq!(group_name(&op), "ApiId");
        let op = OperationDescriptor::new(HttpMethod::Get, "/");
        assert_eq!(group_name(&op), "Default");
    }
}
