//! Generator configuration

use serde::{Deserialize, Serialize};

/// Configuration options for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Namespace of every generated unit
    pub namespace: String,
    /// Namespace of the runtime support types (base classes, collections)
    pub runtime_namespace: String,
    /// Additional namespaces imported by every unit
    pub usings: Vec<String>,
    /// Whether to emit `<summary>` documentation from schema descriptions
    pub generate_docs: bool,
    /// Fraction of schema property names an external type must share to be
    /// reused instead of generated (strictly greater than)
    pub match_threshold: f64,
    /// Target type and runtime names
    pub names: TargetNames,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: "Schemata.Generated".to_string(),
            runtime_namespace: "Schemata.Client".to_string(),
            usings: Vec::new(),
            generate_docs: true,
            match_threshold: 0.5,
            names: TargetNames::default(),
        }
    }
}

/// Names of primitive target types and of the runtime types generated code
/// builds on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetNames {
    pub int32: String,
    pub int64: String,
    pub boolean: String,
    pub decimal: String,
    pub string: String,
    pub bytes: String,
    pub stream: String,
    pub date_time: String,
    /// Dynamic/any type
    pub any: String,
    /// Plain ordered-list container
    pub list: String,
    /// Collection that notifies its owner on mutation
    pub reference_list: String,
    /// Root base type of generated models
    pub model_base: String,
    /// Capability marker for models with a primary key
    pub primary_key_interface: String,
    pub client_base: String,
    pub table_client_base: String,
    pub logged_client_base: String,
    pub provider: String,
    pub provider_base: String,
    pub page_settings: String,
    pub json_settings: String,
}

impl Default for TargetNames {
    fn default() -> Self {
        Self {
            int32: "int".into(),
            int64: "long".into(),
            boolean: "bool".into(),
            decimal: "decimal".into(),
            string: "string".into(),
            bytes: "byte[]".into(),
            stream: "Stream".into(),
            date_time: "DateTime".into(),
            any: "object".into(),
            list: "List".into(),
            reference_list: "ReferenceList".into(),
            model_base: "SynchronizedItem".into(),
            primary_key_interface: "IPrimaryKey".into(),
            client_base: "Client".into(),
            table_client_base: "TableClient".into(),
            logged_client_base: "LoggedTableClient".into(),
            provider: "ClientProvider".into(),
            provider_base: "ClientProviderBase".into(),
            page_settings: "HttpPageSettings".into(),
            json_settings: "HttpJsonSettings".into(),
        }
    }
}
