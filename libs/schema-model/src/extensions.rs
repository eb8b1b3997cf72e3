//! Vendor extensions (`x-*` keys) recognised on definitions and properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary-key property name (definition) or identity source (property).
pub const ID: &str = "x-id";
/// Type-discriminator property name.
pub const TYPE_KEY: &str = "x-type";
/// Integer discriminator value of a concrete type.
pub const TYPE_ID: &str = "x-type-id";
/// Foreign-key property on the element schema of a relationship collection.
pub const REF_KEY: &str = "x-ref-key";
/// Enumeration is a bit-flag set.
pub const FLAGS: &str = "x-flags";
/// Member identifiers for enumeration values.
pub const ENUM_NAMES: &str = "x-enumNames";
/// Serialized member aliases for enumeration values.
pub const ENUM_MEMBERS: &str = "x-enumMembers";

/// Typed view over the vendor extensions of a schema node.
///
/// Recognised keys are lifted into fields; anything else starting with `x-`
/// is kept verbatim in [`Extensions::other`]. Values of the wrong JSON shape
/// for a recognised key are kept in `other` as well, so a sloppy document
/// never fails to load because of an extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extensions {
    pub id: Option<String>,
    pub type_key: Option<String>,
    pub type_id: Option<i64>,
    pub ref_key: Option<String>,
    pub flags: bool,
    pub enum_names: Vec<String>,
    pub enum_members: Vec<String>,
    pub other: IndexMap<String, Value>,
}

impl Extensions {
    /// Collect every `x-*` key of a JSON object.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let mut extensions = Extensions::default();

        for (key, value) in object.iter().filter(|(k, _)| k.starts_with("x-")) {
            let recognised = match key.as_str() {
                ID => non_empty_str(value).map(|s| extensions.id = Some(s)),
                TYPE_KEY => non_empty_str(value).map(|s| extensions.type_key = Some(s)),
                REF_KEY => non_empty_str(value).map(|s| extensions.ref_key = Some(s)),
                TYPE_ID => as_integer(value).map(|n| extensions.type_id = Some(n)),
                FLAGS => as_bool(value).map(|b| extensions.flags = b),
                ENUM_NAMES => string_list(value).map(|v| extensions.enum_names = v),
                ENUM_MEMBERS => string_list(value).map(|v| extensions.enum_members = v),
                _ => None,
            };

            if recognised.is_none() {
                if is_recognised_key(key) {
                    tracing::warn!(extension = %key, value = %value, "ignoring malformed extension value");
                }
                extensions.other.insert(key.clone(), value.clone());
            }
        }

        extensions
    }

    pub fn is_empty(&self) -> bool {
        self == &Extensions::default()
    }

    /// Raw value of an unrecognised extension.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }

    /// Non-zero discriminator value, if declared.
    pub fn type_id(&self) -> Option<i64> {
        self.type_id.filter(|id| *id != 0)
    }
}

fn is_recognised_key(key: &str) -> bool {
    matches!(
        key,
        ID | TYPE_KEY | TYPE_ID | REF_KEY | FLAGS | ENUM_NAMES | ENUM_MEMBERS
    )
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    })
}
