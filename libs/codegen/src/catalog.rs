//! Externally visible candidate types and structural matching
//!
//! Before a definition is generated, the resolver asks the catalog whether a
//! type with the same shape already exists (for example in a referenced
//! assembly from an earlier generation run). Matching is heuristic and
//! pluggable through [`MatchStrategy`].

use crate::error::CatalogError;
use crate::generators::enumeration::member_identifiers;
use crate::naming::pascal_identifier;
use schemata_model::SchemaDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Kind of a target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
}

/// Identity of a candidate type in a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub namespace: String,
}

/// Reflected shape of a candidate type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub kind: TypeKind,
    /// Public instance property names
    pub properties: Vec<String>,
    /// Enumeration member names, in declaration order
    pub members: Vec<String>,
}

/// Source of externally visible candidate types
pub trait TypeCatalog {
    /// All candidates, in a stable order
    fn candidates(&self) -> Vec<Candidate>;

    /// Reflect over one candidate
    fn shape(&self, candidate: &Candidate) -> Result<TypeShape, CatalogError>;
}

/// Decides whether a candidate shape is equivalent to a definition
pub trait MatchStrategy {
    fn matches(&self, definition: &SchemaDefinition, shape: &TypeShape) -> bool;
}

/// Name-overlap matching.
///
/// Enumerations match when the member-name sequences are equal. Objects match
/// when the fraction of schema property names present on the candidate is
/// strictly greater than `threshold`; a definition without properties
/// matches any object candidate.
#[derive(Debug, Clone, Copy)]
pub struct OverlapMatcher {
    pub threshold: f64,
}

impl OverlapMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Fraction of the definition's property names present on the candidate
    pub fn overlap(definition: &SchemaDefinition, shape: &TypeShape) -> f64 {
        if definition.properties.is_empty() {
            return 1.0;
        }

        let available: HashSet<&str> = shape.properties.iter().map(String::as_str).collect();
        let shared = definition
            .properties
            .keys()
            .filter(|name| {
                let accessor = pascal_identifier(name).unwrap_or_else(|_| name.to_string());
                available.contains(accessor.as_str()) || available.contains(name.as_str())
            })
            .count();

        shared as f64 / definition.properties.len() as f64
    }
}

impl Default for OverlapMatcher {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl MatchStrategy for OverlapMatcher {
    fn matches(&self, definition: &SchemaDefinition, shape: &TypeShape) -> bool {
        match (definition.is_enumeration(), shape.kind) {
            (true, TypeKind::Enum) => {
                definition.enum_value_names() == shape.members
                    || member_identifiers(definition) == shape.members
            }
            (false, TypeKind::Class | TypeKind::Struct) => {
                Self::overlap(definition, shape) > self.threshold
            }
            _ => false,
        }
    }
}

/// Description of an external type, as stored in a catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalType {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: Vec<ExternalType>,
}

impl StaticCatalog {
    pub const fn empty() -> Self {
        Self { types: Vec::new() }
    }

    pub fn new(types: Vec<ExternalType>) -> Self {
        Self { types }
    }

    /// Load a JSON array of [`ExternalType`]
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn push(&mut self, external: ExternalType) {
        self.types.push(external);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for StaticCatalog {
    fn candidates(&self) -> Vec<Candidate> {
        self.types
            .iter()
            .map(|t| Candidate {
                name: t.name.clone(),
                namespace: t.namespace.clone(),
            })
            .collect()
    }

    fn shape(&self, candidate: &Candidate) -> Result<TypeShape, CatalogError> {
        let external = self
            .types
            .iter()
            .find(|t| t.name == candidate.name && t.namespace == candidate.namespace)
            .ok_or_else(|| CatalogError::Unloadable {
                name: candidate.name.clone(),
                reason: "not present in catalog".into(),
            })?;

        let inconsistent = match external.kind {
            TypeKind::Enum => !external.properties.is_empty(),
            TypeKind::Class | TypeKind::Struct => !external.members.is_empty(),
        };
        if inconsistent {
            return Err(CatalogError::Unloadable {
                name: external.name.clone(),
                reason: format!("{:?} declares both properties and members", external.kind),
            });
        }

        Ok(TypeShape {
            kind: external.kind,
            properties: external.properties.clone(),
            members: external.members.clone(),
        })
    }
}
