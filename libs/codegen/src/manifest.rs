//! Published facts about resolved definitions
//!
//! Model generation records one [`ModelManifest`] per resolved definition.
//! Client generation reads nothing else, so it never depends on the order in
//! which models were produced.

use crate::resolver::TypeHandle;
use indexmap::IndexMap;

/// Primary key of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Declared property name
    pub property: String,
    pub accessor: String,
    /// Mapped type, possibly with a nullable marker
    pub type_name: String,
    pub is_value_type: bool,
}

impl KeyInfo {
    /// Key type without the nullable marker
    pub fn bare_type(&self) -> &str {
        self.type_name.trim_end_matches('?')
    }
}

/// One-to-many relationship: a collection on the owner whose elements carry
/// a foreign key back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceField {
    /// Definition declaring the collection
    pub owner: String,
    pub owner_type: String,
    pub property: String,
    pub accessor: String,
    /// Definition of the collection elements
    pub element: String,
    pub element_type: String,
    /// Foreign-key property on the element
    pub foreign_key: String,
    pub foreign_key_accessor: String,
    pub foreign_key_type: String,
    pub foreign_key_value_type: bool,
    /// Accessor on the element holding the owner object, when declared
    pub back_reference: Option<String>,
}

impl ReferenceField {
    pub fn foreign_key_nullable(&self) -> bool {
        self.foreign_key_type.ends_with('?')
    }
}

/// Everything client generation needs to know about one definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelManifest {
    pub definition: String,
    pub handle: TypeHandle,
    pub is_enumeration: bool,
    /// Declared property name to accessor, ancestors' properties included
    pub accessors: IndexMap<String, String>,
    pub key: Option<KeyInfo>,
    /// Accessor of the type-discriminator property
    pub type_key: Option<String>,
    pub type_id: Option<i64>,
    pub reference_fields: Vec<ReferenceField>,
}

impl ModelManifest {
    pub fn type_name(&self) -> &str {
        &self.handle.name
    }
}

/// Definition name to manifest, in resolution order
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    manifests: IndexMap<String, ModelManifest>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, manifest: ModelManifest) {
        self.manifests.insert(manifest.definition.clone(), manifest);
    }

    pub fn get(&self, definition: &str) -> Option<&ModelManifest> {
        self.manifests.get(definition)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelManifest> {
        self.manifests.values()
    }

    /// Reference fields whose elements are instances of `definition`
    pub fn reference_fields_targeting(&self, definition: &str) -> Vec<&ReferenceField> {
        self.manifests
            .values()
            .flat_map(|m| m.reference_fields.iter())
            .filter(|field| field.element == definition)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeKind;
    use crate::resolver::Origin;

    fn manifest(definition: &str, fields: Vec<ReferenceField>) -> ModelManifest {
        ModelManifest {
            definition: definition.to_string(),
            handle: TypeHandle {
                name: definition.to_string(),
                namespace: "Ns".to_string(),
                kind: TypeKind::Class,
                origin: Origin::Generated,
            },
            is_enumeration: false,
            accessors: IndexMap::new(),
            key: None,
            type_key: None,
            type_id: None,
            reference_fields: fields,
        }
    }

    fn field(owner: &str, element: &str) -> ReferenceField {
        ReferenceField {
            owner: owner.to_string(),
            owner_type: owner.to_string(),
            property: "items".to_string(),
            accessor: "Items".to_string(),
            element: element.to_string(),
            element_type: element.to_string(),
            foreign_key: "ownerId".to_string(),
            foreign_key_accessor: "OwnerId".to_string(),
            foreign_key_type: "int?".to_string(),
            foreign_key_value_type: true,
            back_reference: None,
        }
    }

    #[test]
    fn test_reference_fields_targeting() {
        let mut table = ModelTable::new();
        table.insert(manifest("Order", vec![field("Order", "LineItem")]));
        table.insert(manifest("Basket", vec![field("Basket", "LineItem")]));
        table.insert(manifest("LineItem", Vec::new()));

        let owners: Vec<_> = table
            .reference_fields_targeting("LineItem")
            .iter()
            .map(|f| f.owner.as_str())
            .collect();
        assert_eq!(owners, vec!["Order", "Basket"]);
        assert!(table.reference_fields_targeting("Order").is_empty());
        assert!(table.reference_fields_targeting("LineItem")[0].foreign_key_nullable());
    }
}
