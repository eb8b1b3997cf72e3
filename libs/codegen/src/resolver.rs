//! Reference resolution and the generation cache
//!
//! Every definition goes through [`ReferenceResolver::resolve`] exactly once:
//! the slot is claimed before any work starts, so a definition reached again
//! while it is still being generated (a reference cycle) observes `Pending`
//! and falls back to its planned name instead of recursing.

use crate::catalog::{MatchStrategy, TypeCatalog, TypeKind, TypeShape};
use crate::config::GeneratorConfig;
use crate::generators::model::ModelSynthesizer;
use crate::manifest::ModelTable;
use crate::naming::pascal_identifier;
use crate::report::{GenerationReport, MODEL_GENERATOR};
use crate::sink::EmissionSink;
use indexmap::IndexMap;
use schemata_model::{SchemaDefinition, SchemaDocument};

/// Where a resolved type comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Generated,
    External,
}

/// Handle to a target type produced for a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle {
    pub name: String,
    pub namespace: String,
    pub kind: TypeKind,
    pub origin: Origin,
}

impl TypeHandle {
    /// Name and namespace a definition is generated under
    pub fn planned(definition: &SchemaDefinition, config: &GeneratorConfig) -> crate::Result<Self> {
        Ok(Self {
            name: pascal_identifier(&definition.name)?,
            namespace: config.namespace.clone(),
            kind: if definition.is_enumeration() {
                TypeKind::Enum
            } else {
                TypeKind::Class
            },
            origin: Origin::Generated,
        })
    }

    pub fn is_value_type(&self) -> bool {
        self.kind != TypeKind::Class
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }
}

/// Resolution state of one definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Generation has started but not finished
    Pending,
    External(TypeHandle),
    Generated(TypeHandle),
    Failed,
}

/// Definition name to resolution state
#[derive(Debug, Default)]
pub struct GenerationCache {
    slots: IndexMap<String, Slot>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Mark `name` as pending. Returns false if it already has a slot.
    pub fn claim(&mut self, name: &str) -> bool {
        if self.slots.contains_key(name) {
            return false;
        }
        self.slots.insert(name.to_string(), Slot::Pending);
        true
    }

    /// Replace a pending slot with its outcome
    pub fn complete(&mut self, name: &str, slot: Slot) {
        debug_assert!(matches!(self.slots.get(name), Some(Slot::Pending)));
        self.slots.insert(name.to_string(), slot);
    }

    /// Resolved handle, if generation finished successfully
    pub fn handle(&self, name: &str) -> Option<&TypeHandle> {
        match self.slots.get(name)? {
            Slot::External(handle) | Slot::Generated(handle) => Some(handle),
            Slot::Pending | Slot::Failed => None,
        }
    }

    /// Names still pending
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Pending))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Outcome of resolving a definition name
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// A model was generated for the definition by this call. External
    /// matches and cached slots report `false`.
    pub newly_resolved: bool,
    pub handle: Option<TypeHandle>,
}

/// Maps definition names to target types
pub trait TypeResolver {
    fn resolve(&mut self, name: &str) -> Resolution;

    /// Name a definition will have once generated, used while it is still
    /// pending
    fn planned(&self, name: &str) -> Option<TypeHandle>;
}

/// Phase-one resolver: matches or generates definitions on demand and
/// publishes their manifests.
pub struct ReferenceResolver<'a> {
    document: &'a SchemaDocument,
    config: &'a GeneratorConfig,
    catalog: &'a dyn TypeCatalog,
    matcher: &'a dyn MatchStrategy,
    sink: &'a mut dyn EmissionSink,
    report: &'a mut GenerationReport,
    cache: GenerationCache,
    models: ModelTable,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        document: &'a SchemaDocument,
        config: &'a GeneratorConfig,
        catalog: &'a dyn TypeCatalog,
        matcher: &'a dyn MatchStrategy,
        sink: &'a mut dyn EmissionSink,
        report: &'a mut GenerationReport,
    ) -> Self {
        Self {
            document,
            config,
            catalog,
            matcher,
            sink,
            report,
            cache: GenerationCache::new(),
            models: ModelTable::new(),
        }
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// Record that the run stopped before every definition was resolved
    pub fn cancel(&mut self) {
        self.report.cancelled = true;
    }

    /// Finish phase one, handing over the published manifests
    pub fn into_models(self) -> ModelTable {
        self.models
    }

    /// First catalog candidate equivalent to the definition.
    ///
    /// Candidates that cannot be inspected are skipped with a warning.
    fn find_external(&mut self, definition: &SchemaDefinition) -> Option<(TypeHandle, TypeShape)> {
        let catalog = self.catalog;
        for candidate in catalog.candidates() {
            let shape = match catalog.shape(&candidate) {
                Ok(shape) => shape,
                Err(e) => {
                    tracing::warn!(candidate = %candidate.name, "Skipping candidate: {}", e);
                    self.report
                        .warning(MODEL_GENERATOR, &definition.name, e.to_string());
                    continue;
                }
            };

            if self.matcher.matches(definition, &shape) {
                let handle = TypeHandle {
                    name: candidate.name,
                    namespace: candidate.namespace,
                    kind: shape.kind,
                    origin: Origin::External,
                };
                return Some((handle, shape));
            }
        }
        None
    }

    fn synthesize(&mut self, definition: &'a SchemaDefinition) -> crate::Result<TypeHandle> {
        let synthesizer = ModelSynthesizer::new(self.document, self.config);
        let model = synthesizer.synthesize(definition, self)?;
        let emitted = self.sink.emit(model.unit)?;
        self.report.record_generated(&emitted.name);
        self.models.insert(model.manifest);
        Ok(model.handle)
    }
}

impl TypeResolver for ReferenceResolver<'_> {
    fn resolve(&mut self, name: &str) -> Resolution {
        if let Some(slot) = self.cache.get(name) {
            let handle = match slot {
                Slot::External(handle) | Slot::Generated(handle) => Some(handle.clone()),
                Slot::Pending | Slot::Failed => None,
            };
            return Resolution {
                newly_resolved: false,
                handle,
            };
        }

        let document = self.document;
        let Some(definition) = document.definition(name) else {
            tracing::debug!(definition = name, "Unknown definition");
            return Resolution::default();
        };

        self.cache.claim(name);

        if let Some((handle, shape)) = self.find_external(definition) {
            tracing::info!(
                definition = name,
                external = %handle.name,
                "Reusing external type"
            );
            let synthesizer = ModelSynthesizer::new(document, self.config);
            let manifest = synthesizer.external_manifest(definition, handle.clone(), &shape, self);
            self.models.insert(manifest);
            self.cache.complete(name, Slot::External(handle.clone()));
            self.report.success(
                MODEL_GENERATOR,
                name,
                format!("Matched external type {}.{}", handle.namespace, handle.name),
            );
            return Resolution {
                newly_resolved: false,
                handle: Some(handle),
            };
        }

        match self.synthesize(definition) {
            Ok(handle) => {
                tracing::debug!(definition = name, type_name = %handle.name, "Generated model");
                self.cache.complete(name, Slot::Generated(handle.clone()));
                self.report
                    .success(MODEL_GENERATOR, name, format!("Generated {}", handle.name));
                Resolution {
                    newly_resolved: true,
                    handle: Some(handle),
                }
            }
            Err(e) => {
                tracing::error!(definition = name, "Model generation failed: {}", e);
                self.cache.complete(name, Slot::Failed);
                self.report.failure(MODEL_GENERATOR, name, &e);
                Resolution::default()
            }
        }
    }

    fn planned(&self, name: &str) -> Option<TypeHandle> {
        if matches!(self.cache.get(name), Some(Slot::Failed)) {
            return None;
        }
        let definition = self.document.definition(name)?;
        TypeHandle::planned(definition, self.config).ok()
    }
}

/// Read-only resolver over published manifests, used once every model has
/// been resolved.
pub struct TableResolver<'a> {
    models: &'a ModelTable,
}

impl<'a> TableResolver<'a> {
    pub fn new(models: &'a ModelTable) -> Self {
        Self { models }
    }
}

impl TypeResolver for TableResolver<'_> {
    fn resolve(&mut self, name: &str) -> Resolution {
        Resolution {
            newly_resolved: false,
            handle: self.models.get(name).map(|m| m.handle.clone()),
        }
    }

    fn planned(&self, _name: &str) -> Option<TypeHandle> {
        None
    }
}
