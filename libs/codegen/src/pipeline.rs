//! Two-phase generation run
//!
//! Phase one resolves every definition (matching an external type or
//! generating a model) and publishes the model table. Phase two generates
//! one client per operation group from that table, then the provider.

use crate::catalog::{MatchStrategy, OverlapMatcher, StaticCatalog, TypeCatalog};
use crate::config::GeneratorConfig;
use crate::generators::client::ClientSynthesizer;
use crate::generators::provider::synthesize_provider;
use crate::manifest::ModelTable;
use crate::report::{GenerationReport, CLIENT_GENERATOR};
use crate::resolver::{ReferenceResolver, TypeResolver};
use crate::sink::{EmissionSink, GeneratedUnit, MemorySink};
use schemata_model::SchemaDocument;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static EMPTY_CATALOG: StaticCatalog = StaticCatalog::empty();

/// Cooperative cancellation flag, checked between top-level items
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Pipeline<'a> {
    document: &'a SchemaDocument,
    config: GeneratorConfig,
    catalog: &'a dyn TypeCatalog,
    matcher: Box<dyn MatchStrategy + 'a>,
    cancellation: Cancellation,
}

impl<'a> Pipeline<'a> {
    pub fn new(document: &'a SchemaDocument, config: GeneratorConfig) -> Self {
        let matcher = Box::new(OverlapMatcher::new(config.match_threshold));
        Self {
            document,
            config,
            catalog: &EMPTY_CATALOG,
            matcher,
            cancellation: Cancellation::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: &'a dyn TypeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_matcher(mut self, matcher: impl MatchStrategy + 'a) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run both phases, emitting every unit into `sink`.
    ///
    /// Never fails: per-unit errors are recorded in the report.
    pub fn run(&self, sink: &mut dyn EmissionSink) -> GenerationReport {
        let mut report = GenerationReport::new();

        let models = self.resolve_models(sink, &mut report);
        if !report.cancelled {
            self.generate_clients(&models, sink, &mut report);
        }

        tracing::info!(
            generated = report.generated.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "Generation finished"
        );
        report
    }

    fn resolve_models(&self, sink: &mut dyn EmissionSink, report: &mut GenerationReport) -> ModelTable {
        let mut resolver = ReferenceResolver::new(
            self.document,
            &self.config,
            self.catalog,
            self.matcher.as_ref(),
            sink,
            report,
        );

        for definition in self.document.definitions() {
            if self.cancellation.is_cancelled() {
                tracing::info!("Generation cancelled before {}", definition.name);
                resolver.cancel();
                break;
            }
            let resolution = resolver.resolve(&definition.name);
            if !resolution.newly_resolved {
                tracing::trace!(definition = %definition.name, "Already resolved through a reference");
            }
        }

        resolver.into_models()
    }

    fn generate_clients(&self, models: &ModelTable, sink: &mut dyn EmissionSink, report: &mut GenerationReport) {
        let clients = ClientSynthesizer::new(self.document, &self.config, models);
        let mut emitted = Vec::new();

        for (group, operations) in clients.groups() {
            if self.cancellation.is_cancelled() {
                tracing::info!("Generation cancelled before client {}", group);
                report.cancelled = true;
                return;
            }

            let emission = clients
                .synthesize(&group, &operations, report)
                .and_then(|unit| sink.emit(unit));
            match emission {
                Ok(handle) => {
                    tracing::debug!(client = %handle.name, "Generated client");
                    report.success(CLIENT_GENERATOR, &group, format!("Generated {}", handle.name));
                    report.record_generated(&handle.name);
                    emitted.push(handle.name);
                }
                Err(e) => {
                    tracing::warn!(group = %group, "Client generation failed: {}", e);
                    report.failure(CLIENT_GENERATOR, &group, &e);
                }
            }
        }

        if emitted.is_empty() {
            return;
        }

        let provider = synthesize_provider(&self.config, &emitted);
        let name = provider.name.clone();
        match sink.emit(provider) {
            Ok(handle) => {
                report.success(CLIENT_GENERATOR, &name, format!("Generated {}", handle.name));
                report.record_generated(&handle.name);
            }
            Err(e) => report.failure(CLIENT_GENERATOR, &name, &e),
        }
    }
}

/// Generate every unit for `document` into memory with default settings
pub fn synthesize(document: &SchemaDocument, catalog: &dyn TypeCatalog) -> Vec<GeneratedUnit> {
    let mut sink = MemorySink::new();
    let report = Pipeline::new(document, GeneratorConfig::default())
        .with_catalog(catalog)
        .run(&mut sink);
    for diagnostic in report.errors() {
        tracing::warn!("{}", diagnostic);
    }
    sink.into_units()
}
