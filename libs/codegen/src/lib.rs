//! Schema-driven C# code synthesis
//!
//! Turns a parsed [`SchemaDocument`] into C# source units: one model class
//! (or enum) per schema definition and one client class per operation group,
//! plus a provider that owns every client.
//!
//! ## Architecture
//!
//! Generation runs in two phases:
//! 1. **Models**: every definition is resolved exactly once through the
//!    [`ReferenceResolver`]. It either matches an existing type from a
//!    [`TypeCatalog`] or is generated, recursively resolving the definitions
//!    it references. Each resolved definition publishes a [`ModelManifest`].
//! 2. **Clients**: operations are grouped and each group becomes a client,
//!    reading accessor and key names from the published [`ModelTable`] only.
//!
//! Units are handed to an [`EmissionSink`] as soon as they are complete.
//!
//! ```
//! use schemata_codegen::{synthesize, StaticCatalog};
//! use schemata_model::SchemaDocument;
//!
//! let document = SchemaDocument::from_json_str(r#"{
//!     "definitions": {
//!         "Customer": {
//!             "type": "object",
//!             "x-id": "id",
//!             "properties": { "id": { "type": "integer" } }
//!         }
//!     }
//! }"#).unwrap();
//!
//! let units = synthesize(&document, &StaticCatalog::empty());
//! assert_eq!(units[0].name, "Customer");
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod generators;
pub mod manifest;
pub mod mapper;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod sink;
pub mod utils;
pub mod writer;

pub use catalog::{
    Candidate, ExternalType, MatchStrategy, OverlapMatcher, StaticCatalog, TypeCatalog, TypeKind,
    TypeShape,
};
pub use config::{GeneratorConfig, TargetNames};
pub use error::{CatalogError, Error, Result};
pub use generators::client::{group_name, method_name, ClientSynthesizer};
pub use generators::model::{ModelSynthesizer, SynthesizedModel};
pub use manifest::{KeyInfo, ModelManifest, ModelTable, ReferenceField};
pub use mapper::{MappedType, TypeMapper};
pub use pipeline::{synthesize, Cancellation, Pipeline};
pub use report::{Diagnostic, GenerationReport, Severity};
pub use resolver::{
    GenerationCache, Origin, ReferenceResolver, Resolution, Slot, TableResolver, TypeHandle,
    TypeResolver,
};
pub use sink::{EmissionSink, FileSink, GeneratedUnit, MemorySink, UnitHandle, UnitKind};

use schemata_model::SchemaDocument;
use std::path::Path;

/// Convenience helper: parse a schema file and write every generated unit
/// into `output_dir`.
pub fn generate_to_directory(
    schema_path: &Path,
    output_dir: &Path,
    config: GeneratorConfig,
    catalog: &dyn TypeCatalog,
) -> Result<GenerationReport> {
    let document = SchemaDocument::from_path(schema_path)?;
    let mut sink = FileSink::new(output_dir);
    let report = Pipeline::new(&document, config)
        .with_catalog(catalog)
        .run(&mut sink);
    Ok(report)
}
