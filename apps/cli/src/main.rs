mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemata_codegen::{
    method_name, ClientSynthesizer, FileSink, GenerationReport, MemorySink,
    ModelTable, Pipeline, Severity, StaticCatalog,
};
use schemata_model::{DefinitionKind, SchemaDocument};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "schemata", version, about = "Generate C# models and clients from a schema document")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate model, client and provider units
    Generate {
        /// Schema document (JSON)
        #[arg(long)]
        schema: PathBuf,
        /// Output directory
        #[arg(long, default_value = "generated")]
        out: PathBuf,
        /// Configuration file (TOML, JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Catalog of existing types to reuse instead of generating
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Namespace of the generated units
        #[arg(long)]
        namespace: Option<String>,
        /// Print unit names without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Print definitions and operation groups
    Inspect {
        #[arg(long)]
        schema: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.json);

    match cli.command {
        Command::Generate {
            schema,
            out,
            config,
            catalog,
            namespace,
            dry_run,
        } => generate(
            &schema,
            &out,
            config.as_deref(),
            catalog.as_deref(),
            namespace.as_deref(),
            dry_run,
        ),
        Command::Inspect { schema } => inspect(&schema).map(|_| ExitCode::SUCCESS),
    }
}

fn load_document(path: &Path) -> Result<SchemaDocument> {
    SchemaDocument::from_path(path)
        .with_context(|| format!("Failed to load schema {}", path.display()))
}

fn generate(
    schema: &Path,
    out: &Path,
    config_file: Option<&Path>,
    catalog_file: Option<&Path>,
    namespace: Option<&str>,
    dry_run: bool,
) -> Result<ExitCode> {
    let config = settings::load(config_file, namespace)?;
    let document = load_document(schema)?;
    let catalog = match catalog_file {
        Some(path) => StaticCatalog::from_path(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => StaticCatalog::empty(),
    };

    info!(
        "Generating {} definitions and {} operations into {}",
        document.definitions.len(),
        document.operations.len(),
        config.namespace
    );

    let pipeline = Pipeline::new(&document, config).with_catalog(&catalog);

    let report = if dry_run {
        let mut sink = MemorySink::new();
        let report = pipeline.run(&mut sink);
        for unit in sink.units() {
            println!("{}", unit.file_name);
        }
        report
    } else {
        std::fs::create_dir_all(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
        let mut sink = FileSink::new(out);
        pipeline.run(&mut sink)
    };

    print_report(&report);

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_report(report: &GenerationReport) {
    for diagnostic in &report.diagnostics {
        if diagnostic.severity == Severity::Info {
            continue;
        }
        eprintln!("{diagnostic}");
    }

    println!(
        "{} units generated, {} failed{}",
        report.generated.len(),
        report.failed.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

fn inspect(schema: &Path) -> Result<()> {
    let document = load_document(schema)?;

    println!("Definitions:");
    for definition in document.definitions() {
        let kind = match definition.kind {
            DefinitionKind::Object => "object",
            DefinitionKind::Enumeration => "enum",
        };
        let mut line = format!("  {} ({kind})", definition.name);
        if let Some(parent) = &definition.inherited {
            line.push_str(&format!(" : {parent}"));
        }
        if let Some((key, _)) = document.primary_key(definition) {
            line.push_str(&format!(" key={}", key.name));
        }
        println!("{line}");
    }

    let config = schemata_codegen::GeneratorConfig::default();
    let models = ModelTable::new();
    let clients = ClientSynthesizer::new(&document, &config, &models);

    println!("Clients:");
    for (group, operations) in clients.groups() {
        println!("  {group}Client");
        for operation in operations {
            println!(
                "    {}Async  {} {}",
                method_name(operation, &group),
                operation.method.as_str().to_uppercase(),
                operation.path
            );
        }
    }

    Ok(())
}
