//! Emitters for each kind of generated unit
//!
//! Models and enumerations are produced on demand during reference
//! resolution. Clients and the provider are produced afterwards from the
//! published model manifests.

pub mod client;
pub mod enumeration;
pub mod model;
pub mod provider;

use crate::config::GeneratorConfig;
use crate::naming::xml_escape;
use crate::writer::CodeWriter;
use std::collections::BTreeSet;

const HEADER: [&str; 3] = [
    "// <auto-generated>",
    "//     Generated by schemata. Changes to this file will be lost when it is regenerated.",
    "// </auto-generated>",
];

/// Namespaces a unit imports: its own imports plus configured usings, minus
/// the namespace it is declared in.
pub(crate) fn unit_dependencies(config: &GeneratorConfig, imports: &BTreeSet<String>) -> BTreeSet<String> {
    imports
        .iter()
        .chain(config.usings.iter())
        .filter(|ns| !ns.is_empty() && **ns != config.namespace)
        .cloned()
        .collect()
}

/// Render a complete unit: header, `using` directives, and `body` inside the
/// configured namespace.
pub(crate) fn render_unit(
    config: &GeneratorConfig,
    dependencies: &BTreeSet<String>,
    body: impl FnOnce(&mut CodeWriter),
) -> String {
    let mut w = CodeWriter::new();
    for line in HEADER {
        w.line(line);
    }
    w.blank();

    // System namespaces first
    let (system, other): (Vec<&String>, Vec<&String>) = dependencies
        .iter()
        .partition(|ns| *ns == "System" || ns.starts_with("System."));
    for ns in system.into_iter().chain(other) {
        w.line(format!("using {};", ns));
    }
    w.blank();

    w.open(format!("namespace {}", config.namespace));
    body(&mut w);
    w.close();
    w.finish()
}

/// `<summary>` documentation from a schema description
pub(crate) fn write_summary(w: &mut CodeWriter, config: &GeneratorConfig, description: Option<&str>) {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return;
    };
    if !config.generate_docs {
        return;
    }

    w.line("/// <summary>");
    for line in description.lines() {
        w.line(format!("/// {}", xml_escape(line.trim_end())).trim_end());
    }
    w.line("/// </summary>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usings_system_first_without_own_namespace() {
        let config = GeneratorConfig::default();
        let imports: BTreeSet<String> = ["Schemata.Client", "System", "Schemata.Generated", "System.IO"]
            .into_iter()
            .map(String::from)
            .collect();
        let deps = unit_dependencies(&config, &imports);
        assert!(!deps.contains("Schemata.Generated"));

        let source = render_unit(&config, &deps, |w| {
            w.line("public class A { }");
        });
        let usings: Vec<&str> = source.lines().filter(|l| l.starts_with("using")).collect();
        assert_eq!(
            usings,
            vec!["using System;", "using System.IO;", "using Schemata.Client;"]
        );
        assert!(source.contains("namespace Schemata.Generated\n{\n    public class A { }\n}\n"));
    }

    #[test]
    fn test_summary_respects_config() {
        let mut config = GeneratorConfig::default();
        let mut w = CodeWriter::new();
        write_summary(&mut w, &config, Some("Total <net>"));
        assert_eq!(w.finish(), "/// <summary>\n/// Total &lt;net&gt;\n/// </summary>\n");

        config.generate_docs = false;
        let mut w = CodeWriter::new();
        write_summary(&mut w, &config, Some("Total"));
        assert!(w.finish().is_empty());
    }
}
