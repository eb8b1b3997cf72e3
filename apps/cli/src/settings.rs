//! Layered generator configuration: defaults, optional file, `SCHEMATA_*`
//! environment variables, then command-line overrides.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use schemata_codegen::GeneratorConfig;
use std::path::Path;

pub const ENV_PREFIX: &str = "SCHEMATA";

pub fn load(file: Option<&Path>, namespace: Option<&str>) -> Result<GeneratorConfig> {
    let defaults = Config::try_from(&GeneratorConfig::default())
        .context("Failed to serialize default configuration")?;

    let mut builder = Config::builder().add_source(defaults);

    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("usings")
            .try_parsing(true),
    );

    if let Some(namespace) = namespace {
        builder = builder
            .set_override("namespace", namespace)
            .context("Invalid namespace override")?;
    }

    let config = builder
        .build()
        .context("Failed to load configuration")?
        .try_deserialize::<GeneratorConfig>()
        .context("Invalid configuration")?;

    if !(0.0..=1.0).contains(&config.match_threshold) {
        anyhow::bail!(
            "match_threshold must be between 0 and 1, got {}",
            config.match_threshold
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load(None, None).unwrap();
        assert_eq!(config.match_threshold, 0.5);
        assert!(config.generate_docs);
    }

    #[test]
    fn test_file_then_flag_override() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "namespace": "Shop.Api", "generate_docs": false, "names": {{ "list": "IList" }} }}"#
        )
        .unwrap();

        let config = load(Some(file.path()), None).unwrap();
        assert_eq!(config.namespace, "Shop.Api");
        assert!(!config.generate_docs);
        assert_eq!(config.names.list, "IList");
        assert_eq!(config.names.string, "string");

        let config = load(Some(file.path()), Some("Shop.Override")).unwrap();
        assert_eq!(config.namespace, "Shop.Override");
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "match_threshold": 1.5 }}"#).unwrap();
        assert!(load(Some(file.path()), None).is_err());
    }
}
