//! The client provider unit

use super::{render_unit, unit_dependencies};
use crate::config::GeneratorConfig;
use crate::sink::{GeneratedUnit, UnitKind};
use std::collections::BTreeSet;

/// Provider owning one instance of every generated client
pub(crate) fn synthesize_provider(config: &GeneratorConfig, clients: &[String]) -> GeneratedUnit {
    let names = &config.names;
    let mut imports = BTreeSet::new();
    imports.insert(config.runtime_namespace.clone());
    let dependencies = unit_dependencies(config, &imports);

    let source = render_unit(config, &dependencies, |w| {
        w.open(format!(
            "public partial class {} : {}",
            names.provider, names.provider_base
        ));

        w.open(format!("public {}()", names.provider));
        for client in clients {
            w.line(format!("{} = new {}(this);", client, client));
            w.line(format!("Register({});", client));
        }
        w.close();

        for client in clients {
            w.blank();
            w.line(format!("public {} {} {{ get; }}", client, client));
        }

        w.close();
    });

    GeneratedUnit::new(names.provider.as_str(), UnitKind::Provider, source, dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_registers_clients() {
        let clients = vec!["OrderClient".to_string(), "CustomerClient".to_string()];
        let unit = synthesize_provider(&GeneratorConfig::default(), &clients);

        assert_eq!(unit.name, "ClientProvider");
        assert_eq!(unit.kind, UnitKind::Provider);
        assert!(unit
            .source
            .contains("public partial class ClientProvider : ClientProviderBase"));
        assert!(unit.source.contains("OrderClient = new OrderClient(this);"));
        assert!(unit.source.contains("Register(CustomerClient);"));
        assert!(unit.source.contains("public CustomerClient CustomerClient { get; }"));
        assert!(unit.dependencies.contains("Schemata.Client"));
    }
}
