//! Destinations for generated units

use crate::utils::write_unit;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Model,
    Enumeration,
    Client,
    Provider,
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Name of the type the unit declares
    pub name: String,
    pub kind: UnitKind,
    pub file_name: String,
    pub source: String,
    /// Namespaces the unit imports
    pub dependencies: BTreeSet<String>,
}

impl GeneratedUnit {
    pub fn new(name: impl Into<String>, kind: UnitKind, source: String, dependencies: BTreeSet<String>) -> Self {
        let name = name.into();
        Self {
            file_name: format!("{}.cs", name),
            name,
            kind,
            source,
            dependencies,
        }
    }
}

/// Position of an emitted unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHandle {
    pub index: usize,
    pub name: String,
}

/// Receives generated units
pub trait EmissionSink {
    fn emit(&mut self, unit: GeneratedUnit) -> crate::Result<UnitHandle>;

    /// A previously emitted unit by name
    fn get(&self, name: &str) -> Option<&GeneratedUnit>;
}

/// Keeps units in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    units: Vec<GeneratedUnit>,
    by_name: HashMap<String, usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<GeneratedUnit> {
        self.units
    }
}

impl EmissionSink for MemorySink {
    fn emit(&mut self, unit: GeneratedUnit) -> crate::Result<UnitHandle> {
        let index = self.units.len();
        let name = unit.name.clone();
        self.by_name.insert(name.clone(), index);
        self.units.push(unit);
        Ok(UnitHandle { index, name })
    }

    fn get(&self, name: &str) -> Option<&GeneratedUnit> {
        self.by_name.get(name).map(|&i| &self.units[i])
    }
}

/// Writes each unit to `<dir>/<file_name>` as it is emitted
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    memory: MemorySink,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            memory: MemorySink::new(),
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    pub fn units(&self) -> &[GeneratedUnit] {
        self.memory.units()
    }
}

impl EmissionSink for FileSink {
    fn emit(&mut self, unit: GeneratedUnit) -> crate::Result<UnitHandle> {
        let path = write_unit(&self.dir, &unit)?;
        tracing::debug!(path = %path.display(), "Wrote unit");
        self.memory.emit(unit)
    }

    fn get(&self, name: &str) -> Option<&GeneratedUnit> {
        self.memory.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_preserves_order() {
        let mut sink = MemorySink::new();
        let first = sink
            .emit(GeneratedUnit::new("Order", UnitKind::Model, String::new(), BTreeSet::new()))
            .unwrap();
        let second = sink
            .emit(GeneratedUnit::new("Status", UnitKind::Enumeration, String::new(), BTreeSet::new()))
            .unwrap();

        assert_eq!((first.index, second.index), (0, 1));
        assert_eq!(sink.get("Status").map(|u| u.file_name.as_str()), Some("Status.cs"));
        assert!(sink.get("Missing").is_none());
    }
}
