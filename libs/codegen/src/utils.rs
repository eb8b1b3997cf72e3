use crate::sink::GeneratedUnit;
use std::fs;
use std::path::{Path, PathBuf};

/// Write one unit into the output directory, creating it if needed.
///
/// Returns the written path.
pub fn write_unit(output_dir: &Path, unit: &GeneratedUnit) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&unit.file_name);
    fs::write(&path, &unit.source)?;
    Ok(path)
}
