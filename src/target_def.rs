//! The per-target tracking document, `sombra.yaml` at the target root. One
//! entry per instantiated template; the same URI may appear several times
//! under different sub-paths.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::template_def::Mappings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub uri: String,

    /// Subdirectory of the target this template projects into.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Version last projected, empty when never projected.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current: String,

    /// Concrete values for the template's declared variables.
    #[serde(default)]
    pub vars: Mappings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDef {
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

pub fn def_file(target: &Path) -> PathBuf {
    target.join("sombra.yaml")
}

/// Lenient load: a missing or unparseable document is an empty definition,
/// so `local init` can bootstrap a fresh target.
pub fn load(path: &Path) -> TargetDef {
    let Ok(data) = fs::read_to_string(path) else {
        return TargetDef::default();
    };
    serde_yml::from_str(&data).unwrap_or_default()
}

/// Write through a sibling temp file and rename, so a crash mid-save cannot
/// leave a truncated document behind.
pub fn save(path: &Path, def: &TargetDef) -> Result<()> {
    let data = serde_yml::to_string(def)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    tracing::info!(path = %path.display(), "target definition saved");
    Ok(())
}
