//! Module-file analyzer: a `go.mod` anywhere in the tree names the project,
//! so its module identifier becomes the `project_name` variable.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::scan;
use crate::template_def::{Mappings, Pattern};
use crate::wildcard;

use super::{AbstractCandidate, Analyzer, FileAnalysis, MappingKind};

struct GoMod {
    file: String,
    module: String,
}

pub(super) fn accepts(_base_dir: &Path, file: &str) -> bool {
    wildcard::path_match(file, "go.mod").unwrap_or(false)
}

pub(super) fn build(base_dir: &Path, file: &str) -> Result<Box<dyn Analyzer>> {
    let data = fs::read_to_string(scan::join_file(base_dir, file))?;
    let module = data
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("module "))
        .unwrap_or_default()
        .trim()
        .to_string();
    tracing::debug!(file, %module, "module file loaded");
    Ok(Box::new(GoMod {
        file: file.to_string(),
        module,
    }))
}

impl Analyzer for GoMod {
    fn abstract_candidates(&self) -> Result<Vec<AbstractCandidate>> {
        if self.module.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![AbstractCandidate {
            kind: MappingKind::Default,
            name: "project_name".to_string(),
            key: self.module.clone(),
            value: "{{project_name}}".to_string(),
            priority: 0,
        }])
    }

    fn file_analyses(&self) -> Result<Vec<FileAnalysis>> {
        let mut module_file = FileAnalysis {
            pattern: Some(Pattern {
                pattern: self.file.clone(),
                ..Pattern::default()
            }),
            ..FileAnalysis::default()
        };
        if !self.module.is_empty() {
            if let Some(pattern) = module_file.pattern.as_mut() {
                pattern.content = Mappings::from([(
                    self.module.clone(),
                    "{{project_name}}".to_string(),
                )]);
            }
            module_file.vars.push("project_name".to_string());
        }

        // The module's whole subtree is template material, minus the lock
        // file and the module-private directory.
        let dir = super::parent_dir(&self.file);
        let subtree = FileAnalysis {
            pattern: Some(Pattern {
                pattern: super::join_dir(dir, "**/*"),
                ..Pattern::default()
            }),
            is_wildcard: true,
            exclude: vec![
                super::join_dir(dir, "go.sum"),
                super::join_dir(dir, "internal"),
            ],
            ..FileAnalysis::default()
        };

        Ok(vec![module_file, subtree])
    }

    fn file_name(&self) -> &str {
        &self.file
    }
}
