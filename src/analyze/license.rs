//! License-file analyzer: a `LICENSE` belongs to the template's authors, not
//! to instantiated projects. It is parked under `/vendors` with a stable
//! uuid-v5 prefix and kept byte-identical.

use std::path::Path;

use uuid::Uuid;

use crate::error::Result;
use crate::template_def::{Mappings, Pattern};

use super::{AbstractCandidate, Analyzer, FileAnalysis};

struct License {
    base_dir: String,
    file: String,
}

pub(super) fn accepts(_base_dir: &Path, file: &str) -> bool {
    super::base_name(file) == "LICENSE"
}

pub(super) fn build(base_dir: &Path, file: &str) -> Result<Box<dyn Analyzer>> {
    Ok(Box::new(License {
        base_dir: base_dir.to_string_lossy().into_owned(),
        file: file.to_string(),
    }))
}

impl License {
    fn vendored_name(&self) -> String {
        let seed = format!("{}{}", self.base_dir, self.file);
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        format!("{id}.{}", super::base_name(&self.file))
    }
}

impl Analyzer for License {
    fn abstract_candidates(&self) -> Result<Vec<AbstractCandidate>> {
        Ok(Vec::new())
    }

    fn file_analyses(&self) -> Result<Vec<FileAnalysis>> {
        let source = super::parent_dir(&self.file);
        let name = super::base_name(&self.file);
        Ok(vec![FileAnalysis {
            pattern: Some(Pattern {
                pattern: self.file.clone(),
                path: Mappings::from([(source.to_string(), "/vendors".to_string())]),
                name: Mappings::from([(name.to_string(), self.vendored_name())]),
                verbatim: true,
                ..Pattern::default()
            }),
            ..FileAnalysis::default()
        }])
    }

    fn file_name(&self) -> &str {
        &self.file
    }
}
