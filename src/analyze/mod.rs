//! Per-file analyzers behind a weighted registry. `template init` resolves
//! one analyzer per scanned file; the lowest-weight entry whose predicate
//! accepts the file wins, with a catch-all text analyzer at weight 100.

mod go_mod;
mod license;
mod text;


use std::path::Path;

use crate::error::{Error, Result};
use crate::template_def::Pattern;

/// Which category of a pattern an abstract candidate feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MappingKind {
    Default,
    Path,
    Name,
    Content,
}

/// A proposal to abstract one concrete value behind a template variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractCandidate {
    pub kind: MappingKind,
    /// The variable this candidate abstracts over.
    pub name: String,
    /// The literal to replace.
    pub key: String,
    /// The replacement, normally a template expression over `name`.
    pub value: String,
    /// Higher wins when several candidates compete for one variable.
    pub priority: i32,
}

#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub pattern: Option<Pattern>,
    /// Broad patterns join the wildcard set instead of the per-file set.
    pub is_wildcard: bool,
    /// Survives pruning even when redundant against the wildcards.
    pub is_mandatory: bool,
    pub vars: Vec<String>,
    pub exclude: Vec<String>,
}

pub trait Analyzer {
    fn abstract_candidates(&self) -> Result<Vec<AbstractCandidate>>;
    fn file_analyses(&self) -> Result<Vec<FileAnalysis>>;
    fn file_name(&self) -> &str;
}

type Predicate = fn(base_dir: &Path, file: &str) -> bool;
type Factory = fn(base_dir: &Path, file: &str) -> Result<Box<dyn Analyzer>>;

struct Entry {
    accepts: Predicate,
    build: Factory,
    weight: i32,
}

/// Built once at program start, read-only afterwards.
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The stock analyzer set: module files, license files, and the generic
    /// text fallback.
    pub fn with_default_analyzers() -> Self {
        let mut registry = Self::new();
        registry.register(go_mod::accepts, go_mod::build, 0);
        registry.register(license::accepts, license::build, 1);
        registry.register(text::accepts, text::build, 100);
        registry
    }

    pub fn register(&mut self, accepts: Predicate, build: Factory, weight: i32) {
        self.entries.push(Entry {
            accepts,
            build,
            weight,
        });
        self.entries.sort_by_key(|e| e.weight);
    }

    pub fn analyzer_for(&self, base_dir: &Path, file: &str) -> Result<Box<dyn Analyzer>> {
        for entry in &self.entries {
            if (entry.accepts)(base_dir, file) {
                tracing::debug!(file, "analyzer resolved");
                return (entry.build)(base_dir, file);
            }
        }
        Err(Error::NoAnalyzer(file.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_default_analyzers()
    }
}

/// Directory prefix of a `/`-prefixed file, without a trailing slash except
/// at the root ("/a/b.txt" -> "/a", "/b.txt" -> "/").
fn parent_dir(file: &str) -> &str {
    match file.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &file[..idx],
    }
}

/// Final component of a `/`-prefixed file.
fn base_name(file: &str) -> &str {
    file.rfind('/').map_or(file, |idx| &file[idx + 1..])
}

/// Join a parent directory (as produced by `parent_dir`) and a name.
fn join_dir(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}
