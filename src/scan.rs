//! Lazy recursive walk of a base directory.
//!
//! Yields `/`-prefixed relative paths for every file that passes the
//! `only`/`exclude` wildcard filters, in a deterministic (name-sorted,
//! depth-first) order. Ignored directory names are never descended into.

use std::path::{Path, PathBuf};

use globset::GlobMatcher;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::wildcard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Relative path, always starting with `/`.
    pub file: String,
    pub is_dir: bool,
}

pub struct Scan {
    base: PathBuf,
    only: Vec<GlobMatcher>,
    exclude: Vec<GlobMatcher>,
    inner: walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
}

fn not_ignored_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !wildcard::SCAN_IGNORE_DIRS.contains(&name.as_ref())
}

/// Start a walk under `base`. Wildcards are compiled up front; a malformed
/// one fails here rather than mid-walk.
pub fn scan_tree(base: &Path, only: &[String], exclude: &[String]) -> Result<Scan> {
    let compile_all = |patterns: &[String]| -> Result<Vec<GlobMatcher>> {
        patterns.iter().map(|p| wildcard::compile(p)).collect()
    };
    let mut exclude_matchers = compile_all(exclude)?;
    for ignored in wildcard::SCAN_IGNORE_DIRS {
        exclude_matchers.push(wildcard::compile(ignored)?);
    }
    Ok(Scan {
        base: base.to_path_buf(),
        only: compile_all(only)?,
        exclude: exclude_matchers,
        inner: WalkDir::new(base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(not_ignored_dir as fn(&DirEntry) -> bool),
    })
}

impl Scan {
    fn allowed(&self, file: &str) -> bool {
        if self.exclude.iter().any(|m| m.is_match(file)) {
            return false;
        }
        self.only.iter().any(|m| m.is_match(file))
    }
}

impl Iterator for Scan {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(Error::Io(err.into()))),
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.base) else {
                continue;
            };
            let file = normalize(rel);
            if self.allowed(&file) {
                return Some(Ok(ScanEntry {
                    file,
                    is_dir: false,
                }));
            }
        }
    }
}

fn normalize(rel: &Path) -> String {
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

/// Resolve a `/`-prefixed relative file against a base directory.
pub fn join_file(base: &Path, file: &str) -> PathBuf {
    base.join(file.trim_start_matches('/'))
}
