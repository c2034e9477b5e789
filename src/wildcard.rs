use globset::{GlobBuilder, GlobMatcher};

use crate::error::Result;

/// Wildcards the mapping engine always treats as exceptions, on top of
/// whatever a pattern declares in `except`.
pub const ENGINE_IGNORE: &[&str] = &[
    ".git/**",
    ".idea/**",
    ".sombra/**",
    ".DS_Store",
    "__pycache__/**/*",
    ".mypy_cache/**/*",
];

/// Directory names the scanner refuses to descend into.
pub const SCAN_IGNORE_DIRS: &[&str] = &[".git", ".idea", "node_modules", "__pycache__"];

/// Compile a wildcard into a matcher. A pattern that does not start with `/`
/// is matched anywhere in the tree; one that does is anchored to the base
/// directory root. `*` stays within a path segment, `**` crosses segments.
pub fn compile(pattern: &str) -> Result<GlobMatcher> {
    let anchored;
    let pattern = if pattern.starts_with('/') {
        pattern
    } else {
        anchored = format!("**/{pattern}");
        &anchored
    };
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    Ok(glob.compile_matcher())
}

/// Match a `/`-prefixed relative file path against a wildcard.
pub fn path_match(file: &str, pattern: &str) -> Result<bool> {
    Ok(compile(pattern)?.is_match(file))
}

/// Anchor raw CLI globs: a pattern without a leading `/` gets one.
pub fn anchor_all(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| {
            if p.starts_with('/') {
                p.clone()
            } else {
                format!("/{p}")
            }
        })
        .collect()
}
