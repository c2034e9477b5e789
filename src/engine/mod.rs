//! The mapping engine: decides which patterns claim a file, folds their
//! mappings into ordered substitution lists, and rewrites paths, names, and
//! content with them. Every operation is pure.

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::subst;
use crate::template_def::{Mappings, Pattern};
use crate::wildcard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapItem {
    pub key: String,
    pub value: String,
}

/// Order-significant substitution list, longest selectors first.
pub type MapList = Vec<MapItem>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResult {
    pub path: MapList,
    pub name: MapList,
    pub content: MapList,
}

pub struct Engine {
    always_ignore: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            always_ignore: wildcard::ENGINE_IGNORE
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test `file` against every pattern in declaration order. A pattern is
    /// candidate-matched when its wildcard matches and no exception (its own
    /// `except` union the always-ignore set) does. The include flag is true
    /// only when a non-abstract pattern matched, so a file claimed solely by
    /// abstract patterns still yields its mappings without being processed.
    pub fn match_file<'a>(
        &self,
        file: &str,
        patterns: &'a [Pattern],
    ) -> Result<(bool, Vec<&'a Pattern>)> {
        let mut include = false;
        let mut matched = Vec::new();

        for pattern in patterns {
            // A malformed pattern wildcard counts as a non-match; malformed
            // exception wildcards are fatal.
            if !wildcard::path_match(file, &pattern.pattern).unwrap_or(false) {
                continue;
            }

            let mut skip = false;
            for except in pattern
                .except
                .iter()
                .chain(self.always_ignore.iter())
            {
                if wildcard::path_match(file, except)? {
                    skip = true;
                    break;
                }
            }
            if skip {
                continue;
            }

            if !pattern.r#abstract {
                include = true;
            }
            matched.push(pattern);
        }

        Ok((include, matched))
    }

    /// Fold the matched patterns into one substitution list per category.
    /// `default` feeds all three categories, the category maps override it,
    /// and later patterns override earlier ones on the same selector. Any
    /// verbatim pattern wipes the content list after folding.
    pub fn combine(&self, patterns: &[&Pattern]) -> MapResult {
        let mut path = Mappings::new();
        let mut name = Mappings::new();
        let mut content = Mappings::new();
        let mut verbatim = false;

        for pattern in patterns {
            if pattern.verbatim {
                verbatim = true;
            }
            merge(&mut path, &pattern.default);
            merge(&mut path, &pattern.path);
            merge(&mut name, &pattern.default);
            merge(&mut name, &pattern.name);
            merge(&mut content, &pattern.default);
            merge(&mut content, &pattern.content);
        }

        if verbatim {
            content.clear();
        }

        MapResult {
            path: ordered(path),
            name: ordered(name),
            content: ordered(content),
        }
    }

    /// Rewrite a file path: the directory prefix through `paths`, the final
    /// component through `names`. The leading `/` is kept.
    pub fn new_file(&self, file: &str, paths: &MapList, names: &MapList) -> Result<String> {
        let split = file.rfind('/').map_or(0, |i| i + 1);
        let (dir, base) = file.split_at(split);
        let new_dir = subst::apply_str(dir, paths)?;
        let new_base = subst::apply_str(base, names)?;

        let mut joined = if new_dir.is_empty() {
            new_base
        } else if new_dir.ends_with('/') {
            format!("{new_dir}{new_base}")
        } else {
            format!("{new_dir}/{new_base}")
        };
        while joined.contains("//") {
            joined = joined.replace("//", "/");
        }
        if file.starts_with('/') && !joined.starts_with('/') {
            joined.insert(0, '/');
        }
        Ok(joined)
    }

    pub fn new_content(&self, content: &[u8], mapping: &MapList) -> Result<Vec<u8>> {
        subst::apply_bytes(content, mapping)
    }
}

fn merge(target: &mut Mappings, source: &Mappings) {
    for (k, v) in source {
        target.insert(k.clone(), v.clone());
    }
}

/// Project a mapping into its application order: longest selector first so a
/// short selector cannot eat the prefix of a longer one, ties broken by the
/// map's lexicographic order.
fn ordered(mappings: Mappings) -> MapList {
    let mut list: MapList = mappings
        .into_iter()
        .map(|(key, value)| MapItem { key, value })
        .collect();
    list.sort_by(|a, b| b.key.len().cmp(&a.key.len()));
    list
}
