//! `template init`: scan a repository, let the analyzers propose mappings,
//! unify them into one abstract wildcard, prune per-file patterns that the
//! wildcards already cover, and save the resulting template definition.

use std::path::Path;

use crate::analyze::{Analyzer, FileAnalysis, MappingKind, Registry};
use crate::engine::Engine;
use crate::error::Result;
use crate::scan;
use crate::template_def::{self, Mappings, Pattern, TemplateDef};

pub fn run(
    template_dir: &Path,
    only: &[String],
    exclude: &[String],
    registry: &Registry,
) -> Result<()> {
    let mut analyzers: Vec<Box<dyn Analyzer>> = Vec::new();
    for entry in scan::scan_tree(template_dir, only, exclude)? {
        let entry = entry?;
        analyzers.push(registry.analyzer_for(template_dir, &entry.file)?);
    }
    tracing::info!(
        dir = %template_dir.display(),
        files = analyzers.len(),
        "deriving template definition"
    );

    let engine = Engine::new();
    let abstract_patterns = unify_abstract_candidates(&analyzers, exclude)?;
    let (vars, patterns) =
        build_patterns(&engine, &analyzers, abstract_patterns, only, exclude)?;

    let def = TemplateDef {
        vars: dedup_vars(vars),
        patterns,
    };
    template_def::save(&template_def::def_file(template_dir), &def)
}

/// Collect every analyzer's abstract candidates, keep the highest-priority
/// one per variable, and fold the winners into a single abstract wildcard.
fn unify_abstract_candidates(
    analyzers: &[Box<dyn Analyzer>],
    exclude: &[String],
) -> Result<Vec<Pattern>> {
    let mut winners: Vec<crate::analyze::AbstractCandidate> = Vec::new();
    for analyzer in analyzers {
        for candidate in analyzer.abstract_candidates()? {
            match winners.iter_mut().find(|w| w.name == candidate.name) {
                Some(winner) => {
                    if candidate.priority > winner.priority {
                        *winner = candidate;
                    }
                }
                None => winners.push(candidate),
            }
        }
    }

    let mut default = Mappings::new();
    let mut path = Mappings::new();
    let mut name = Mappings::new();
    let mut content = Mappings::new();
    for winner in winners {
        let bucket = match winner.kind {
            MappingKind::Default => &mut default,
            MappingKind::Path => &mut path,
            MappingKind::Name => &mut name,
            MappingKind::Content => &mut content,
        };
        bucket.insert(winner.key, winner.value);
    }

    Ok(vec![Pattern {
        pattern: "/**/*".to_string(),
        r#abstract: true,
        default,
        path,
        name,
        content,
        except: exclude.to_vec(),
        ..Pattern::default()
    }])
}

fn build_patterns(
    engine: &Engine,
    analyzers: &[Box<dyn Analyzer>],
    abstract_patterns: Vec<Pattern>,
    only: &[String],
    exclude: &[String],
) -> Result<(Vec<String>, Vec<Pattern>)> {
    let mut wildcards = abstract_patterns;
    for wildcard in only {
        wildcards.push(Pattern {
            pattern: wildcard.clone(),
            except: exclude.to_vec(),
            ..Pattern::default()
        });
    }

    let mut analyses: Vec<FileAnalysis> = Vec::new();
    for analyzer in analyzers {
        analyses.extend(analyzer.file_analyses()?);
    }

    let mut vars: Vec<String> = Vec::new();
    let mut ignore: Vec<String> = Vec::new();
    for analysis in &analyses {
        ignore.extend(analysis.exclude.iter().cloned());
        vars.extend(analysis.vars.iter().cloned());
    }
    ignore.extend(exclude.iter().cloned());

    for analysis in &analyses {
        if analysis.is_wildcard {
            if let Some(pattern) = &analysis.pattern {
                wildcards.push(pattern.clone());
            }
        }
    }

    fold_ignores(engine, &mut wildcards, &ignore)?;

    let mut file_patterns: Vec<Pattern> = Vec::new();
    for analysis in &analyses {
        if analysis.is_wildcard {
            continue;
        }
        let Some(pattern) = &analysis.pattern else {
            continue;
        };
        let mut pattern = pattern.clone();

        let (include, matched) = engine.match_file(&pattern.pattern, &wildcards)?;
        if !include && !analysis.is_mandatory {
            continue;
        }

        for reference in matched {
            prune_against(&mut pattern, reference);
        }

        // A pattern the wildcards already cover, with nothing of its own
        // left, adds no information.
        if include && !is_relevant(&pattern) {
            continue;
        }
        file_patterns.push(pattern);
    }

    let mut patterns = wildcards;
    patterns.append(&mut file_patterns);
    let merged = merge_duplicates(patterns);

    Ok((vars, merged))
}

/// Append each accumulated ignore to the `except` list of every non-abstract
/// wildcard that matches it.
fn fold_ignores(engine: &Engine, wildcards: &mut [Pattern], ignore: &[String]) -> Result<()> {
    for file in ignore {
        for idx in 0..wildcards.len() {
            let slot = std::slice::from_ref(&wildcards[idx]);
            let (_, matched) = engine.match_file(file, slot)?;
            if matched.is_empty() || wildcards[idx].r#abstract {
                continue;
            }
            wildcards[idx].except.push(file.clone());
        }
    }
    Ok(())
}

/// Delete from `pattern` every mapping entry that a reference pattern
/// already carries identically, in any category.
fn prune_against(pattern: &mut Pattern, reference: &Pattern) {
    for reference_map in [
        &reference.default,
        &reference.path,
        &reference.name,
        &reference.content,
    ] {
        for target_map in [
            &mut pattern.default,
            &mut pattern.path,
            &mut pattern.name,
            &mut pattern.content,
        ] {
            target_map.retain(|key, value| reference_map.get(key) != Some(&*value));
        }
    }
}

fn is_relevant(pattern: &Pattern) -> bool {
    !pattern.default.is_empty()
        || !pattern.path.is_empty()
        || !pattern.name.is_empty()
        || !pattern.content.is_empty()
        || !pattern.except.is_empty()
        || pattern.verbatim
        || pattern.copy_only
        || pattern.r#abstract
}

/// Collapse patterns sharing `(pattern, abstract)`: mappings merge with
/// later entries winning, flags OR together, excepts concatenate. Abstract
/// patterns sort first, then lexicographically by wildcard.
fn merge_duplicates(patterns: Vec<Pattern>) -> Vec<Pattern> {
    let mut merged: Vec<Pattern> = Vec::new();
    for pattern in patterns {
        match merged
            .iter_mut()
            .find(|p| p.pattern == pattern.pattern && p.r#abstract == pattern.r#abstract)
        {
            Some(existing) => {
                existing.default.extend(pattern.default);
                existing.path.extend(pattern.path);
                existing.name.extend(pattern.name);
                existing.content.extend(pattern.content);
                existing.except.extend(pattern.except);
                existing.verbatim |= pattern.verbatim;
                existing.copy_only |= pattern.copy_only;
            }
            None => merged.push(pattern),
        }
    }
    merged.sort_by(|a, b| {
        b.r#abstract
            .cmp(&a.r#abstract)
            .then_with(|| a.pattern.cmp(&b.pattern))
    });
    merged
}

fn dedup_vars(vars: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    vars.into_iter().filter(|v| seen.insert(v.clone())).collect()
}
