//! `local update --method diff`: fetch the upstream patch between the
//! target's current version and the requested one, translate it into the
//! target's vocabulary, and apply it in place.

use std::path::Path;

use regex::Regex;

use crate::engine::{Engine, MapResult};
use crate::error::Result;
use crate::patch::PatchApplier;
use crate::target_def;
use crate::template_def::{self, Pattern};
use crate::vcs::{self, EMPTY_TREE, RepoFactory, Repository};
use crate::versions;

pub fn run(
    target: &Path,
    uri: &str,
    tag: &str,
    repos: &dyn RepoFactory,
    patcher: &dyn PatchApplier,
) -> Result<()> {
    let mut repo = repos.open(uri)?;
    let result = update_with_repo(target, uri, tag, repo.as_mut(), patcher);
    let _ = repo.clean();
    result
}

fn update_with_repo(
    target: &Path,
    uri: &str,
    tag: &str,
    repo: &mut dyn Repository,
    patcher: &dyn PatchApplier,
) -> Result<()> {
    let def_path = target_def::def_file(target);
    let mut def = target_def::load(&def_path);

    let version = vcs::resolve_version(repo, tag)?;
    tracing::info!(uri, %version, "projecting template by diff");
    let engine = Engine::new();

    for config in def.templates.iter_mut().filter(|c| c.uri == uri) {
        let from = if config.current.is_empty() {
            EMPTY_TREE.to_string()
        } else {
            if versions::compare(&config.current, &version)? != std::cmp::Ordering::Less {
                tracing::debug!(current = %config.current, %version, "already up to date");
                continue;
            }
            config.current.clone()
        };

        let tpl = template_def::render(&template_def::def_file(repo.dir()), &config.vars)?;

        repo.checkout(&version)?;
        let upstream = repo.diff_from(&from)?;
        let translated = translate_patch(&engine, &upstream, &tpl.patterns)?;
        patcher.apply(&target.join(&config.path), &translated)?;

        config.current.clone_from(&version);
    }

    target_def::save(&def_path, &def)
}

/// Rewrite a unified patch so it applies to the renamed, substituted target
/// tree. The `diff` header of each file block decides the mappings in force
/// until the next header; blocks for files no pattern includes are dropped
/// wholesale.
fn translate_patch(engine: &Engine, patch: &[u8], patterns: &[Pattern]) -> Result<Vec<u8>> {
    // File paths in the header are taken from the `/` after the a/b prefix,
    // matching how wildcards address files.
    let header = Regex::new(r"^diff\s+(--[a-z]+)?\s+a(/.*)\s+b(/.*)$")?;

    let mut include = false;
    let mut maps = MapResult::default();
    let mut kept: Vec<Vec<u8>> = Vec::new();

    for raw in patch.split(|&b| b == b'\n') {
        let mut line = raw.to_vec();
        let text = String::from_utf8_lossy(raw).into_owned();

        if let Some(caps) = header.captures(&text) {
            let file = &caps[2];
            let (matched_include, matched) = engine.match_file(file, patterns)?;
            include = matched_include;
            maps = engine.combine(&matched);

            if include {
                let option = caps.get(1).map_or("", |m| m.as_str());
                let new_a = engine.new_file(&caps[2], &maps.path, &maps.name)?;
                let new_b = engine.new_file(&caps[3], &maps.path, &maps.name)?;
                line = format!("diff {option} a{new_a} b{new_b}").into_bytes();
            }
        } else if include
            && line.len() > 5
            && (line.starts_with(b"---") || line.starts_with(b"+++"))
        {
            let file = String::from_utf8_lossy(&line[5..]).into_owned();
            let new_file = engine.new_file(&file, &maps.path, &maps.name)?;
            let mut rebuilt = line[..5].to_vec();
            rebuilt.extend_from_slice(new_file.as_bytes());
            line = rebuilt;
        } else if include && line.len() > 2 && line.starts_with(b"@@") {
            // Only the function context after the closing `@@` is content.
            let close = find(&line[2..], b"@@").map_or(1, |i| i + 2);
            let rewritten = engine.new_content(&line[close..], &maps.content)?;
            let mut rebuilt = line[..close].to_vec();
            rebuilt.extend_from_slice(&rewritten);
            line = rebuilt;
        } else if include && line.len() > 1 && (line[0] == b'-' || line[0] == b'+') {
            line = engine.new_content(&line, &maps.content)?;
        }

        if include {
            kept.push(line);
        }
    }

    Ok(kept.join(&b"\n"[..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
