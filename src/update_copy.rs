//! `local update --method copy`: re-materialize the template over the
//! target, file by file, treating the template as the source of truth.

use std::fs;
use std::path::Path;

use crate::engine::Engine;
use crate::error::Result;
use crate::scan;
use crate::target_def;
use crate::template_def::{self, TemplateDef};
use crate::vcs::{self, RepoFactory, Repository};

pub fn run(target: &Path, uri: &str, tag: &str, repos: &dyn RepoFactory) -> Result<()> {
    let mut repo = repos.open(uri)?;
    let result = update_with_repo(target, uri, tag, repo.as_ref());
    let _ = repo.clean();
    result
}

fn update_with_repo(target: &Path, uri: &str, tag: &str, repo: &dyn Repository) -> Result<()> {
    let def_path = target_def::def_file(target);
    let mut def = target_def::load(&def_path);

    let version = vcs::resolve_version(repo, tag)?;
    tracing::info!(uri, %version, "projecting template by copy");

    for config in def.templates.iter_mut().filter(|c| c.uri == uri) {
        let tpl = template_def::render(&template_def::def_file(repo.dir()), &config.vars)?;
        copy_files(repo.dir(), &target.join(&config.path), &tpl)?;
        config.current.clone_from(&version);
    }

    target_def::save(&def_path, &def)
}

fn copy_files(template_dir: &Path, target_dir: &Path, tpl: &TemplateDef) -> Result<()> {
    let engine = Engine::new();
    for entry in scan::scan_tree(template_dir, &["/**/*".to_string()], &[])? {
        let entry = entry?;
        let (include, matched) = engine.match_file(&entry.file, &tpl.patterns)?;
        // Abstract-only matches contribute mappings but do not select the
        // file for projection.
        if !include {
            continue;
        }
        let maps = engine.combine(&matched);

        let new_file = engine.new_file(&entry.file, &maps.path, &maps.name)?;
        if entry.is_dir {
            fs::create_dir_all(scan::join_file(target_dir, &new_file))?;
            continue;
        }

        let content = fs::read(scan::join_file(template_dir, &entry.file))?;
        let copy_only = matched.iter().any(|p| p.copy_only);
        let new_content = if copy_only {
            content
        } else {
            engine.new_content(&content, &maps.content)?
        };

        let dest = scan::join_file(target_dir, &new_file);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, new_content)?;
        tracing::debug!(from = %entry.file, to = %new_file, "file projected");
    }
    Ok(())
}
