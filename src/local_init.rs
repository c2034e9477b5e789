//! `local init`: register a template in the target's tracking document,
//! prompting for the variables the template declares.

use std::path::Path;

use crate::error::Result;
use crate::target_def::{self, TemplateConfig};
use crate::template_def;
use crate::vars::VarReader;
use crate::vcs::{RepoFactory, Repository};

pub fn run(
    target: &Path,
    uri: &str,
    repos: &dyn RepoFactory,
    vars: &mut dyn VarReader,
) -> Result<()> {
    let mut repo = repos.open(uri)?;
    let result = init_with_repo(target, uri, repo.as_ref(), vars);
    let _ = repo.clean();
    result
}

fn init_with_repo(
    target: &Path,
    uri: &str,
    repo: &dyn Repository,
    vars: &mut dyn VarReader,
) -> Result<()> {
    let tpl = template_def::load(&template_def::def_file(repo.dir()))?;
    let values = vars.values_for(&tpl.vars)?;

    let def_path = target_def::def_file(target);
    let mut def = target_def::load(&def_path);
    def.templates.push(TemplateConfig {
        uri: uri.to_string(),
        vars: values,
        ..TemplateConfig::default()
    });
    target_def::save(&def_path, &def)?;
    tracing::info!(uri, target = %target.display(), "template registered");
    Ok(())
}
