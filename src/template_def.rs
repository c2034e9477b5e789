//! The template specification shipped inside a template repository at
//! `.sombra/default.yaml`, and the three ways to read it: a plain load, a
//! save, and a render that pushes the raw document through handlebars with
//! the target's variables before parsing it as YAML.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::{Handlebars, handlebars_helper};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type Mappings = BTreeMap<String, String>;

/// The declarative unit governing one or more files of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Wildcard selecting the files this pattern claims.
    pub pattern: String,

    /// Abstract patterns contribute mappings when combined but never cause a
    /// file to be processed on their own.
    #[serde(default, skip_serializing_if = "is_false")]
    pub r#abstract: bool,

    /// Copy the file bytes untouched; path and name rewriting still apply.
    #[serde(default, skip_serializing_if = "is_false")]
    pub copy_only: bool,

    /// Suppress content substitution for any file this pattern matches,
    /// regardless of what other combined patterns map.
    #[serde(default, skip_serializing_if = "is_false")]
    pub verbatim: bool,

    /// Mappings contributed to path, name, and content alike. The three
    /// category maps below override `default` on the same selector.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default: Mappings,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path: Mappings,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub name: Mappings,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: Mappings,

    /// Files matching any of these wildcards are not claimed by the pattern.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDef {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

pub fn def_file(repo_dir: &Path) -> PathBuf {
    repo_dir.join(".sombra").join("default.yaml")
}

/// Parse the document as-is, without rendering. Template expressions inside
/// mapping values survive as plain strings.
pub fn load(path: &Path) -> Result<TemplateDef> {
    let data = read_raw(path)?;
    Ok(serde_yml::from_str(&data)?)
}

pub fn save(path: &Path, def: &TemplateDef) -> Result<()> {
    let data = serde_yml::to_string(def)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), "template definition saved");
    Ok(())
}

/// Render the raw document with `vars` as the context, then parse the
/// result. Each target therefore sees its own concrete specification.
pub fn render(path: &Path, vars: &Mappings) -> Result<TemplateDef> {
    let raw = read_raw(path)?;
    let mut reg = renderer();
    reg.register_template_string("def", &raw)
        .map_err(|e| Error::TemplateSyntax(Box::new(e)))?;
    let rendered = reg
        .render("def", vars)
        .map_err(|e| Error::TemplateExec(Box::new(e)))?;
    Ok(serde_yml::from_str(&rendered)?)
}

fn read_raw(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(data),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::NotFound(path.to_path_buf()))
        }
        Err(err) => Err(Error::Io(err)),
    }
}

handlebars_helper!(lower: |s: String| s.to_lowercase());
handlebars_helper!(upper: |s: String| s.to_uppercase());
handlebars_helper!(snake: |s: String| to_snake(&s));
handlebars_helper!(trim: |s: String| s.trim().to_string());
handlebars_helper!(replace: |s: String, from: String, to: String| s.replace(&from, &to));
handlebars_helper!(now: |fmt: String| chrono::Utc::now().format(&fmt).to_string());
handlebars_helper!(base: |p: String| base_of(&p));
handlebars_helper!(dir: |p: String| dir_of(&p));
handlebars_helper!(ext: |p: String| ext_of(&p));

fn to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

fn base_of(p: &str) -> String {
    let trimmed = p.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

fn dir_of(p: &str) -> String {
    let trimmed = p.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => ".".to_string(),
    }
}

fn ext_of(p: &str) -> String {
    let name = base_of(p);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_string(),
        _ => String::new(),
    }
}

fn renderer() -> Handlebars<'static> {
    let mut reg = Handlebars::new();
    // Rendered output is YAML, not HTML; variable values must land verbatim.
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_helper("lower", Box::new(lower));
    reg.register_helper("upper", Box::new(upper));
    reg.register_helper("snake", Box::new(snake));
    reg.register_helper("trim", Box::new(trim));
    reg.register_helper("replace", Box::new(replace));
    reg.register_helper("now", Box::new(now));
    reg.register_helper("base", Box::new(base));
    reg.register_helper("dir", Box::new(dir));
    reg.register_helper("ext", Box::new(ext));
    reg
}
