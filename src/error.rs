use std::path::PathBuf;

/// Everything that can abort a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A wildcard pattern that globset refuses to compile.
    #[error("invalid wildcard pattern: {0}")]
    PatternSyntax(#[from] globset::Error),

    /// A `re:`-prefixed selector that is not a valid regular expression.
    #[error("invalid regex selector: {0}")]
    RegexSyntax(#[from] regex::Error),

    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("template syntax: {0}")]
    TemplateSyntax(Box<handlebars::TemplateError>),

    #[error("template execution: {0}")]
    TemplateExec(Box<handlebars::RenderError>),

    /// A user-supplied version that does not parse as semver. Invalid
    /// repository tags are skipped silently and never raise this.
    #[error("invalid version: {0}")]
    VersionSyntax(#[from] semver::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no analyzer accepts {0}")]
    NoAnalyzer(String),

    #[error("not found: {0}")]
    NotFound(PathBuf),

    #[error("no version matching constraint {0:?}")]
    NoMatchingVersion(String),

    #[error("method {0:?} not supported, use copy or diff")]
    UnsupportedMethod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
