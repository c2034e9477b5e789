use std::path::Path;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use sombra::analyze::Registry;
use sombra::error::Error;
use sombra::patch::PatchTool;
use sombra::vars::StdinReader;
use sombra::vcs::GitFactory;
use sombra::{local_init, template_init, update_copy, update_diff, wildcard};

#[derive(Parser)]
#[command(
    name = "sombra",
    about = "Project templates onto working trees and keep them up to date"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work on a project instantiated from a template
    Local {
        #[command(subcommand)]
        command: LocalCommands,
    },
    /// Work on a template repository
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
}

#[derive(Subcommand)]
enum LocalCommands {
    /// Register a template for the current directory
    Init {
        /// Git repository to use as template
        template: String,
    },
    /// Re-project a newer template revision over the current directory
    Update {
        /// Git repository to update from
        template: String,
        /// Tag to project; defaults to the latest semver tag
        #[arg(long)]
        tag: Option<String>,
        /// How to project the update (copy|diff)
        #[arg(long, default_value = "copy")]
        method: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// Derive a template definition from an existing repository
    Init {
        /// Directory of the project to initialize as template
        #[arg(default_value = ".")]
        dir: String,
        /// Wildcard of files to exclude
        #[arg(short = 'e', long = "exclude")]
        exclude: Vec<String>,
        /// Wildcard of files to include
        #[arg(short = 'o', long = "only")]
        only: Vec<String>,
    },
}

fn init_logging() {
    let level = match std::env::var("SOMBRA_LOG").as_deref() {
        Ok("DEBUG") => LevelFilter::DEBUG,
        Ok("INFO") => LevelFilter::INFO,
        _ => LevelFilter::ERROR,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_local_init(template: &str) -> sombra::Result<()> {
    let cwd = std::env::current_dir()?;
    local_init::run(&cwd, template, &GitFactory, &mut StdinReader)
}

fn cmd_local_update(template: &str, tag: Option<&str>, method: &str) -> sombra::Result<()> {
    let cwd = std::env::current_dir()?;
    let tag = tag.unwrap_or_default();
    match method {
        "copy" => update_copy::run(&cwd, template, tag, &GitFactory),
        "diff" => update_diff::run(&cwd, template, tag, &GitFactory, &PatchTool),
        other => Err(Error::UnsupportedMethod(other.to_string())),
    }
}

fn cmd_template_init(dir: &str, only: &[String], exclude: &[String]) -> sombra::Result<()> {
    let only = if only.is_empty() {
        vec!["/**/*".to_string()]
    } else {
        wildcard::anchor_all(only)
    };
    let exclude = wildcard::anchor_all(exclude);
    let registry = Registry::with_default_analyzers();
    template_init::run(Path::new(dir), &only, &exclude, &registry)
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Local { command } => match command {
            LocalCommands::Init { template } => cmd_local_init(template),
            LocalCommands::Update {
                template,
                tag,
                method,
            } => cmd_local_update(template, tag.as_deref(), method),
        },
        Commands::Template { command } => match command {
            TemplateCommands::Init { dir, exclude, only } => {
                cmd_template_init(dir, only, exclude)
            }
        },
    };

    if let Err(err) = result {
        eprintln!("[sombra] error: {err}");
        std::process::exit(1);
    }
}
