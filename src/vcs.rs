//! Version-control collaborator. Templates are cloned into a scratch
//! directory that is removed on every exit path; the `TempDir` guard keeps
//! that true even across panics.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::versions;

/// Canonical git hash of the empty tree, used to diff "from the beginning"
/// when a target has never been projected.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

pub trait Repository {
    fn dir(&self) -> &Path;
    /// Leave the working tree at `version` (branch, tag, or commit) and
    /// return the resolved identifier: the tag name for tags, the commit
    /// hash otherwise.
    fn checkout(&mut self, version: &str) -> Result<String>;
    /// Unified patch between `from` and the current HEAD, with wide context.
    fn diff_from(&self, from: &str) -> Result<Vec<u8>>;
    /// Tags in semver-sorted order.
    fn tags(&self) -> Result<Vec<String>>;
    /// Remove the scratch directory. Idempotent.
    fn clean(&mut self) -> Result<()>;
}

pub trait RepoFactory {
    /// Clone `uri` into a fresh scratch directory.
    fn open(&self, uri: &str) -> Result<Box<dyn Repository>>;
}

pub struct GitFactory;

impl RepoFactory for GitFactory {
    fn open(&self, uri: &str) -> Result<Box<dyn Repository>> {
        let scratch = TempDir::new()?;
        let name = uuid::Uuid::new_v4().to_string();
        tracing::info!(uri, scratch = %scratch.path().display(), "cloning template");
        run_git(scratch.path(), &["clone", uri, name.as_str()])?;
        let dir = scratch.path().join(&name);
        Ok(Box::new(GitRepo {
            scratch: Some(scratch),
            dir,
        }))
    }
}

struct GitRepo {
    scratch: Option<TempDir>,
    dir: PathBuf,
}

impl Repository for GitRepo {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn checkout(&mut self, version: &str) -> Result<String> {
        let listed = capture_git(&self.dir, &["tag", "-l", version])?;
        let is_tag = String::from_utf8_lossy(&listed).trim() == version;

        run_git(&self.dir, &["checkout", version])?;

        if is_tag {
            tracing::debug!(version, "checked out tag");
            return Ok(version.to_string());
        }
        let head = capture_git(&self.dir, &["rev-parse", "HEAD"])?;
        let commit = String::from_utf8_lossy(&head).trim().to_string();
        tracing::debug!(%commit, "checked out commit");
        Ok(commit)
    }

    fn diff_from(&self, from: &str) -> Result<Vec<u8>> {
        let range = format!("{from}..HEAD");
        capture_git(
            &self.dir,
            &[
                "diff",
                "--diff-algorithm=histogram",
                "--patch",
                "--unified=10",
                range.as_str(),
            ],
        )
    }

    fn tags(&self) -> Result<Vec<String>> {
        let out = capture_git(&self.dir, &["tag", "--sort=v:refname"])?;
        Ok(String::from_utf8_lossy(&out)
            .lines()
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    fn clean(&mut self) -> Result<()> {
        if let Some(scratch) = self.scratch.take() {
            scratch.close()?;
        }
        Ok(())
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if !status.success() {
        return Err(Error::Io(io::Error::other(format!(
            "git {} exited with {status}",
            args.join(" ")
        ))));
    }
    Ok(())
}

fn capture_git(dir: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stderr(Stdio::inherit())
        .output()?;
    if !output.status.success() {
        return Err(Error::Io(io::Error::other(format!(
            "git {} exited with {}",
            args.join(" "),
            output.status
        ))));
    }
    Ok(output.stdout)
}

/// The version an update projects: the explicit tag when given, otherwise
/// the latest semver tag of the repository.
pub fn resolve_version(repo: &dyn Repository, tag: &str) -> Result<String> {
    if tag.is_empty() {
        versions::latest(&repo.tags()?, "*")
    } else {
        Ok(tag.to_string())
    }
}
