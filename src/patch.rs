//! Patch collaborator: applies a translated unified patch with `patch(1)`,
//! strip level 1, tolerant matching, removing files the patch empties.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

pub trait PatchApplier {
    fn apply(&self, dir: &Path, patch: &[u8]) -> Result<()>;
}

pub struct PatchTool;

impl PatchApplier for PatchTool {
    fn apply(&self, dir: &Path, patch: &[u8]) -> Result<()> {
        let mut child = Command::new("patch")
            .args([
                "-p1",
                "--force",
                "--fuzz=5",
                "--no-backup-if-mismatch",
                "--remove-empty-files",
            ])
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(patch)?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(Error::Io(io::Error::other(format!(
                "patch exited with {status}"
            ))));
        }
        tracing::info!(dir = %dir.display(), "patch applied");
        Ok(())
    }
}
