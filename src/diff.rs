//! Changed-file resolution against a base branch.
//!
//! Provides a [`ChangeSource`] trait so the reporter does not care where the
//! list of changed paths comes from; [`GitChanges`] asks `git diff`.
use std::path::PathBuf;
use std::process::Command;

use crate::convert::SOURCE_EXTENSION;
use crate::error::{JacocovError, Result};

/// A source for the list of paths that differ from a base branch.
pub trait ChangeSource {
    /// Repository-relative paths changed against `base_branch`, in the
    /// order the source reports them.
    fn changed_files(&self, base_branch: &str) -> Result<Vec<String>>;
}

/// Changes from `git diff --name-only <base>` (working tree vs branch).
#[derive(Debug, Default)]
pub struct GitChanges {
    /// Directory to run git in. Defaults to the current directory.
    pub repo: Option<PathBuf>,
}

impl ChangeSource for GitChanges {
    fn changed_files(&self, base_branch: &str) -> Result<Vec<String>> {
        let mut cmd = Command::new("git");
        cmd.args(["diff", "--name-only", base_branch]);
        if let Some(dir) = &self.repo {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;

        if !output.status.success() {
            return Err(JacocovError::Git {
                base: base_branch.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

/// Keep only source files of the language under analysis.
pub fn source_files(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    paths
        .into_iter()
        .filter(|p| p.ends_with(SOURCE_EXTENSION))
        .collect()
}

/// Changed source files against `base_branch`.
pub fn changed_sources(source: &dyn ChangeSource, base_branch: &str) -> Result<Vec<String>> {
    let changed = source_files(source.changed_files(base_branch)?);
    log::debug!("{} changed source files against {base_branch}", changed.len());
    Ok(changed)
}
