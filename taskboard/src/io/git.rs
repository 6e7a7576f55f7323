//! Git adapter used to locate the repository root.
//!
//! The state directory lives at the top of the checkout, so commands run
//! from a subdirectory resolve the toplevel first.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Return the checkout's top-level directory.
    #[instrument(skip_all)]
    pub fn toplevel(&self) -> Result<PathBuf> {
        let out = self.run_capture(&["rev-parse", "--show-toplevel"])?;
        let top = out.trim();
        if top.is_empty() {
            return Err(anyhow!("git rev-parse returned an empty toplevel"));
        }
        debug!(toplevel = %top, "resolved git toplevel");
        Ok(PathBuf::from(top))
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

/// Repository root for `start`: the git toplevel, or `start` itself when it
/// is not inside a checkout (or git is unavailable).
pub fn resolve_repo_root(start: &Path) -> PathBuf {
    match Git::new(start).toplevel() {
        Ok(top) => top,
        Err(err) => {
            debug!(start = %start.display(), err = %err, "not a git checkout, using start dir");
            start.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_workdir_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new(temp.path().join("gone"));
        assert!(git.toplevel().is_err());
        assert_eq!(
            resolve_repo_root(&temp.path().join("gone")),
            temp.path().join("gone")
        );
    }
}
