//! Thin wrapper around the `git` subprocess calls the commit guard needs.

use crate::error::{Result, SkillsError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, instrument};

/// The staging-area view the commit guard works against.
pub trait GitRepo {
    /// Short name of the checked-out branch (`HEAD` when detached).
    fn current_branch(&self) -> Result<String>;
    /// Paths staged for commit (added, copied, modified, renamed or deleted),
    /// relative to the working directory. Changes outside it are not listed.
    fn staged_paths(&self) -> Result<Vec<String>>;
    /// Remove `paths` (as returned by `staged_paths`) from the index, leaving
    /// the working tree untouched.
    fn unstage(&self, paths: &[String]) -> Result<()>;
}

/// [`GitRepo`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(?args, "git");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SkillsError::Git {
                command: args.first().copied().unwrap_or_default().to_string(),
                reason: e.to_string(),
            })
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let out = self.run(args)?;
        if !out.status.success() {
            return Err(SkillsError::Git {
                command: args.first().copied().unwrap_or_default().to_string(),
                reason: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl GitRepo for GitCli {
    fn current_branch(&self) -> Result<String> {
        let out = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn staged_paths(&self) -> Result<Vec<String>> {
        let out = self.run_checked(&[
            "diff",
            "--cached",
            "--name-only",
            "--relative",
            "--diff-filter=ACMRD",
            "-z",
        ])?;
        Ok(parse_nul_separated(&out))
    }

    #[instrument(skip_all, fields(count = paths.len()))]
    fn unstage(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["restore", "--staged", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_checked(&args)?;
        Ok(())
    }
}

/// Split `-z` output, dropping empty records.
pub fn parse_nul_separated(out: &str) -> Vec<String> {
    out.split('\0')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nul_separated_drops_empty_records() {
        assert_eq!(
            parse_nul_separated("skills/a.js\0dev/b.ts\0"),
            vec!["skills/a.js".to_string(), "dev/b.ts".to_string()]
        );
        assert!(parse_nul_separated("").is_empty());
    }

    #[test]
    fn paths_with_spaces_survive() {
        assert_eq!(
            parse_nul_separated("dev/my skill/SKILL.md\0"),
            vec!["dev/my skill/SKILL.md".to_string()]
        );
    }

    #[test]
    fn outside_a_repository_queries_fail() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::new(dir.path());
        assert_eq!(git.workdir(), dir.path());
        // Either git is missing or the directory is not a repository.
        assert!(git.current_branch().is_err());
    }

    fn git_in(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .stdout(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn staged_paths_are_relative_to_a_nested_workdir() {
        if which::which("git").is_err() {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("tools");
        std::fs::create_dir_all(nested.join("skills/demo")).unwrap();
        std::fs::write(nested.join("skills/demo/echo.js"), "1;\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "top\n").unwrap();
        git_in(dir.path(), &["init", "-q"]);
        git_in(dir.path(), &["commit", "-q", "--allow-empty", "-m", "init"]);
        git_in(dir.path(), &["add", "."]);

        let git = GitCli::new(&nested);
        let staged = git.staged_paths().unwrap();
        assert_eq!(staged, vec!["skills/demo/echo.js".to_string()]);

        git.unstage(&staged).unwrap();
        assert!(git.staged_paths().unwrap().is_empty());
        assert_eq!(
            GitCli::new(dir.path()).staged_paths().unwrap(),
            vec!["README.md".to_string()]
        );
    }
}
