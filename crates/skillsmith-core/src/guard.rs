//! Pre-commit guard for the generated tree.
//!
//! Generated output is release-managed: hand-staged changes under the
//! generated directory, and canonical `SKILL.md` files anywhere else, are
//! unstaged and the commit is rejected. Release automation branches and the
//! override env vars bypass the check. Outside a repository the guard has
//! nothing to enforce and allows the commit.

use crate::config::Config;
use crate::git::GitRepo;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

// ---------------------------------------------------------------------------
// Branch and override checks
// ---------------------------------------------------------------------------

static SEMVER_RE: OnceLock<Regex> = OnceLock::new();

fn semver_re() -> &'static Regex {
    SEMVER_RE.get_or_init(|| {
        Regex::new(
            r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
        )
        .unwrap()
    })
}

/// True when `branch` is `prefix` immediately followed by a semantic version.
pub fn is_release_branch(branch: &str, prefix: &str) -> bool {
    branch
        .strip_prefix(prefix)
        .is_some_and(|version| semver_re().is_match(version))
}

/// True when any of `names` is set to `1` or `true`.
pub fn override_enabled<F>(names: &[String], lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .any(|name| matches!(lookup(name).as_deref(), Some("1") | Some("true")))
}

// ---------------------------------------------------------------------------
// Staged path classification
// ---------------------------------------------------------------------------

/// Staged paths the guard refuses to let through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Offenders {
    /// Paths under the generated tree.
    pub generated: Vec<String>,
    /// `SKILL.md` / `Skills.md` outside the generated tree.
    pub misplaced_metadata: Vec<String>,
}

impl Offenders {
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.misplaced_metadata.is_empty()
    }

    pub fn all(&self) -> Vec<String> {
        self.generated
            .iter()
            .chain(&self.misplaced_metadata)
            .cloned()
            .collect()
    }
}

fn is_canonical_metadata_name(path: &str) -> bool {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name == "skill.md" || name == "skills.md"
}

pub fn partition_staged(paths: &[String], generated_prefix: &str) -> Offenders {
    let mut offenders = Offenders::default();
    for path in paths {
        if path.starts_with(generated_prefix) {
            offenders.generated.push(path.clone());
        } else if is_canonical_metadata_name(path) {
            offenders.misplaced_metadata.push(path.clone());
        }
    }
    offenders
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    ReleaseBranch,
    Override,
    Clean,
    /// A read-only git query failed; there is no repository to guard.
    NotARepository,
}

impl AllowReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowReason::ReleaseBranch => "release_branch",
            AllowReason::Override => "override",
            AllowReason::Clean => "clean",
            AllowReason::NotARepository => "not_a_repository",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed(AllowReason),
    Blocked(Offenders),
}

/// Branch/override bypass, checked before the staging area is read.
pub fn bypass_reason(config: &Config, branch: &str, override_active: bool) -> Option<AllowReason> {
    if is_release_branch(branch, &config.guard.release_branch_prefix) {
        return Some(AllowReason::ReleaseBranch);
    }
    if override_active {
        return Some(AllowReason::Override);
    }
    None
}

pub fn evaluate(config: &Config, branch: &str, override_active: bool, staged: &[String]) -> Verdict {
    if let Some(reason) = bypass_reason(config, branch, override_active) {
        return Verdict::Allowed(reason);
    }
    let offenders = partition_staged(staged, &config.generated_path_prefix());
    if offenders.is_empty() {
        Verdict::Allowed(AllowReason::Clean)
    } else {
        Verdict::Blocked(offenders)
    }
}

// ---------------------------------------------------------------------------
// Running against a repository
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub branch: Option<String>,
    pub verdict: Verdict,
    /// Set when unstaging the offenders failed. The verdict is unchanged.
    pub unstage_error: Option<String>,
}

impl GuardOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self.verdict, Verdict::Blocked(_))
    }
}

/// Evaluate the staging area and unstage offenders when blocked.
#[instrument(skip_all)]
pub fn run_guard<F>(git: &dyn GitRepo, config: &Config, env: F) -> GuardOutcome
where
    F: Fn(&str) -> Option<String>,
{
    let allowed = |branch: Option<String>, reason: AllowReason| {
        debug!(reason = reason.as_str(), "commit allowed");
        GuardOutcome {
            branch,
            verdict: Verdict::Allowed(reason),
            unstage_error: None,
        }
    };

    let branch = match git.current_branch() {
        Ok(branch) => branch,
        Err(e) => {
            debug!(error = %e, "cannot read branch; skipping guard");
            return allowed(None, AllowReason::NotARepository);
        }
    };

    let override_active = override_enabled(&config.guard.override_envs, env);
    if let Some(reason) = bypass_reason(config, &branch, override_active) {
        return allowed(Some(branch), reason);
    }

    let staged = match git.staged_paths() {
        Ok(staged) => staged,
        Err(e) => {
            debug!(error = %e, "cannot read staged paths; skipping guard");
            return allowed(Some(branch), AllowReason::NotARepository);
        }
    };

    match evaluate(config, &branch, override_active, &staged) {
        Verdict::Allowed(reason) => allowed(Some(branch), reason),
        Verdict::Blocked(offenders) => {
            let unstage_error = git.unstage(&offenders.all()).err().map(|e| {
                warn!(error = %e, "failed to unstage blocked paths");
                e.to_string()
            });
            GuardOutcome {
                branch: Some(branch),
                verdict: Verdict::Blocked(offenders),
                unstage_error,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// The stderr report printed when a commit is blocked.
pub fn blocked_message(config: &Config, offenders: &Offenders, branch: &str) -> String {
    let generated = config.generated_path_prefix();
    let dev = format!("{}/", config.dev_dir.trim_end_matches('/'));
    let override_hint = config
        .guard
        .override_envs
        .first()
        .map(|name| format!("{name}=1 git commit ..."));

    let mut lines: Vec<String> = Vec::new();

    if !offenders.generated.is_empty() {
        lines.push(format!("[guard] blocked staged changes under {generated}"));
        lines.push(String::new());
        lines.push("Generated runtime files are release-managed.".to_string());
        lines.push(format!("Current branch: {branch}"));
        lines.push(String::new());
        lines.push("The following files were unstaged:".to_string());
        lines.extend(offenders.generated.iter().map(|p| format!("- {p}")));
        lines.push(String::new());
    }

    if !offenders.misplaced_metadata.is_empty() {
        lines.push("[guard] blocked misplaced SKILL.md/Skills.md files".to_string());
        lines.push(String::new());
        lines.push(format!(
            "SKILL.md/Skills.md must only exist in generated {generated} directory."
        ));
        lines.push(format!("Source files in {dev} must be named SKILL.dev.md."));
        lines.push(String::new());
        lines.push("The following files were unstaged:".to_string());
        lines.extend(offenders.misplaced_metadata.iter().map(|p| format!("- {p}")));
        lines.push(String::new());
    }

    lines.push("How to proceed:".to_string());
    lines.push(format!("1) Commit source changes from {dev} only."));
    lines.push(format!(
        "2) If this is release generation, use branch {}*.",
        config.guard.release_branch_prefix
    ));
    if let Some(hint) = override_hint {
        lines.push(format!("3) For intentional local override, run: {hint}"));
    }
    lines.push(String::new());

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
