//! Per-entry classification for tree walks.
//!
//! Every walk (build, source bundle, generated-tree scan) asks
//! [`classify_entry`] what to do with each directory entry and executes the
//! returned [`Disposition`]. The deny-list lives in exactly one place,
//! [`is_forbidden_artifact`].

use crate::paths::{COMPILED_SOURCE_EXTENSIONS, SCRIPTS_DIR, SKILL_DEV_MD, SKILL_MD};
use std::path::{Component, Path};

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// True for files that must never appear in a tree being processed.
///
/// Matching is case-insensitive. `skills.md` is always denied; `skill.md` is
/// denied unless `allow_canonical_metadata` is set.
pub fn is_forbidden_artifact(name: &str, allow_canonical_metadata: bool) -> bool {
    let lower = name.to_lowercase();

    if lower == "skill.md" {
        return !allow_canonical_metadata;
    }

    lower == ".env"
        || lower.starts_with(".env.")
        || lower.ends_with(".pem")
        || lower.ends_with(".key")
        || lower.ends_with(".sqlite")
        || lower.ends_with(".log")
        || lower == "skills.md"
}

/// True when `name` carries an extension the bundler compiles.
pub fn is_compiled_source(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COMPILED_SOURCE_EXTENSIONS.contains(&ext))
}

/// True only for `<skill>/scripts/<file>.<ts|tsx>` exactly three segments
/// below `root`. Nested or top-level sources are not action scripts.
pub fn is_action_script_source_path(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    let mut segments = Vec::with_capacity(3);
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment),
            _ => return false,
        }
    }

    let [_, middle, file] = segments.as_slice() else {
        return false;
    };
    *middle == SCRIPTS_DIR && is_compiled_source(&file.to_string_lossy())
}

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Symlinks, sockets and the like. Never copied.
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// What a walk does with one entry.
///
/// For directories `Copy` means mirror and recurse, `Skip` drops the whole
/// subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Copy,
    Bundle,
    Rename(&'static str),
    Skip,
    Reject,
}

// ---------------------------------------------------------------------------
// WalkPolicy
// ---------------------------------------------------------------------------

/// The policy table driving a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkPolicy {
    /// Label used in forbidden-artifact errors ("dev", "generated").
    pub tree_label: &'static str,
    /// Directory name whose subtree is never walked. `None` walks everything.
    pub tests_dir: Option<String>,
    pub bundle_action_scripts: bool,
    pub skip_compiled_source: bool,
    /// Rename `SKILL.dev.md` to `SKILL.md`; when false it is rejected.
    pub rename_dev_metadata: bool,
    pub allow_canonical_metadata: bool,
}

impl WalkPolicy {
    /// `dev/` -> generated runtime tree.
    pub fn build(tests_dir: &str) -> Self {
        Self {
            tree_label: "dev",
            tests_dir: Some(tests_dir.to_string()),
            bundle_action_scripts: true,
            skip_compiled_source: true,
            rename_dev_metadata: true,
            allow_canonical_metadata: false,
        }
    }

    /// `dev/` -> source-preserving release bundle.
    pub fn source_bundle(tests_dir: &str) -> Self {
        Self {
            tree_label: "dev",
            tests_dir: Some(tests_dir.to_string()),
            bundle_action_scripts: false,
            skip_compiled_source: false,
            rename_dev_metadata: true,
            allow_canonical_metadata: false,
        }
    }

    /// Re-validation of an already generated tree before packaging.
    pub fn generated_scan() -> Self {
        Self {
            tree_label: "generated",
            tests_dir: None,
            bundle_action_scripts: false,
            skip_compiled_source: false,
            rename_dev_metadata: false,
            allow_canonical_metadata: true,
        }
    }
}

/// Decide what a walk rooted at `root` does with `path`.
pub fn classify_entry(policy: &WalkPolicy, root: &Path, path: &Path, kind: EntryKind) -> Disposition {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match kind {
        EntryKind::Other => Disposition::Skip,
        EntryKind::Dir => {
            if policy.tests_dir.as_deref() == Some(&*name) {
                Disposition::Skip
            } else {
                Disposition::Copy
            }
        }
        EntryKind::File => {
            if is_forbidden_artifact(&name, policy.allow_canonical_metadata) {
                return Disposition::Reject;
            }
            if name == SKILL_DEV_MD {
                return if policy.rename_dev_metadata {
                    Disposition::Rename(SKILL_MD)
                } else {
                    Disposition::Reject
                };
            }
            if policy.bundle_action_scripts && is_action_script_source_path(path, root) {
                return Disposition::Bundle;
            }
            if policy.skip_compiled_source && is_compiled_source(&name) {
                return Disposition::Skip;
            }
            Disposition::Copy
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
