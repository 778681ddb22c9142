//! Recursive tree transform driven by a [`WalkPolicy`].
//!
//! The walker does not decide anything itself: it asks
//! [`classify_entry`] for each entry and carries out the disposition.
//! Action scripts are returned to the caller instead of being bundled here.

use crate::classify::{classify_entry, Disposition, EntryKind, WalkPolicy};
use crate::error::{Result, SkillsError};
use crate::io::ensure_dir;
use crate::paths::{display_relative, runtime_script_name};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// One action script waiting to be bundled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionScriptEntry {
    pub source: PathBuf,
    pub outfile: PathBuf,
}

/// What a walk did. `actions` is in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub actions: Vec<ActionScriptEntry>,
    pub copied: usize,
    pub renamed: usize,
    pub skipped_files: usize,
    pub skipped_dirs: usize,
}

/// Mirror `src_root` into `dest_root` according to `policy`.
///
/// Fails on the first forbidden artifact. Whatever was written before the
/// failure stays on disk; callers rebuild from scratch.
#[instrument(skip_all, fields(src = %src_root.display(), dest = %dest_root.display()))]
pub fn transform_tree(src_root: &Path, dest_root: &Path, policy: &WalkPolicy) -> Result<WalkReport> {
    let mut report = WalkReport::default();
    walk_dir(src_root, src_root, Some(dest_root), policy, &mut report)?;
    debug!(
        actions = report.actions.len(),
        copied = report.copied,
        renamed = report.renamed,
        "tree transformed"
    );
    Ok(report)
}

/// Walk `root` without writing anything, failing on the first rejected entry.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan_tree(root: &Path, policy: &WalkPolicy) -> Result<()> {
    let mut report = WalkReport::default();
    walk_dir(root, root, None, policy, &mut report)
}

fn walk_dir(
    root: &Path,
    src_dir: &Path,
    dest_dir: Option<&Path>,
    policy: &WalkPolicy,
    report: &mut WalkReport,
) -> Result<()> {
    if let Some(dest) = dest_dir {
        ensure_dir(dest)?;
    }

    for entry in std::fs::read_dir(src_dir)? {
        let entry = entry?;
        let path = entry.path();
        let kind = EntryKind::from_file_type(entry.file_type()?);
        let dest_path = dest_dir.map(|d| d.join(entry.file_name()));

        match (kind, classify_entry(policy, root, &path, kind)) {
            (EntryKind::Dir, Disposition::Skip) => {
                debug!(path = %path.display(), "skipping directory");
                report.skipped_dirs += 1;
            }
            (EntryKind::Dir, _) => {
                walk_dir(root, &path, dest_path.as_deref(), policy, report)?;
            }
            (_, Disposition::Reject) => {
                return Err(SkillsError::ForbiddenArtifact {
                    tree: policy.tree_label.to_string(),
                    path: display_relative(root, &path),
                });
            }
            (_, Disposition::Skip) => {
                report.skipped_files += 1;
            }
            (_, Disposition::Bundle) => {
                if let Some(dest) = dest_dir {
                    let outfile = dest.join(runtime_script_name(Path::new(&entry.file_name())));
                    debug!(source = %path.display(), outfile = %outfile.display(), "queued action script");
                    report.actions.push(ActionScriptEntry {
                        source: path,
                        outfile,
                    });
                }
            }
            (_, Disposition::Rename(target)) => {
                if let Some(dest) = dest_dir {
                    std::fs::copy(&path, dest.join(target))?;
                    report.renamed += 1;
                }
            }
            (_, Disposition::Copy) => {
                if let Some(dest) = dest_path {
                    std::fs::copy(&path, dest)?;
                    report.copied += 1;
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
