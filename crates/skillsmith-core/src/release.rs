//! Release asset assembly.
//!
//! Produces two sibling trees under the release directory:
//! - `js/skills`: the generated runtime tree, copied as-is after a re-scan
//! - `ts/skills`: the development tree with sources kept and metadata renamed
//!
//! The release directory is scratch space: it is wiped up front and a
//! failed run leaves whatever was written in place.

use crate::classify::WalkPolicy;
use crate::config::Config;
use crate::error::{Result, SkillsError};
use crate::io::{
    copy_dir_all, ensure_dir, ensure_directory, ensure_disjoint, list_subdirectories,
    remove_dir_force,
};
use crate::paths;
use crate::walk::{scan_tree, transform_tree};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub bundle_root: PathBuf,
    pub js_root: PathBuf,
    pub ts_root: PathBuf,
    pub skills: Vec<String>,
}

#[instrument(skip_all, fields(root = %root.display()))]
pub fn prepare_release(root: &Path, config: &Config) -> Result<ReleaseReport> {
    let dev_root = config.dev_root(root);
    let generated_root = config.generated_root(root);
    let bundle_root = config.release_root(root);
    let js_root = paths::js_bundle_root(&bundle_root);
    let ts_root = paths::ts_bundle_root(&bundle_root);

    ensure_directory(&dev_root, &config.dev_dir)?;
    ensure_directory(&generated_root, &config.generated_dir)?;
    ensure_disjoint(&bundle_root, &config.release_dir, &dev_root, &config.dev_dir)?;
    ensure_disjoint(&bundle_root, &config.release_dir, &generated_root, &config.generated_dir)?;

    let skills = list_subdirectories(&dev_root)?;
    if skills.is_empty() {
        return Err(SkillsError::NoSkills { path: dev_root });
    }
    debug!(count = skills.len(), "skills discovered");

    remove_dir_force(&bundle_root)?;
    ensure_dir(&bundle_root)?;

    scan_tree(&generated_root, &WalkPolicy::generated_scan())?;
    let copied = copy_dir_all(&generated_root, &js_root)?;
    debug!(copied, "runtime bundle written");

    transform_tree(
        &dev_root,
        &ts_root,
        &WalkPolicy::source_bundle(&config.tests_dir),
    )?;
    validate_source_bundle(&ts_root, &skills)?;

    info!(bundle_root = %bundle_root.display(), skills = skills.len(), "release assets prepared");
    Ok(ReleaseReport {
        bundle_root,
        js_root,
        ts_root,
        skills,
    })
}

/// Every skill must ship `SKILL.md` and must not ship `SKILL.dev.md`.
pub fn validate_source_bundle(ts_root: &Path, skills: &[String]) -> Result<()> {
    for skill in skills {
        let canonical = paths::skill_metadata_path(ts_root, skill);
        if !canonical.is_file() {
            return Err(SkillsError::MissingCanonicalMetadata(skill.clone()));
        }

        let dev_only = paths::skill_dev_metadata_path(ts_root, skill);
        match std::fs::symlink_metadata(&dev_only) {
            Ok(_) => return Err(SkillsError::LeakedDevMetadata(skill.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
