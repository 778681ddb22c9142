use crate::bundle::{bundle_all, ScriptBundler};
use crate::classify::WalkPolicy;
use crate::config::Config;
use crate::error::Result;
use crate::io::{ensure_directory, ensure_disjoint, remove_dir_force};
use crate::walk::{transform_tree, WalkReport};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub generated_root: PathBuf,
    pub walk: WalkReport,
    pub bundled: usize,
}

/// Rebuild the generated tree from the development tree.
///
/// The generated tree is deleted first. Any failure leaves a partial tree
/// behind; it is only valid after this returns `Ok`.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn build_skills(root: &Path, config: &Config, bundler: &dyn ScriptBundler) -> Result<BuildReport> {
    let dev_root = config.dev_root(root);
    let generated_root = config.generated_root(root);

    ensure_directory(&dev_root, &config.dev_dir)?;
    ensure_disjoint(&generated_root, &config.generated_dir, &dev_root, &config.dev_dir)?;
    remove_dir_force(&generated_root)?;

    let walk = transform_tree(
        &dev_root,
        &generated_root,
        &WalkPolicy::build(&config.tests_dir),
    )?;
    let bundled = bundle_all(bundler, &walk.actions)?;

    info!(
        copied = walk.copied,
        renamed = walk.renamed,
        bundled,
        "generated tree rebuilt"
    );
    Ok(BuildReport {
        generated_root,
        walk,
        bundled,
    })
}
