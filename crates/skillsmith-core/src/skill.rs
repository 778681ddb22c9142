//! Discovery of skill directories under the development tree.

use crate::classify::is_compiled_source;
use crate::error::Result;
use crate::io::list_subdirectories;
use crate::paths::{SCRIPTS_DIR, SKILL_DEV_MD};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    /// Number of `scripts/*.ts` action scripts.
    pub action_scripts: usize,
    pub has_tests: bool,
    pub has_dev_metadata: bool,
}

/// Summarise every top-level directory of `dev_root`, sorted by name.
pub fn list_skills(dev_root: &Path, tests_dir: &str) -> Result<Vec<SkillSummary>> {
    let mut skills = Vec::new();
    for name in list_subdirectories(dev_root)? {
        let dir = dev_root.join(&name);
        skills.push(SkillSummary {
            action_scripts: count_action_scripts(&dir.join(SCRIPTS_DIR))?,
            has_tests: dir.join(tests_dir).is_dir(),
            has_dev_metadata: dir.join(SKILL_DEV_MD).is_file(),
            name,
        });
    }
    Ok(skills)
}

fn count_action_scripts(scripts_dir: &Path) -> Result<usize> {
    if !scripts_dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in std::fs::read_dir(scripts_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && is_compiled_source(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}
