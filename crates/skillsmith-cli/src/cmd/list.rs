use crate::output::{print_json, print_table, yes_no};
use anyhow::Context;
use skillsmith_core::config::Config;
use skillsmith_core::io::ensure_directory;
use skillsmith_core::skill::list_skills;
use std::path::Path;

pub fn run(root: &Path, with_tests: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let dev_root = config.dev_root(root);
    ensure_directory(&dev_root, &config.dev_dir)?;

    let mut skills = list_skills(&dev_root, &config.tests_dir)
        .with_context(|| format!("failed to read {}", dev_root.display()))?;
    if with_tests {
        skills.retain(|s| s.has_tests);
    }

    if json {
        return print_json(&skills);
    }

    if skills.is_empty() {
        println!("No skills found in {}/", config.dev_dir);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = skills
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.action_scripts.to_string(),
                yes_no(s.has_tests),
                yes_no(s.has_dev_metadata),
            ]
        })
        .collect();
    print_table(&["SKILL", "SCRIPTS", "TESTS", "SKILL.dev.md"], &rows);
    Ok(())
}
