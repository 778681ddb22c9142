use crate::output::print_json;
use anyhow::Context;
use skillsmith_core::build::build_skills;
use skillsmith_core::bundle::EsbuildBundler;
use skillsmith_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let bundler = EsbuildBundler::new(root, config.bundle.clone());
    let report = build_skills(root, &config, &bundler)?;

    if json {
        print_json(&serde_json::json!({
            "generated_root": report.generated_root,
            "bundled": report.bundled,
            "copied": report.walk.copied,
            "renamed": report.walk.renamed,
        }))?;
    } else {
        println!(
            "Built {} ({} action scripts bundled, {} files copied)",
            report.generated_root.display(),
            report.bundled,
            report.walk.copied + report.walk.renamed
        );
    }
    Ok(())
}
