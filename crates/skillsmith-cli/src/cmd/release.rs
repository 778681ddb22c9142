use crate::output::print_json;
use anyhow::Context;
use skillsmith_core::config::Config;
use skillsmith_core::release::prepare_release;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let report = prepare_release(root, &config)?;

    if json {
        print_json(&report)?;
    } else {
        println!("Prepared release assets at {}", report.bundle_root.display());
        println!("- JavaScript bundle root: {}", report.js_root.display());
        println!("- TypeScript bundle root: {}", report.ts_root.display());
    }
    Ok(())
}
