use crate::output::print_json;
use anyhow::Context;
use skillsmith_core::config::Config;
use skillsmith_core::git::GitCli;
use skillsmith_core::guard::{blocked_message, run_guard, Verdict};
use std::path::Path;

/// Runs as the pre-commit hook. A blocked commit exits 1 after the
/// offending paths have been unstaged.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let git = GitCli::new(root);
    let outcome = run_guard(&git, &config, |name| std::env::var(name).ok());

    match &outcome.verdict {
        Verdict::Allowed(reason) => {
            if json {
                print_json(&serde_json::json!({
                    "allowed": true,
                    "reason": reason.as_str(),
                    "branch": outcome.branch,
                }))?;
            }
            Ok(())
        }
        Verdict::Blocked(offenders) => {
            let branch = outcome.branch.as_deref().unwrap_or("HEAD");
            if json {
                print_json(&serde_json::json!({
                    "allowed": false,
                    "branch": branch,
                    "generated": offenders.generated,
                    "misplaced_metadata": offenders.misplaced_metadata,
                    "unstage_error": outcome.unstage_error,
                }))?;
            }
            eprint!("{}", blocked_message(&config, offenders, branch));
            std::process::exit(1);
        }
    }
}
