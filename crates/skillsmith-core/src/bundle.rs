//! Action-script bundling.
//!
//! Every `scripts/*.ts` entry collected by the walker is compiled into one
//! self-contained CommonJS file. [`ScriptBundler`] is the only seam that
//! knows about a transformation engine; the default implementation shells
//! out to esbuild.
//!
//! # Runtime priority
//! 1. `esbuild` found on `PATH`
//! 2. `npx --yes esbuild`

use std::cell::OnceCell;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use crate::config::BundleConfig;
use crate::error::{Result, SkillsError};
use crate::walk::ActionScriptEntry;

pub trait ScriptBundler {
    /// Emit `entry.outfile` from `entry.source`.
    fn bundle(&self, entry: &ActionScriptEntry) -> Result<()>;
}

/// Bundle every entry in order, stopping at the first failure.
#[instrument(skip_all, fields(count = entries.len()))]
pub fn bundle_all(bundler: &dyn ScriptBundler, entries: &[ActionScriptEntry]) -> Result<usize> {
    for entry in entries {
        bundler.bundle(entry)?;
        debug!(outfile = %entry.outfile.display(), "bundled");
    }
    info!(count = entries.len(), "action scripts bundled");
    Ok(entries.len())
}

// ---------------------------------------------------------------------------
// Runtime detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundlerRuntime {
    Esbuild,
    Npx,
}

impl BundlerRuntime {
    pub fn name(&self) -> &'static str {
        match self {
            BundlerRuntime::Esbuild => "esbuild",
            BundlerRuntime::Npx => "esbuild (via npx)",
        }
    }

    fn command(&self) -> Command {
        match self {
            BundlerRuntime::Esbuild => Command::new("esbuild"),
            BundlerRuntime::Npx => {
                let mut cmd = Command::new("npx");
                cmd.args(["--yes", "esbuild"]);
                cmd
            }
        }
    }
}

/// Detect the best available way to run esbuild.
/// Returns None if neither esbuild nor npx is on PATH.
pub fn detect_runtime() -> Option<BundlerRuntime> {
    detect_runtime_in(std::env::var_os("PATH"))
}

/// [`detect_runtime`] against an explicit search path.
pub fn detect_runtime_in<P: AsRef<OsStr>>(search_path: Option<P>) -> Option<BundlerRuntime> {
    let cwd = std::env::current_dir().ok()?;
    let found = |name: &str| which::which_in(name, search_path.as_ref(), &cwd).is_ok();
    if found("esbuild") {
        return Some(BundlerRuntime::Esbuild);
    }
    if found("npx") {
        return Some(BundlerRuntime::Npx);
    }
    None
}

// ---------------------------------------------------------------------------
// EsbuildBundler
// ---------------------------------------------------------------------------

/// Runs esbuild once per entry as a blocking subprocess.
///
/// The runtime is detected on first use, so a build without action scripts
/// never needs esbuild installed.
pub struct EsbuildBundler {
    working_dir: PathBuf,
    options: BundleConfig,
    runtime: OnceCell<Option<BundlerRuntime>>,
}

impl EsbuildBundler {
    pub fn new(working_dir: &Path, options: BundleConfig) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            options,
            runtime: OnceCell::new(),
        }
    }

    /// Pin the runtime instead of detecting it.
    pub fn with_runtime(mut self, runtime: BundlerRuntime) -> Self {
        self.runtime = OnceCell::from(Some(runtime));
        self
    }

    /// esbuild arguments for one entry, without the program name.
    pub fn args(&self, entry: &ActionScriptEntry) -> Vec<String> {
        let mut args = vec![
            entry.source.to_string_lossy().into_owned(),
            "--bundle".to_string(),
            format!("--platform={}", self.options.platform),
            format!("--format={}", self.options.format),
            format!("--target={}", self.options.target),
            "--log-level=silent".to_string(),
            "--packages=bundle".to_string(),
        ];
        for (package, target) in &self.options.aliases {
            let resolved = self.working_dir.join(target);
            args.push(format!("--alias:{package}={}", resolved.display()));
        }
        args.push(format!("--outfile={}", entry.outfile.display()));
        args
    }
}

impl ScriptBundler for EsbuildBundler {
    fn bundle(&self, entry: &ActionScriptEntry) -> Result<()> {
        let runtime = (*self.runtime.get_or_init(detect_runtime)).ok_or(SkillsError::NoBundler)?;

        let mut cmd = runtime.command();
        cmd.args(self.args(entry))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(runtime = runtime.name(), source = %entry.source.display(), "running bundler");
        let output = cmd.output().map_err(|e| SkillsError::BundleFailed {
            entry: entry.source.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let hint = stderr.trim().chars().take(500).collect::<String>();
            let reason = if hint.is_empty() {
                format!("{} exited with {}", runtime.name(), output.status)
            } else {
                hint
            };
            return Err(SkillsError::BundleFailed {
                entry: entry.source.clone(),
                reason,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recording {
        seen: RefCell<Vec<PathBuf>>,
        fail_on: Option<&'static str>,
    }

    impl ScriptBundler for Recording {
        fn bundle(&self, entry: &ActionScriptEntry) -> Result<()> {
            self.seen.borrow_mut().push(entry.source.clone());
            if self.fail_on.is_some_and(|name| entry.source.ends_with(name)) {
                return Err(SkillsError::BundleFailed {
                    entry: entry.source.clone(),
                    reason: "unresolved import".into(),
                });
            }
            Ok(())
        }
    }

    fn entry(name: &str) -> ActionScriptEntry {
        ActionScriptEntry {
            source: PathBuf::from(format!("/r/dev/demo/scripts/{name}.ts")),
            outfile: PathBuf::from(format!("/r/skills/demo/scripts/{name}.js")),
        }
    }

    #[test]
    fn bundle_all_stops_at_first_failure() {
        let bundler = Recording {
            seen: RefCell::new(Vec::new()),
            fail_on: Some("b.ts"),
        };
        let entries = [entry("a"), entry("b"), entry("c")];
        let err = bundle_all(&bundler, &entries).unwrap_err();

        assert!(matches!(err, SkillsError::BundleFailed { .. }));
        assert_eq!(bundler.seen.borrow().len(), 2);
    }

    #[test]
    fn bundle_all_counts_entries() {
        let bundler = Recording {
            seen: RefCell::new(Vec::new()),
            fail_on: None,
        };
        assert_eq!(bundle_all(&bundler, &[entry("a"), entry("b")]).unwrap(), 2);
        assert_eq!(bundle_all(&bundler, &[]).unwrap(), 0);
    }

    #[test]
    fn esbuild_args_cover_contract() {
        let bundler = EsbuildBundler::new(Path::new("/r"), BundleConfig::default());
        let args = bundler.args(&entry("echo"));

        assert_eq!(args[0], "/r/dev/demo/scripts/echo.ts");
        for expected in [
            "--bundle",
            "--platform=node",
            "--format=cjs",
            "--target=node22",
            "--packages=bundle",
            "--alias:@agentic-athenaeum/contracts=/r/packages/contracts/src/index.ts",
            "--alias:@agentic-athenaeum/queries=/r/packages/queries/src/index.ts",
        ] {
            assert!(args.iter().any(|a| a == expected), "missing {expected}");
        }
        assert_eq!(args.last().unwrap(), "--outfile=/r/skills/demo/scripts/echo.js");
        assert!(!args.iter().any(|a| a.starts_with("--sourcemap")));
    }

    #[test]
    fn missing_source_is_a_bundle_failure() {
        // Either esbuild is absent (spawn error) or it rejects the missing
        // entry point; both must surface as BundleFailed.
        let dir = tempfile::TempDir::new().unwrap();
        let bundler = EsbuildBundler::new(dir.path(), BundleConfig::default())
            .with_runtime(BundlerRuntime::Esbuild);
        let missing = ActionScriptEntry {
            source: dir.path().join("dev/demo/scripts/nope.ts"),
            outfile: dir.path().join("skills/demo/scripts/nope.js"),
        };
        assert!(matches!(
            bundler.bundle(&missing),
            Err(SkillsError::BundleFailed { .. })
        ));
    }

    #[test]
    fn runtime_names_are_stable() {
        assert_eq!(BundlerRuntime::Esbuild.name(), "esbuild");
        assert_eq!(BundlerRuntime::Npx.name(), "esbuild (via npx)");
    }

    #[cfg(unix)]
    fn install_executable(dir: &Path, name: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn detect_runtime_prefers_esbuild_over_npx() {
        let bin = tempfile::TempDir::new().unwrap();
        assert_eq!(detect_runtime_in(Some(bin.path())), None);

        install_executable(bin.path(), "npx");
        assert_eq!(detect_runtime_in(Some(bin.path())), Some(BundlerRuntime::Npx));

        install_executable(bin.path(), "esbuild");
        assert_eq!(
            detect_runtime_in(Some(bin.path())),
            Some(BundlerRuntime::Esbuild)
        );
    }
}
