use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BundleConfig
// ---------------------------------------------------------------------------

pub const VALID_PLATFORMS: &[&str] = &["node", "browser", "neutral"];
pub const VALID_FORMATS: &[&str] = &["cjs", "esm", "iife"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_format")]
    pub format: String,
    /// Package name -> entry file, relative to the repo root.
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_target() -> String {
    "node22".to_string()
}

fn default_platform() -> String {
    "node".to_string()
}

fn default_format() -> String {
    "cjs".to_string()
}

fn default_aliases() -> BTreeMap<String, String> {
    ["contracts", "queries"]
        .into_iter()
        .map(|pkg| {
            (
                format!("@agentic-athenaeum/{pkg}"),
                format!("packages/{pkg}/src/index.ts"),
            )
        })
        .collect()
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            platform: default_platform(),
            format: default_format(),
            aliases: default_aliases(),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Branch prefix followed by a semantic version, e.g.
    /// `automation/release-generated-v1.2.3`.
    #[serde(default = "default_release_branch_prefix")]
    pub release_branch_prefix: String,
    /// Env vars that bypass the guard when set to `1` or `true`.
    #[serde(default = "default_override_envs")]
    pub override_envs: Vec<String>,
}

fn default_release_branch_prefix() -> String {
    "automation/release-generated-v".to_string()
}

fn default_override_envs() -> Vec<String> {
    vec![
        "ALLOW_SKILLS_COMMIT".to_string(),
        "RELEASE_AUTOMATION".to_string(),
    ]
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            release_branch_prefix: default_release_branch_prefix(),
            override_envs: default_override_envs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_dev_dir")]
    pub dev_dir: String,
    #[serde(default = "default_generated_dir")]
    pub generated_dir: String,
    #[serde(default = "default_release_dir")]
    pub release_dir: String,
    #[serde(default = "default_tests_dir")]
    pub tests_dir: String,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub guard: GuardConfig,
}

fn default_dev_dir() -> String {
    paths::DEFAULT_DEV_DIR.to_string()
}

fn default_generated_dir() -> String {
    paths::DEFAULT_GENERATED_DIR.to_string()
}

fn default_release_dir() -> String {
    paths::DEFAULT_RELEASE_DIR.to_string()
}

fn default_tests_dir() -> String {
    paths::DEFAULT_TESTS_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dev_dir: default_dev_dir(),
            generated_dir: default_generated_dir(),
            release_dir: default_release_dir(),
            tests_dir: default_tests_dir(),
            bundle: BundleConfig::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl Config {
    /// Load `skillsmith.yaml` from `root`; a missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn dev_root(&self, root: &Path) -> PathBuf {
        root.join(&self.dev_dir)
    }

    pub fn generated_root(&self, root: &Path) -> PathBuf {
        root.join(&self.generated_dir)
    }

    pub fn release_root(&self, root: &Path) -> PathBuf {
        root.join(&self.release_dir)
    }

    /// Repo-relative prefix of staged generated files, always `/`-terminated.
    pub fn generated_path_prefix(&self) -> String {
        format!("{}/", self.generated_dir.trim_end_matches('/'))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let error = |message: String| ConfigWarning {
            level: WarnLevel::Error,
            message,
        };
        let warning = |message: String| ConfigWarning {
            level: WarnLevel::Warning,
            message,
        };

        // 1. Directory names must be set
        for (key, value) in [
            ("dev_dir", &self.dev_dir),
            ("generated_dir", &self.generated_dir),
            ("release_dir", &self.release_dir),
            ("tests_dir", &self.tests_dir),
        ] {
            if value.trim().is_empty() {
                warnings.push(error(format!("{key} must not be empty")));
            }
        }

        // 2. Output trees are wiped before writing; they must not overlap inputs
        for (output_key, output, input_key, input) in [
            ("generated_dir", &self.generated_dir, "dev_dir", &self.dev_dir),
            ("release_dir", &self.release_dir, "dev_dir", &self.dev_dir),
            ("release_dir", &self.release_dir, "generated_dir", &self.generated_dir),
        ] {
            if paths::trees_overlap(&root.join(output), &root.join(input)) {
                warnings.push(error(format!(
                    "{output_key} '{output}' overlaps {input_key} '{input}'"
                )));
            }
        }

        // 3. Bundler options
        if !VALID_PLATFORMS.contains(&self.bundle.platform.as_str()) {
            warnings.push(error(format!(
                "unknown bundle.platform '{}' (expected one of: {})",
                self.bundle.platform,
                VALID_PLATFORMS.join(", ")
            )));
        }
        if !VALID_FORMATS.contains(&self.bundle.format.as_str()) {
            warnings.push(error(format!(
                "unknown bundle.format '{}' (expected one of: {})",
                self.bundle.format,
                VALID_FORMATS.join(", ")
            )));
        }
        if self.bundle.target.trim().is_empty() {
            warnings.push(error("bundle.target must not be empty".to_string()));
        }
        for (package, target) in &self.bundle.aliases {
            if !root.join(target).exists() {
                warnings.push(warning(format!(
                    "alias '{package}' points at missing file '{target}'"
                )));
            }
        }

        // 4. Guard
        if self.guard.release_branch_prefix.is_empty() {
            warnings.push(error("guard.release_branch_prefix must not be empty".to_string()));
        }
        if self.guard.override_envs.is_empty() {
            warnings.push(warning(
                "guard.override_envs is empty; the guard can only be bypassed on release branches"
                    .to_string(),
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.dev_root(dir.path()), dir.path().join("dev"));
        assert_eq!(
            cfg.release_root(dir.path()),
            dir.path().join("dist/release-assets")
        );
        assert_eq!(cfg.generated_path_prefix(), "skills/");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("skillsmith.yaml"),
            "generated_dir: out/skills/\nbundle:\n  target: node20\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.generated_dir, "out/skills/");
        assert_eq!(cfg.generated_path_prefix(), "out/skills/");
        assert_eq!(cfg.bundle.target, "node20");
        assert_eq!(cfg.bundle.format, "cjs");
        assert_eq!(cfg.bundle.aliases.len(), 2);
        assert_eq!(cfg.dev_dir, "dev");
        assert_eq!(cfg.guard, GuardConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("skillsmith.yaml"), "dev_dir: [unclosed").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn validate_defaults_only_warn_about_missing_aliases() {
        let dir = TempDir::new().unwrap();
        let warnings = Config::default().validate(dir.path());
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
        assert!(warnings[0].message.contains("@agentic-athenaeum/contracts"));

        std::fs::create_dir_all(dir.path().join("packages/contracts/src")).unwrap();
        std::fs::write(dir.path().join("packages/contracts/src/index.ts"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("packages/queries/src")).unwrap();
        std::fs::write(dir.path().join("packages/queries/src/index.ts"), "").unwrap();
        assert!(Config::default().validate(dir.path()).is_empty());
    }

    #[test]
    fn validate_overlapping_directories() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.bundle.aliases.clear();
        cfg.generated_dir = "dev/".to_string();
        cfg.release_dir = "dev/release".to_string();
        let warnings = cfg.validate(dir.path());
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "generated_dir 'dev/' overlaps dev_dir 'dev'",
                "release_dir 'dev/release' overlaps dev_dir 'dev'",
                "release_dir 'dev/release' overlaps generated_dir 'dev/'",
            ]
        );
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_unknown_bundle_options() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.bundle.platform = "deno".to_string();
        cfg.bundle.format = "umd".to_string();
        cfg.bundle.aliases.clear();
        let warnings = cfg.validate(dir.path());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("bundle.platform 'deno'"));
        assert!(warnings[1].message.contains("bundle.format 'umd'"));
    }

    #[test]
    fn validate_empty_override_envs_warns() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.bundle.aliases.clear();
        cfg.guard.override_envs.clear();
        let warnings = cfg.validate(dir.path());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }
}
