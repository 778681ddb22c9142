use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEFAULT_DEV_DIR: &str = "dev";
pub const DEFAULT_GENERATED_DIR: &str = "skills";
pub const DEFAULT_RELEASE_DIR: &str = "dist/release-assets";
pub const DEFAULT_TESTS_DIR: &str = "__tests__";

pub const SCRIPTS_DIR: &str = "scripts";

pub const JS_BUNDLE_DIR: &str = "js";
pub const TS_BUNDLE_DIR: &str = "ts";
pub const BUNDLE_SKILLS_DIR: &str = "skills";

pub const CONFIG_FILE: &str = "skillsmith.yaml";

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// Metadata filename every shipped skill must use.
pub const SKILL_MD: &str = "SKILL.md";
/// Metadata filename used only under the development tree.
pub const SKILL_DEV_MD: &str = "SKILL.dev.md";

/// Extensions compiled by the bundler rather than copied.
pub const COMPILED_SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx"];
pub const RUNTIME_SCRIPT_EXTENSION: &str = "js";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `<release>/js/skills`: wholesale copy of the generated tree.
pub fn js_bundle_root(release_root: &Path) -> PathBuf {
    release_root.join(JS_BUNDLE_DIR).join(BUNDLE_SKILLS_DIR)
}

/// `<release>/ts/skills`: source-preserving copy of the development tree.
pub fn ts_bundle_root(release_root: &Path) -> PathBuf {
    release_root.join(TS_BUNDLE_DIR).join(BUNDLE_SKILLS_DIR)
}

pub fn skill_metadata_path(tree_root: &Path, skill: &str) -> PathBuf {
    tree_root.join(skill).join(SKILL_MD)
}

pub fn skill_dev_metadata_path(tree_root: &Path, skill: &str) -> PathBuf {
    tree_root.join(skill).join(SKILL_DEV_MD)
}

/// `echo.ts` -> `echo.js`. Only the last extension is replaced.
pub fn runtime_script_name(source_name: &Path) -> PathBuf {
    source_name.with_extension(RUNTIME_SCRIPT_EXTENSION)
}

/// `path` relative to `root`, or `path` itself when it is not below `root`.
pub fn display_relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// True when one tree equals or contains the other.
pub fn trees_overlap(a: &Path, b: &Path) -> bool {
    let a = normalize_lexically(a);
    let b = normalize_lexically(b);
    a.starts_with(&b) || b.starts_with(&a)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let release = Path::new("/tmp/proj/dist/release-assets");
        assert_eq!(
            js_bundle_root(release),
            PathBuf::from("/tmp/proj/dist/release-assets/js/skills")
        );
        assert_eq!(
            ts_bundle_root(release),
            PathBuf::from("/tmp/proj/dist/release-assets/ts/skills")
        );
        assert_eq!(
            skill_metadata_path(Path::new("/out"), "demo"),
            PathBuf::from("/out/demo/SKILL.md")
        );
        assert_eq!(
            config_path(Path::new("/tmp/proj")),
            PathBuf::from("/tmp/proj/skillsmith.yaml")
        );
    }

    #[test]
    fn runtime_script_name_replaces_last_extension() {
        assert_eq!(
            runtime_script_name(Path::new("echo.ts")),
            PathBuf::from("echo.js")
        );
        assert_eq!(
            runtime_script_name(Path::new("echo.cli.tsx")),
            PathBuf::from("echo.cli.js")
        );
    }

    #[test]
    fn display_relative_falls_back_to_full_path() {
        let root = Path::new("/a/dev");
        assert_eq!(
            display_relative(root, Path::new("/a/dev/demo/.env")),
            PathBuf::from("demo/.env")
        );
        assert_eq!(
            display_relative(root, Path::new("/elsewhere/x")),
            PathBuf::from("/elsewhere/x")
        );
    }

    #[test]
    fn overlap_is_component_wise() {
        let root = Path::new("/repo");
        assert!(trees_overlap(&root.join("dev"), &root.join("dev/")));
        assert!(trees_overlap(&root.join("./dev"), &root.join("dev/out")));
        assert!(trees_overlap(&root.join("dist/../dev"), &root.join("dev")));
        assert!(trees_overlap(&root.join("."), &root.join("dev")));
        assert!(!trees_overlap(&root.join("dev"), &root.join("devtools")));
        assert!(!trees_overlap(&root.join("dev"), &root.join("skills")));
    }

    #[test]
    fn normalize_lexically_keeps_leading_parents() {
        assert_eq!(
            normalize_lexically(Path::new("../a/./b/../c")),
            PathBuf::from("../a/c")
        );
        assert_eq!(normalize_lexically(Path::new("a/../..")), PathBuf::from(".."));
    }
}
