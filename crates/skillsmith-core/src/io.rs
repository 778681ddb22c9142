use crate::error::{Result, SkillsError};
use crate::paths;
use std::path::Path;
use tracing::debug;

/// Fail unless `path` exists and is a directory.
///
/// A path that cannot be stat'ed at all counts as missing.
pub fn ensure_directory(path: &Path, label: &str) -> Result<()> {
    let meta = std::fs::metadata(path).map_err(|_| SkillsError::MissingDirectory {
        label: label.to_string(),
        path: path.to_path_buf(),
    })?;
    if !meta.is_dir() {
        return Err(SkillsError::NotADirectory {
            label: label.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Fail when the output tree `path` equals, contains or sits inside `other`.
///
/// Output trees are wiped before they are written, so an overlap would
/// delete or recurse into an input tree.
pub fn ensure_disjoint(path: &Path, label: &str, other: &Path, other_label: &str) -> Result<()> {
    if paths::trees_overlap(path, other) {
        return Err(SkillsError::OverlappingTrees {
            label: label.to_string(),
            other: other_label.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// `rm -rf`: removing a path that does not exist is not an error.
pub fn remove_dir_force(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Names of the immediate subdirectories of `dir`, sorted.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Recursively copy `src` into `dest`, creating `dest` and its parents.
///
/// Regular files and directories are copied; anything else is ignored.
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<usize> {
    ensure_dir(dest)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dest.join(entry.file_name());
        if file_type.is_dir() {
            copied += copy_dir_all(&entry.path(), &target)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
