use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillsError {
    #[error("{label} directory is missing: {}", path.display())]
    MissingDirectory { label: String, path: PathBuf },

    #[error("{label} path is not a directory: {}", path.display())]
    NotADirectory { label: String, path: PathBuf },

    #[error("{label} directory overlaps the {other} directory: {}", path.display())]
    OverlappingTrees {
        label: String,
        other: String,
        path: PathBuf,
    },

    #[error("No skills found in {}", path.display())]
    NoSkills { path: PathBuf },

    #[error("Forbidden artifact in {tree} tree: {}", path.display())]
    ForbiddenArtifact { tree: String, path: PathBuf },

    #[error("failed to bundle {}: {reason}", entry.display())]
    BundleFailed { entry: PathBuf, reason: String },

    #[error("no bundler available: install esbuild or make npx available on PATH")]
    NoBundler,

    #[error("Missing SKILL.md in TypeScript bundle for {0}")]
    MissingCanonicalMetadata(String),

    #[error("SKILL.dev.md must not exist in TypeScript bundle for {0}")]
    LeakedDevMetadata(String),

    #[error("git {command} failed: {reason}")]
    Git { command: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SkillsError>;
