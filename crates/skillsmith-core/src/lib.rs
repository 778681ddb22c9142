pub mod build;
pub mod bundle;
pub mod classify;
pub mod config;
pub mod error;
pub mod git;
pub mod guard;
pub mod io;
pub mod paths;
pub mod release;
pub mod skill;
pub mod walk;

pub use error::{Result, SkillsError};
