pub mod build;
pub mod config;
pub mod guard;
pub mod list;
pub mod release;
