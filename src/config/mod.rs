//! Configuration loading and merging
//!
//! Handles loading from config files and CLI arguments with precedence
//! CLI > Env (credentials) > File > Defaults.

pub mod loader;
pub mod merge;

pub use loader::{load_config, FieldList, FileConfig};
pub use merge::{merge_cli_with_config, CliOverrides, PlatformDefaults, RunSettings};
