//! Configuration file loading for docent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DOCENT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./docent.toml` or `./.docent.toml`
//! 4. Global: `$XDG_CONFIG_HOME/docent/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileAnalyticsConfig, FileConfig, FileCorpusConfig,
    FileOutputConfig, FilePlannerConfig,
};
pub use loader::ConfigLoader;
