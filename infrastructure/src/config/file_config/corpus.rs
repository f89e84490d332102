//! Corpus and analytics configuration from TOML

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[corpus]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCorpusConfig {
    /// Directory of page JSON files, or one JSON array file
    pub path: Option<PathBuf>,
}

/// `[analytics]` section; no path disables analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalyticsConfig {
    pub path: Option<PathBuf>,
}
