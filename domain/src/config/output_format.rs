//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished run is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Progress lines followed by the answer (default)
    #[default]
    Text,
    /// Every step as one JSON object per line
    Json,
}
