//! JSONL analytics sink.
//!
//! Appends one JSON object per line: `tool_call` records for every executed
//! tool and a `resolution` record when a run finishes.

use docent_application::ports::analytics::{AnalyticsSink, Resolution};
use docent_domain::ToolResult;
use docent_domain::util::truncate_with_ellipsis;
use serde_json::{Map, Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Questions longer than this are cut in resolution records
const QUESTION_MAX_BYTES: usize = 1_000;

/// Analytics sink writing JSONL records.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlAnalyticsSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAnalyticsSink {
    /// Open (or create) the file at `path` for appending.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create analytics directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open analytics file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, event_type: &str, mut record: Map<String, Value>) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        record.insert("type".to_string(), Value::String(event_type.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl AnalyticsSink for JsonlAnalyticsSink {
    fn on_tool_call(
        &self,
        run_id: u64,
        tool_name: &str,
        arguments: &Map<String, Value>,
        result: &ToolResult,
    ) {
        self.write(
            "tool_call",
            into_map(json!({
                "run_id": run_id,
                "tool": tool_name,
                "arguments": arguments,
                "success": result.is_success(),
                "error_code": result.error().map(|e| e.code.clone()),
                "duration_ms": result.metadata.duration_ms,
                "match_count": result.metadata.match_count,
            })),
        );
    }

    fn on_resolution(&self, run_id: u64, question: &str, resolution: Resolution) {
        self.write(
            "resolution",
            into_map(json!({
                "run_id": run_id,
                "question": truncate_with_ellipsis(question, QUESTION_MAX_BYTES),
                "resolution": resolution.as_str(),
            })),
        );
    }
}

impl Drop for JsonlAnalyticsSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
