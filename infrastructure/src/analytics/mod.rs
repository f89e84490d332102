//! Analytics adapters.

mod jsonl;

pub use jsonl::JsonlAnalyticsSink;
