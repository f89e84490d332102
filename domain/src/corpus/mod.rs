//! Documentation corpus domain.
//!
//! The corpus is a fixed set of [`DocPage`]s produced by an external
//! ingestion pipeline. The agent only ever reads it, through the
//! `CorpusStore` port in the application layer:
//!
//! ```text
//! list_pages() ──▶ PageSummary*      (what exists, shown to the planner)
//! search(q, n) ──▶ SearchHit*        (ranked section excerpts)
//! fetch(id)    ──▶ FetchedDoc        (found = false is data, not an error)
//! ```

pub mod entities;

pub use entities::{DocPage, DocSection, FetchedDoc, PageSummary, SearchHit, make_snippet};
