//! Corpus store port
//!
//! Read-only access to the documentation corpus. Every operation is
//! infallible by contract: an empty or not-yet-built index yields empty
//! results and `found = false`, never an error.

use async_trait::async_trait;
use docent_domain::corpus::{FetchedDoc, PageSummary, SearchHit};

/// Port for the retrieval backend
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// All pages, ordered by title
    async fn list_pages(&self) -> Vec<PageSummary>;

    /// Ranked matches, best first. Identical index state gives identical output.
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit>;

    /// Look up one page by id
    async fn fetch(&self, id: &str) -> FetchedDoc;

    /// True once a corpus with at least one page has been loaded
    fn is_initialized(&self) -> bool;

    /// Build generation of the current index (0 = never built)
    fn generation(&self) -> u64 {
        0
    }
}
