//! Generational in-memory corpus store.
//!
//! Readers take a snapshot (`Arc<CorpusIndex>`) and release the lock before
//! doing any work. [`InMemoryCorpus::rebuild`] builds a complete new index
//! off-lock and swaps the pointer, so a search only ever sees one generation.

use super::index::CorpusIndex;
use async_trait::async_trait;
use docent_application::ports::corpus::CorpusStore;
use docent_domain::corpus::{DocPage, FetchedDoc, PageSummary, SearchHit};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Corpus store backed by an atomically swapped [`CorpusIndex`].
#[derive(Debug)]
pub struct InMemoryCorpus {
    current: RwLock<Arc<CorpusIndex>>,
    next_generation: AtomicU64,
    loaded: AtomicBool,
}

impl Default for InMemoryCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCorpus {
    /// An empty, uninitialized store.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(CorpusIndex::empty())),
            next_generation: AtomicU64::new(0),
            loaded: AtomicBool::new(false),
        }
    }

    /// A store already holding `pages`.
    pub fn with_pages(pages: Vec<DocPage>) -> Self {
        let corpus = Self::new();
        corpus.rebuild(pages);
        corpus
    }

    /// Current index generation (cheap pointer clone).
    pub fn snapshot(&self) -> Arc<CorpusIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build a new generation from `pages` and publish it.
    ///
    /// Returns the new generation number. If a newer generation was published
    /// while this one was building, the older build is discarded.
    pub fn rebuild(&self, pages: Vec<DocPage>) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let index = Arc::new(CorpusIndex::build(generation, pages));
        let page_count = index.page_count();
        let section_count = index.section_count();

        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if current.generation() > generation {
                debug!(
                    generation,
                    current = current.generation(),
                    "Discarding stale corpus build"
                );
                return current.generation();
            }
            *current = index;
        }

        if page_count > 0 {
            self.loaded.store(true, Ordering::SeqCst);
        }
        info!(generation, pages = page_count, sections = section_count, "Corpus index rebuilt");
        generation
    }

    /// Ids of all pages in the current generation.
    pub fn page_ids(&self) -> Vec<String> {
        self.snapshot().page_ids()
    }
}

#[async_trait]
impl CorpusStore for InMemoryCorpus {
    async fn list_pages(&self) -> Vec<PageSummary> {
        self.snapshot().list_pages()
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.snapshot().search(query, limit)
    }

    async fn fetch(&self, id: &str) -> FetchedDoc {
        self.snapshot().fetch(id)
    }

    fn is_initialized(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}
