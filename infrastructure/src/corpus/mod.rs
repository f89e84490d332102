//! Corpus adapters: the in-memory index and its filesystem loader.

pub mod index;
pub mod loader;
pub mod memory;

pub use index::CorpusIndex;
pub use loader::{CorpusLoadError, CorpusLoader};
pub use memory::InMemoryCorpus;
