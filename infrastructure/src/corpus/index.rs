//! Deterministic in-memory full-text index over documentation sections.
//!
//! One [`CorpusIndex`] is one immutable generation: it is built completely
//! before anyone can search it and never changes afterwards.

use docent_domain::corpus::{DocPage, FetchedDoc, PageSummary, SearchHit, make_snippet};
use std::collections::HashMap;

const TITLE_BOOST: f64 = 3.0;
const HEADING_BOOST: f64 = 2.0;
const CONTENT_BOOST: f64 = 1.0;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "i", "if", "in", "is", "it", "its", "me", "my", "of", "on", "or", "so", "that", "the",
    "this", "to", "was", "what", "when", "where", "which", "who", "why", "with", "you", "your",
];

/// Split text into normalized search terms.
///
/// ```
/// use docent_infrastructure::corpus::index::tokenize;
///
/// assert_eq!(tokenize("How do I create Backups?"), vec!["creat", "backup"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Strip a few common English suffixes so inflections share a term.
fn stem(word: &str) -> String {
    let mut w = word;
    if w.len() > 5 && w.ends_with("ing") {
        w = &w[..w.len() - 3];
    } else if w.len() > 4 && w.ends_with("ed") {
        w = &w[..w.len() - 2];
    } else if w.len() > 4
        && (w.ends_with("sses") || w.ends_with("xes") || w.ends_with("ches") || w.ends_with("shes"))
    {
        w = &w[..w.len() - 2];
    } else if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
        w = &w[..w.len() - 1];
    }
    if w.len() > 4 && w.ends_with('e') {
        w = &w[..w.len() - 1];
    }
    w.to_string()
}

#[derive(Debug, Clone, Copy)]
struct SectionRef {
    page: usize,
    section: usize,
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    section: usize,
    /// Boost-weighted term frequency
    weight: f64,
}

/// One immutable build of the corpus index.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    generation: u64,
    /// Pages ordered by title, then id
    pages: Vec<DocPage>,
    by_id: HashMap<String, usize>,
    sections: Vec<SectionRef>,
    postings: HashMap<String, Vec<Posting>>,
}

impl CorpusIndex {
    /// An index with no pages (generation 0).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a complete index from `pages`. A later page with a duplicate id
    /// replaces the earlier one.
    pub fn build(generation: u64, pages: Vec<DocPage>) -> Self {
        let mut unique: HashMap<String, DocPage> = HashMap::new();
        for page in pages {
            unique.insert(page.id.clone(), page);
        }
        let mut pages: Vec<DocPage> = unique.into_values().collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

        let by_id = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let mut sections = Vec::new();
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();

        for (page_idx, page) in pages.iter().enumerate() {
            for (section_idx, section) in page.sections.iter().enumerate() {
                let section_id = sections.len();
                sections.push(SectionRef {
                    page: page_idx,
                    section: section_idx,
                });

                let mut weights: HashMap<String, f64> = HashMap::new();
                for (text, boost) in [
                    (page.title.as_str(), TITLE_BOOST),
                    (section.heading.as_str(), HEADING_BOOST),
                    (section.content.as_str(), CONTENT_BOOST),
                ] {
                    for term in tokenize(text) {
                        *weights.entry(term).or_default() += boost;
                    }
                }
                for (term, weight) in weights {
                    postings.entry(term).or_default().push(Posting {
                        section: section_id,
                        weight,
                    });
                }
            }
        }

        Self {
            generation,
            pages,
            by_id,
            sections,
            postings,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn list_pages(&self) -> Vec<PageSummary> {
        self.pages.iter().map(DocPage::summary).collect()
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.id.clone()).collect()
    }

    pub fn fetch(&self, id: &str) -> FetchedDoc {
        self.by_id
            .get(id)
            .map(|&i| FetchedDoc::found(&self.pages[i]))
            .unwrap_or_else(|| FetchedDoc::missing(id))
    }

    /// Rank sections against `query` (any term may match).
    ///
    /// Ties are broken by page id, then heading, then section order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        if limit == 0 || self.sections.is_empty() {
            return Vec::new();
        }

        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();

        let total = self.sections.len() as f64;
        let mut scores: HashMap<usize, f64> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let idf = (1.0 + total / postings.len() as f64).ln();
            for posting in postings {
                *scores.entry(posting.section).or_default() += posting.weight * idf;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
        ranked.sort_by(|(a, score_a), (b, score_b)| {
            let (ra, rb) = (self.sections[*a], self.sections[*b]);
            let (pa, pb) = (&self.pages[ra.page], &self.pages[rb.page]);
            score_b
                .total_cmp(score_a)
                .then_with(|| pa.id.cmp(&pb.id))
                .then_with(|| {
                    pa.sections[ra.section]
                        .heading
                        .cmp(&pb.sections[rb.section].heading)
                })
                .then_with(|| a.cmp(b))
        });
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(idx, score)| {
                let r = self.sections[idx];
                let page = &self.pages[r.page];
                let section = &page.sections[r.section];
                SearchHit {
                    id: page.id.clone(),
                    title: page.title.clone(),
                    heading: section.heading.clone(),
                    snippet: make_snippet(&section.content),
                    score,
                }
            })
            .collect()
    }
}
