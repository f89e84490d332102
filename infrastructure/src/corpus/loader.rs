//! Filesystem corpus loader
//!
//! Reads pages produced by the ingestion pipeline. Two layouts are accepted:
//!
//! - a directory of `*.json` files (searched recursively), each holding one
//!   page object or an array of pages;
//! - a single JSON file holding an array of pages.
//!
//! Inside a directory, malformed files are skipped with a warning so one bad
//! export does not take the whole corpus down.

use docent_domain::corpus::DocPage;
use glob::glob;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CorpusLoadError {
    #[error("Corpus path not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid corpus path pattern: {0}")]
    Pattern(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageFile {
    Many(Vec<DocPage>),
    One(DocPage),
}

impl PageFile {
    fn into_pages(self) -> Vec<DocPage> {
        match self {
            PageFile::Many(pages) => pages,
            PageFile::One(page) => vec![page],
        }
    }
}

/// Loads [`DocPage`]s from a file or directory.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    path: PathBuf,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every valid page.
    pub fn load(&self) -> Result<Vec<DocPage>, CorpusLoadError> {
        if self.path.is_dir() {
            self.load_dir()
        } else if self.path.is_file() {
            let pages = Self::read_file(&self.path)?;
            Ok(Self::retain_valid(pages, &self.path))
        } else {
            Err(CorpusLoadError::NotFound(self.path.clone()))
        }
    }

    fn load_dir(&self) -> Result<Vec<DocPage>, CorpusLoadError> {
        let pattern = format!("{}/**/*.json", self.path.display());
        let entries = glob(&pattern).map_err(|e| CorpusLoadError::Pattern(e.to_string()))?;

        let mut files: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
        files.sort();

        let mut pages = Vec::new();
        let mut skipped = 0usize;
        for file in &files {
            match Self::read_file(file) {
                Ok(found) => {
                    debug!(path = %file.display(), pages = found.len(), "Loaded corpus file");
                    pages.extend(Self::retain_valid(found, file));
                }
                Err(e) => {
                    warn!("Skipping corpus file: {}", e);
                    skipped += 1;
                }
            }
        }

        info!(
            dir = %self.path.display(),
            files = files.len(),
            skipped,
            pages = pages.len(),
            "Corpus loaded"
        );
        Ok(pages)
    }

    fn read_file(path: &Path) -> Result<Vec<DocPage>, CorpusLoadError> {
        let content = fs::read_to_string(path).map_err(|source| CorpusLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: PageFile =
            serde_json::from_str(&content).map_err(|source| CorpusLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(parsed.into_pages())
    }

    fn retain_valid(pages: Vec<DocPage>, source: &Path) -> Vec<DocPage> {
        pages
            .into_iter()
            .filter(|p| {
                let valid = !p.id.trim().is_empty() && !p.title.trim().is_empty();
                if !valid {
                    warn!(path = %source.display(), "Skipping page without id or title");
                }
                valid
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BACKUP_PAGE: &str = r#"{
        "id": "backup-guide",
        "title": "Backups",
        "url": "https://docs.example.com/backups",
        "sections": [{"heading": "Creating", "content": "Run /backup create."}]
    }"#;

    #[test]
    fn test_load_directory_skips_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("backup.json"), BACKUP_PAGE).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested/more.json"),
            r#"[{"slug": "faq", "title": "FAQ"}, {"id": "", "title": "Untitled"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pages = CorpusLoader::new(dir.path()).load().unwrap();
        let mut ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["backup-guide", "faq"]);
    }

    #[test]
    fn test_load_single_array_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(&path, format!("[{}]", BACKUP_PAGE)).unwrap();

        let pages = CorpusLoader::new(&path).load().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].sections[0].heading, "Creating");
    }

    #[test]
    fn test_malformed_single_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(&path, "[").unwrap();

        let err = CorpusLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, CorpusLoadError::Parse { .. }));
    }

    #[test]
    fn test_missing_path() {
        let err = CorpusLoader::new("/definitely/not/here").load().unwrap_err();
        assert!(matches!(err, CorpusLoadError::NotFound(_)));
    }
}
