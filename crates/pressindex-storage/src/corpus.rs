//! JSON corpus export used as the content repository by the CLI.
//!
//! Accepts either a bare array of posts or an object with `posts` and an
//! `authors` map of id to display name.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use pressindex_types::{page_posts, ContentRepository, Post, PostQuery, QueryPage, TypesError};

use crate::error::StorageError;

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Full {
        #[serde(default)]
        authors: HashMap<u64, String>,
        posts: Vec<Post>,
    },
    Posts(Vec<Post>),
}

/// Read-only repository loaded from a JSON export.
#[derive(Debug, Default)]
pub struct JsonCorpus {
    posts: BTreeMap<u64, Post>,
    authors: HashMap<u64, String>,
}

impl JsonCorpus {
    /// Load a corpus file from disk.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Loading corpus from {:?}", path);
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a corpus from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        let file: CorpusFile =
            serde_json::from_str(raw).map_err(|e| StorageError::Corpus(e.to_string()))?;

        let (posts, authors) = match file {
            CorpusFile::Full { authors, posts } => (posts, authors),
            CorpusFile::Posts(posts) => (posts, HashMap::new()),
        };

        let mut by_id = BTreeMap::new();
        for post in posts {
            if by_id.insert(post.id, post).is_some() {
                return Err(StorageError::Corpus("duplicate post id in corpus".to_string()));
            }
        }

        debug!(posts = by_id.len(), authors = authors.len(), "Corpus loaded");
        Ok(Self {
            posts: by_id,
            authors,
        })
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl ContentRepository for JsonCorpus {
    fn query_posts(&self, query: &PostQuery) -> Result<QueryPage, TypesError> {
        Ok(page_posts(self.posts.values(), query))
    }

    fn get_post(&self, post_id: u64) -> Result<Option<Post>, TypesError> {
        Ok(self.posts.get(&post_id).cloned())
    }

    fn author_display_name(&self, author_id: u64) -> Result<Option<String>, TypesError> {
        Ok(self.authors.get(&author_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressindex_types::PostStatus;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"{
        "authors": {"7": "Ada Lovelace"},
        "posts": [
            {"id": 1, "title": "First", "status": "publish", "author_id": 7},
            {"id": 2, "title": "Draft", "status": "draft"},
            {"id": 3, "title": "Page", "status": "publish", "post_type": "page"},
            {"id": 4, "title": "Second", "status": "publish"}
        ]
    }"#;

    #[test]
    fn test_full_format() {
        let corpus = JsonCorpus::from_json(FULL).unwrap();
        assert_eq!(corpus.len(), 4);
        assert_eq!(
            corpus.author_display_name(7).unwrap().as_deref(),
            Some("Ada Lovelace")
        );
        assert!(corpus.author_display_name(8).unwrap().is_none());
        assert_eq!(
            corpus.get_post(2).unwrap().map(|p| p.status),
            Some(PostStatus::Draft)
        );
    }

    #[test]
    fn test_bare_array_format() {
        let corpus = JsonCorpus::from_json(r#"[{"id": 9, "title": "Only"}]"#).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(corpus.author_display_name(1).unwrap().is_none());
    }

    #[test]
    fn test_query_pages_published_posts() {
        let corpus = JsonCorpus::from_json(FULL).unwrap();
        let page = corpus
            .query_posts(&PostQuery::published(vec!["post".into()], 10, 0))
            .unwrap();
        assert_eq!(page.post_ids, vec![4, 1]);
        assert_eq!(page.found_total, 2);

        let page = corpus
            .query_posts(&PostQuery::published(vec!["post".into()], 1, 1))
            .unwrap();
        assert_eq!(page.post_ids, vec![1]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = JsonCorpus::from_json(r#"[{"id": 1}, {"id": 1}]"#);
        assert!(matches!(result, Err(StorageError::Corpus(_))));
    }

    #[test]
    fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let corpus = JsonCorpus::open(file.path()).unwrap();
        assert_eq!(corpus.len(), 4);
    }

    #[test]
    fn test_open_missing_file() {
        let result = JsonCorpus::open(Path::new("/nonexistent/corpus.json"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
