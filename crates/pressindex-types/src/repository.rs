//! Content repository interface.
//!
//! The repository owns the documents. The indexer only pages through ids,
//! fetches posts one at a time, and resolves author names.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::error::TypesError;
use crate::post::{Post, PostStatus};

/// Sort order for paged queries.
///
/// Paging must use a stable key so that concurrent edits cannot make a page
/// boundary skip a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    #[default]
    IdDesc,
    IdAsc,
}

/// A page request against the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    pub post_types: Vec<String>,
    pub statuses: Vec<PostStatus>,
    pub order: PostOrder,
    pub limit: usize,
    pub offset: u64,
}

impl PostQuery {
    /// Published posts of the given types, newest id first.
    pub fn published(post_types: Vec<String>, limit: usize, offset: u64) -> Self {
        Self {
            post_types,
            statuses: vec![PostStatus::Publish],
            order: PostOrder::IdDesc,
            limit,
            offset,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.post_types.iter().any(|t| *t == post.post_type)
            && self.statuses.iter().any(|s| *s == post.status)
    }
}

/// One page of post ids plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub post_ids: Vec<u64>,
    pub found_total: u64,
}

/// Source of documents to index.
pub trait ContentRepository: Send + Sync {
    /// Page through posts matching `query`.
    fn query_posts(&self, query: &PostQuery) -> Result<QueryPage, TypesError>;

    /// Fetch one post. `Ok(None)` if the id does not resolve.
    fn get_post(&self, post_id: u64) -> Result<Option<Post>, TypesError>;

    /// Display name for an author id. `Ok(None)` if there is no such user.
    fn author_display_name(&self, author_id: u64) -> Result<Option<String>, TypesError>;
}

/// Apply a query to an in-memory collection of posts.
pub fn page_posts<'a>(posts: impl Iterator<Item = &'a Post>, query: &PostQuery) -> QueryPage {
    let mut ids: Vec<u64> = posts.filter(|p| query.matches(p)).map(|p| p.id).collect();
    match query.order {
        PostOrder::IdDesc => ids.sort_unstable_by(|a, b| b.cmp(a)),
        PostOrder::IdAsc => ids.sort_unstable(),
    }

    let found_total = ids.len() as u64;
    let skip = usize::try_from(query.offset).unwrap_or(usize::MAX);
    let post_ids = ids.into_iter().skip(skip).take(query.limit).collect();

    QueryPage {
        post_ids,
        found_total,
    }
}

/// Repository held entirely in memory.
///
/// Mutable through `&self` so tests can edit the corpus between batches
/// while the indexer holds a shared handle.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    posts: RwLock<BTreeMap<u64, Post>>,
    authors: RwLock<HashMap<u64, String>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let repo = Self::new();
        for post in posts {
            repo.insert(post);
        }
        repo
    }

    pub fn insert(&self, post: Post) {
        self.posts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(post.id, post);
    }

    pub fn remove(&self, post_id: u64) -> Option<Post> {
        self.posts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&post_id)
    }

    pub fn set_author(&self, author_id: u64, display_name: impl Into<String>) {
        self.authors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(author_id, display_name.into());
    }

    pub fn len(&self) -> usize {
        self.posts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentRepository for InMemoryRepository {
    fn query_posts(&self, query: &PostQuery) -> Result<QueryPage, TypesError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| TypesError::Repository(e.to_string()))?;
        Ok(page_posts(posts.values(), query))
    }

    fn get_post(&self, post_id: u64) -> Result<Option<Post>, TypesError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| TypesError::Repository(e.to_string()))?;
        Ok(posts.get(&post_id).cloned())
    }

    fn author_display_name(&self, author_id: u64) -> Result<Option<String>, TypesError> {
        let authors = self
            .authors
            .read()
            .map_err(|e| TypesError::Repository(e.to_string()))?;
        Ok(authors.get(&author_id).cloned())
    }
}
