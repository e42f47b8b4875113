//! Extension points.
//!
//! A [`Filter`] is an ordered chain of transformers that each take and return
//! the value the hook is named after. An [`Action`] is an ordered list of
//! observers fired after something happened. Both run synchronously at the
//! point documented on the corresponding [`Hooks`] field.

use crate::document::PreparedDocument;
use crate::field::{FieldSpec, IndexSchema};
use crate::post::Post;
use crate::repository::PostQuery;

type FilterFn<T, C> = Box<dyn Fn(T, &C) -> T + Send + Sync>;
type ActionFn<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Ordered transformer chain over `T`, with read-only context `C`.
pub struct Filter<T, C: ?Sized = ()> {
    callbacks: Vec<FilterFn<T, C>>,
}

impl<T, C: ?Sized> Filter<T, C> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Register a transformer. Transformers run in registration order.
    pub fn add<F>(&mut self, callback: F)
    where
        F: Fn(T, &C) -> T + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn apply(&self, value: T, context: &C) -> T {
        self.callbacks
            .iter()
            .fold(value, |acc, callback| callback(acc, context))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T, C: ?Sized> Default for Filter<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: ?Sized> std::fmt::Debug for Filter<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Ordered observer list for events of type `E`.
pub struct Action<E: ?Sized> {
    callbacks: Vec<ActionFn<E>>,
}

impl<E: ?Sized> Action<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn fire(&self, event: &E) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<E: ?Sized> Default for Action<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> std::fmt::Debug for Action<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Payload for the `document_indexed` and `document_published` actions.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentIndexed {
    pub index_name: String,
    pub post_id: u64,
    pub language: String,
    pub fields: PreparedDocument,
}

/// Payload for the `document_deleted` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDeleted {
    pub index_name: String,
    pub post_id: u64,
}

/// Every extension point, grouped. Shared as `Arc<Hooks>`.
#[derive(Debug, Default)]
pub struct Hooks {
    /// Meta-key field list before the schema is assembled; context is the
    /// allow-listed key list.
    pub meta_schema: Filter<Vec<FieldSpec>, [String]>,
    /// Final prepared fields of a document, run last.
    pub prepared_fields: Filter<PreparedDocument, Post>,
    /// Flattened `(taxonomy, terms)` pairs of a document.
    pub prepared_terms: Filter<Vec<(String, String)>, Post>,
    /// Taxonomies considered for a given document.
    pub indexable_taxonomies: Filter<Vec<String>, Post>,
    /// Post types eligible for bulk indexing.
    pub indexable_post_types: Filter<Vec<String>>,
    /// Page query issued by the batch coordinator.
    pub post_query: Filter<PostQuery>,
    /// Batch page size.
    pub page_size: Filter<usize>,
    /// Indexing language per post id.
    pub language: Filter<String, u64>,
    /// Extra flags appended to each add command.
    pub extra_params: Filter<Vec<String>>,
    /// Content rendering pipeline applied before the filtered-content field
    /// is stripped.
    pub content: Filter<String, Post>,
    pub index_created: Action<IndexSchema>,
    pub document_indexed: Action<DocumentIndexed>,
    pub document_published: Action<DocumentIndexed>,
    pub document_deleted: Action<DocumentDeleted>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }
}
