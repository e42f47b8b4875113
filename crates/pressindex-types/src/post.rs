//! Repository documents (posts) as the indexer sees them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The creation date the repository uses for "never set".
pub const ZERO_DATE: &str = "0000-00-00 00:00:00";

/// Publication status of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostStatus {
    Publish,
    #[default]
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    AutoDraft,
    Inherit,
    Other(String),
}

impl PostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Trash => "trash",
            PostStatus::AutoDraft => "auto-draft",
            PostStatus::Inherit => "inherit",
            PostStatus::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "publish" => PostStatus::Publish,
            "draft" => PostStatus::Draft,
            "pending" => PostStatus::Pending,
            "private" => PostStatus::Private,
            "future" => PostStatus::Future,
            "trash" => PostStatus::Trash,
            "auto-draft" => PostStatus::AutoDraft,
            "inherit" => PostStatus::Inherit,
            other => PostStatus::Other(other.to_string()),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PostStatus::Publish)
    }
}

impl From<String> for PostStatus {
    fn from(value: String) -> Self {
        PostStatus::parse(&value)
    }
}

impl From<PostStatus> for String {
    fn from(value: PostStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxonomy term attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Term {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name.trim().to_lowercase().replace(' ', "-");
        Self { name, slug }
    }
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_date() -> String {
    ZERO_DATE.to_string()
}

/// A post as provided by the content repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    /// Raw stored content, markup included
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub author_id: u64,
    #[serde(default)]
    pub status: PostStatus,
    /// Creation date, `YYYY-MM-DD HH:MM:SS`
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default = "default_date")]
    pub modified: String,
    #[serde(default)]
    pub menu_order: i64,
    /// Terms keyed by taxonomy name
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<Term>>,
    /// Arbitrary metadata; structured values stay structured here
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Post {
    /// A published `post` with the given title and no other data.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            permalink: String::new(),
            content: String::new(),
            excerpt: String::new(),
            post_type: default_post_type(),
            author_id: 0,
            status: PostStatus::Publish,
            date: default_date(),
            modified: default_date(),
            menu_order: 0,
            terms: BTreeMap::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = excerpt.into();
        self
    }

    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = permalink.into();
        self
    }

    pub fn with_author(mut self, author_id: u64) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_menu_order(mut self, menu_order: i64) -> Self {
        self.menu_order = menu_order;
        self
    }

    pub fn with_terms(mut self, taxonomy: impl Into<String>, names: &[&str]) -> Self {
        self.terms
            .insert(taxonomy.into(), names.iter().map(|n| Term::new(*n)).collect());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Terms for a taxonomy; empty when none are attached.
    pub fn terms_for(&self, taxonomy: &str) -> &[Term] {
        self.terms.get(taxonomy).map(Vec::as_slice).unwrap_or(&[])
    }
}
