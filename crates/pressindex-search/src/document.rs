//! Document normalization from repository posts to prepared documents.
//!
//! Converts a [`Post`] into the ordered field/value pairs of an add command:
//! fixed fields in schema order, then taxonomy terms, then allow-listed meta.
//! The `prepared_fields` hook runs last and may override anything.

use std::sync::{Arc, LazyLock};

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, warn};

use pressindex_types::{
    ContentRepository, Hooks, MetaEntry, MetaValue, Post, PreparedDocument, ZERO_DATE,
};

use crate::error::SearchError;
use crate::schema::{
    FIELD_MENU_ORDER, FIELD_PERMALINK, FIELD_POST_AUTHOR, FIELD_POST_CONTENT,
    FIELD_POST_CONTENT_FILTERED, FIELD_POST_DATE, FIELD_POST_EXCERPT, FIELD_POST_ID,
    FIELD_POST_TITLE, FIELD_POST_TYPE,
};

/// Format of repository dates.
pub const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>")
        .expect("Invalid script/style regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Remove markup from `html`.
///
/// `<script>` and `<style>` elements are dropped with their contents, every
/// other tag is dropped, and whitespace runs collapse to one space.
pub fn strip_all_tags(html: &str) -> String {
    let without_code = SCRIPT_STYLE_RE.replace_all(html, "");
    let without_tags = TAG_RE.replace_all(&without_code, "");
    WHITESPACE_RE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Unix timestamp (UTC) for a repository date.
///
/// `None` for the zero-date sentinel or anything that does not parse.
pub fn parse_post_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == ZERO_DATE {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, POST_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Turns repository posts into prepared documents.
pub struct DocumentNormalizer {
    repository: Arc<dyn ContentRepository>,
    hooks: Arc<Hooks>,
    indexable_taxonomies: Vec<String>,
    indexable_meta_keys: Vec<String>,
}

impl DocumentNormalizer {
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        hooks: Arc<Hooks>,
        indexable_taxonomies: Vec<String>,
        indexable_meta_keys: Vec<String>,
    ) -> Self {
        Self {
            repository,
            hooks,
            indexable_taxonomies,
            indexable_meta_keys,
        }
    }

    /// Fetch a post, mapping a missing id to [`SearchError::DocumentNotFound`].
    pub fn fetch(&self, post_id: u64) -> Result<Post, SearchError> {
        self.repository
            .get_post(post_id)?
            .ok_or(SearchError::DocumentNotFound(post_id))
    }

    /// Fetch and prepare one post.
    pub fn prepare(&self, post_id: u64) -> Result<PreparedDocument, SearchError> {
        let post = self.fetch(post_id)?;
        self.prepare_post(&post)
    }

    /// Prepare an already fetched post.
    pub fn prepare_post(&self, post: &Post) -> Result<PreparedDocument, SearchError> {
        let mut doc = PreparedDocument::new();

        let rendered = self.hooks.content.apply(post.content.clone(), post);

        doc.push(FIELD_POST_TITLE, post.title.as_str());
        doc.push(FIELD_POST_CONTENT, strip_all_tags(&post.content));
        doc.push(FIELD_POST_CONTENT_FILTERED, strip_all_tags(&rendered));
        doc.push(FIELD_POST_EXCERPT, strip_all_tags(&post.excerpt));
        doc.push(FIELD_POST_TYPE, post.post_type.as_str());
        doc.push(FIELD_POST_AUTHOR, self.author_name(post));
        doc.push(FIELD_POST_ID, post.id);
        doc.push(FIELD_MENU_ORDER, post.menu_order.unsigned_abs());
        doc.push(FIELD_PERMALINK, post.permalink.as_str());
        match parse_post_date(&post.date) {
            Some(ts) => doc.push(FIELD_POST_DATE, ts),
            None => debug!(post_id = post.id, date = %post.date, "Omitting invalid post date"),
        }

        for (taxonomy, terms) in self.prepare_terms(post) {
            doc.push(taxonomy, terms);
        }

        for entry in self.prepare_meta(post)? {
            doc.push(entry.key, entry.value.as_str());
        }

        Ok(self.hooks.prepared_fields.apply(doc, post))
    }

    /// Flattened `(taxonomy, "a,b,c")` pairs, after the `prepared_terms` hook.
    ///
    /// Taxonomies without terms on this post are omitted.
    pub fn prepare_terms(&self, post: &Post) -> Vec<(String, String)> {
        let taxonomies = self
            .hooks
            .indexable_taxonomies
            .apply(self.indexable_taxonomies.clone(), post);

        let terms = taxonomies
            .into_iter()
            .filter_map(|taxonomy| {
                let names: Vec<&str> = post
                    .terms_for(&taxonomy)
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect();
                if names.is_empty() {
                    return None;
                }
                let joined = names.join(",").trim_start().to_string();
                Some((taxonomy, joined))
            })
            .collect();

        self.hooks.prepared_terms.apply(terms, post)
    }

    /// Allow-listed metadata entries in allow-list order.
    pub fn prepare_meta(&self, post: &Post) -> Result<Vec<MetaEntry>, SearchError> {
        let mut entries = Vec::new();
        for key in &self.indexable_meta_keys {
            if let Some(raw) = post.meta.get(key) {
                entries.push(MetaEntry::new(key.as_str(), MetaValue::from_json(raw)?));
            }
        }
        Ok(entries)
    }

    fn author_name(&self, post: &Post) -> String {
        match self.repository.author_display_name(post.author_id) {
            Ok(Some(name)) => name,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(post_id = post.id, author_id = post.author_id, error = %e, "Author lookup failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressindex_types::{FieldValue, InMemoryRepository};
    use serde_json::json;

    fn normalizer_with(
        posts: Vec<Post>,
        hooks: Hooks,
        taxonomies: &[&str],
        meta_keys: &[&str],
    ) -> DocumentNormalizer {
        let repo = InMemoryRepository::with_posts(posts);
        repo.set_author(3, "Grace Hopper");
        DocumentNormalizer::new(
            Arc::new(repo),
            Arc::new(hooks),
            taxonomies.iter().map(|s| s.to_string()).collect(),
            meta_keys.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn sample_post() -> Post {
        Post::new(42, "Hello <b>World</b>")
            .with_content("<p>Some   <em>rich</em>\n text</p><script>alert(1)</script>")
            .with_excerpt("<i>Short</i> excerpt")
            .with_permalink("https://example.com/hello")
            .with_author(3)
            .with_date("2024-01-15 10:30:00")
            .with_menu_order(-4)
    }

    #[test]
    fn test_strip_all_tags() {
        assert_eq!(
            strip_all_tags("<p>One</p>\n\n<style>p { color: red }</style><div>two  three</div>"),
            "One two three"
        );
        assert_eq!(strip_all_tags("  plain  "), "plain");
        assert_eq!(strip_all_tags("<SCRIPT type=\"x\">var a;</SCRIPT>kept"), "kept");
    }

    #[test]
    fn test_parse_post_date() {
        assert_eq!(parse_post_date("1970-01-01 00:00:10"), Some(10));
        assert_eq!(parse_post_date("2024-01-15 10:30:00"), Some(1_705_314_600));
        assert_eq!(parse_post_date(ZERO_DATE), None);
        assert_eq!(parse_post_date("yesterday"), None);
        assert_eq!(parse_post_date(""), None);
    }

    #[test]
    fn test_prepare_fixed_fields_in_schema_order() {
        let normalizer = normalizer_with(vec![sample_post()], Hooks::new(), &[], &[]);
        let doc = normalizer.prepare(42).unwrap();

        assert_eq!(
            doc.names(),
            vec![
                "post_title",
                "post_content",
                "post_content_filtered",
                "post_excerpt",
                "post_type",
                "post_author",
                "post_id",
                "menu_order",
                "permalink",
                "post_date",
            ]
        );
        assert_eq!(doc.get("post_title"), Some(&FieldValue::from("Hello <b>World</b>")));
        assert_eq!(doc.get("post_content"), Some(&FieldValue::from("Some rich text")));
        assert_eq!(doc.get("post_excerpt"), Some(&FieldValue::from("Short excerpt")));
        assert_eq!(doc.get("post_author"), Some(&FieldValue::from("Grace Hopper")));
        assert_eq!(doc.get("post_id"), Some(&FieldValue::Number(42)));
        assert_eq!(doc.get("menu_order"), Some(&FieldValue::Number(4)));
        assert_eq!(doc.get("post_date"), Some(&FieldValue::Number(1_705_314_600)));
    }

    #[test]
    fn test_content_hook_feeds_filtered_content() {
        let mut hooks = Hooks::new();
        hooks
            .content
            .add(|content, _post| content.replace("[gallery]", "<div>Gallery</div>"));

        let post = Post::new(1, "T").with_content("Intro [gallery]");
        let normalizer = normalizer_with(vec![post], hooks, &[], &[]);
        let doc = normalizer.prepare(1).unwrap();

        assert_eq!(doc.get("post_content"), Some(&FieldValue::from("Intro [gallery]")));
        assert_eq!(
            doc.get("post_content_filtered"),
            Some(&FieldValue::from("Intro Gallery"))
        );
    }

    #[test]
    fn test_unknown_author_is_empty() {
        let post = Post::new(1, "T").with_author(99);
        let normalizer = normalizer_with(vec![post], Hooks::new(), &[], &[]);
        let doc = normalizer.prepare(1).unwrap();
        assert_eq!(doc.get("post_author"), Some(&FieldValue::from("")));
    }

    #[test]
    fn test_null_date_omitted() {
        let zero = Post::new(1, "Zero").with_date(ZERO_DATE);
        let junk = Post::new(2, "Junk").with_date("not a date");
        let normalizer = normalizer_with(vec![zero, junk], Hooks::new(), &[], &[]);

        assert!(!normalizer.prepare(1).unwrap().contains("post_date"));
        assert!(!normalizer.prepare(2).unwrap().contains("post_date"));
    }

    #[test]
    fn test_missing_post() {
        let normalizer = normalizer_with(vec![], Hooks::new(), &[], &[]);
        assert!(matches!(
            normalizer.prepare(7),
            Err(SearchError::DocumentNotFound(7))
        ));
    }

    #[test]
    fn test_terms_joined_and_empty_taxonomies_omitted() {
        let post = Post::new(1, "T")
            .with_terms("category", &[" News", "Rust"])
            .with_terms("post_tag", &[]);
        let normalizer =
            normalizer_with(vec![post], Hooks::new(), &["category", "post_tag", "genre"], &[]);

        let post = normalizer.fetch(1).unwrap();
        assert_eq!(
            normalizer.prepare_terms(&post),
            vec![("category".to_string(), "News,Rust".to_string())]
        );

        let doc = normalizer.prepare(1).unwrap();
        assert!(!doc.contains("post_tag"));
        assert!(!doc.contains("genre"));
        assert_eq!(doc.names().last(), Some(&"category"));
    }

    #[test]
    fn test_indexable_taxonomies_hook_sees_post() {
        let mut hooks = Hooks::new();
        hooks.indexable_taxonomies.add(|mut taxonomies, post| {
            if post.post_type == "page" {
                taxonomies.clear();
            }
            taxonomies
        });

        let page = Post::new(1, "P").with_type("page").with_terms("category", &["A"]);
        let post = Post::new(2, "Q").with_terms("category", &["A"]);
        let normalizer = normalizer_with(vec![page, post], hooks, &["category"], &[]);

        assert!(!normalizer.prepare(1).unwrap().contains("category"));
        assert!(normalizer.prepare(2).unwrap().contains("category"));
    }

    #[test]
    fn test_meta_allow_list() {
        let post = Post::new(1, "T")
            .with_date("2024-01-01 00:00:00")
            .with_meta("secret", json!("hidden"))
            .with_meta("sizes", json!(["s", "m"]))
            .with_meta("color", json!("red"))
            .with_meta("stock", json!(12))
            .with_meta("featured", json!(true));
        let normalizer =
            normalizer_with(vec![post], Hooks::new(), &[], &["sizes", "color", "stock", "featured"]);

        let doc = normalizer.prepare(1).unwrap();
        assert!(!doc.contains("secret"));
        assert_eq!(doc.get("sizes"), Some(&FieldValue::from(r#"["s","m"]"#)));
        assert_eq!(doc.get("color"), Some(&FieldValue::from("red")));
        assert_eq!(doc.get("stock"), Some(&FieldValue::from("12")));
        assert_eq!(doc.get("featured"), Some(&FieldValue::from("1")));
        assert_eq!(&doc.names()[10..], &["sizes", "color", "stock", "featured"]);

        let post = normalizer.fetch(1).unwrap();
        let meta = normalizer.prepare_meta(&post).unwrap();
        assert!(meta[0].value.is_composite());
        assert!(!meta[1].value.is_composite());
    }

    #[test]
    fn test_prepared_fields_hook_runs_last() {
        let mut hooks = Hooks::new();
        hooks.prepared_fields.add(|mut doc, post| {
            doc.set("post_title", format!("#{} override", post.id));
            doc.push("extra", "value");
            doc
        });

        let normalizer = normalizer_with(vec![Post::new(5, "Original")], hooks, &[], &[]);
        let doc = normalizer.prepare(5).unwrap();
        assert_eq!(doc.get("post_title"), Some(&FieldValue::from("#5 override")));
        assert_eq!(doc.names().last(), Some(&"extra"));
    }

    #[test]
    fn test_prepared_terms_hook() {
        let mut hooks = Hooks::new();
        hooks.prepared_terms.add(|mut terms, _post| {
            terms.push(("series".to_string(), "Intro".to_string()));
            terms
        });

        let post = Post::new(1, "T").with_terms("category", &["News"]);
        let normalizer = normalizer_with(vec![post], hooks, &["category"], &[]);
        let doc = normalizer.prepare(1).unwrap();
        assert_eq!(doc.get("series"), Some(&FieldValue::from("Intro")));
    }
}
