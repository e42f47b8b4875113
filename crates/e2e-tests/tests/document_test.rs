//! End-to-end document shape tests.
//!
//! Checks what the engine receives for a post: schema order, date policy,
//! the metadata allow-list, taxonomy fields and markup stripping.

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{strings, TestHarness, INDEX_NAME};
use pressindex_search::schema::FIELD_POST_DATE;
use pressindex_types::{FieldSpec, FieldValue, Hooks, Post, PreparedDocument, ZERO_DATE};

fn indexed_document(post: Post, taxonomies: &[&str], meta_keys: &[&str]) -> PreparedDocument {
    let id = post.id;
    let harness = TestHarness::new(vec![post]).with_config(|c| {
        c.with_taxonomies(strings(taxonomies))
            .with_meta_keys(strings(meta_keys))
    });
    harness.coordinator().run_batch().unwrap();
    harness
        .engine
        .document(INDEX_NAME, id)
        .expect("document should be indexed")
}

#[test]
fn test_schema_is_deterministic_and_sectioned() {
    let harness = TestHarness::new(Vec::new()).with_config(|c| {
        c.with_taxonomies(strings(&["category", "post_tag"]))
            .with_meta_keys(strings(&["color", "size"]))
    });
    let coordinator = harness.coordinator();

    let first = coordinator.schema().unwrap();
    let second = coordinator.schema().unwrap();
    assert_eq!(first, second);

    let names = first.field_names();
    assert_eq!(
        names,
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
            "category",
            "post_tag",
            "color",
            "size",
        ]
    );
}

#[test]
fn test_created_index_matches_schema() {
    let harness = TestHarness::new(vec![Post::new(1, "One")])
        .with_config(|c| c.with_taxonomies(strings(&["category"])));
    let coordinator = harness.coordinator();
    coordinator.run_batch().unwrap();

    assert_eq!(
        harness.engine.schema(INDEX_NAME),
        Some(coordinator.schema().unwrap())
    );
}

#[test]
fn test_prepared_fields_follow_schema_order() {
    let post = Post::new(1, "Title")
        .with_date("2024-01-01 00:00:00")
        .with_terms("category", &["News"])
        .with_meta("color", json!("blue"));
    let doc = indexed_document(post, &["category"], &["color"]);

    let harness = TestHarness::new(Vec::new()).with_config(|c| {
        c.with_taxonomies(strings(&["category"]))
            .with_meta_keys(strings(&["color"]))
    });
    let schema = harness.coordinator().schema().unwrap();

    assert_eq!(doc.names(), schema.field_names());
}

#[test]
fn test_zero_and_invalid_dates_omitted() {
    for date in [ZERO_DATE, "yesterday", ""] {
        let doc = indexed_document(Post::new(1, "Undated").with_date(date), &[], &[]);
        assert!(!doc.contains(FIELD_POST_DATE), "date {:?} should be omitted", date);
        assert_eq!(doc.len(), 9);
    }
}

#[test]
fn test_valid_date_becomes_unix_timestamp() {
    let doc = indexed_document(Post::new(1, "Dated").with_date("2024-01-01 00:00:00"), &[], &[]);
    assert_eq!(doc.get(FIELD_POST_DATE), Some(&FieldValue::Number(1_704_067_200)));
}

#[test]
fn test_meta_allow_list_and_composite_values() {
    let post = Post::new(1, "Meta")
        .with_meta("color", json!("blue"))
        .with_meta("dimensions", json!({"w": 2, "h": 3}))
        .with_meta("secret", json!("hidden"));
    let doc = indexed_document(post, &[], &["color", "dimensions"]);

    assert_eq!(doc.get("color"), Some(&FieldValue::from("blue")));
    let dimensions = doc.get("dimensions").and_then(|v| v.as_text()).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(dimensions).unwrap(),
        json!({"w": 2, "h": 3})
    );
    assert!(!doc.contains("secret"));
}

#[test]
fn test_taxonomy_without_terms_contributes_nothing() {
    let post = Post::new(1, "Tagged")
        .with_terms("category", &["News", "Rust"])
        .with_terms("post_tag", &[]);
    let doc = indexed_document(post, &["category", "post_tag"], &[]);

    assert_eq!(doc.get("category"), Some(&FieldValue::from("News,Rust")));
    assert!(!doc.contains("post_tag"));
}

#[test]
fn test_markup_stripped_from_content_and_excerpt() {
    let post = Post::new(1, "<em>Kept</em>")
        .with_content("<p>Hello <b>world</b></p><script>alert(1)</script>")
        .with_excerpt("<i>Short</i> summary");
    let doc = indexed_document(post, &[], &[]);

    assert_eq!(doc.get("post_content"), Some(&FieldValue::from("Hello world")));
    assert_eq!(doc.get("post_excerpt"), Some(&FieldValue::from("Short summary")));
    assert_eq!(doc.get("post_title"), Some(&FieldValue::from("<em>Kept</em>")));
}

#[test]
fn test_content_hook_feeds_filtered_field_only() {
    let mut hooks = Hooks::new();
    hooks
        .content
        .add(|content, _post| content.replace("[gallery]", "<div>Gallery</div>"));

    let harness =
        TestHarness::with_hooks(vec![Post::new(1, "Shortcode").with_content("Look [gallery]")], hooks);
    harness.coordinator().run_batch().unwrap();
    let doc = harness.engine.document(INDEX_NAME, 1).unwrap();

    assert_eq!(doc.get("post_content"), Some(&FieldValue::from("Look [gallery]")));
    assert_eq!(
        doc.get("post_content_filtered"),
        Some(&FieldValue::from("Look Gallery"))
    );
}

#[test]
fn test_meta_schema_hook_extends_schema() {
    let mut hooks = Hooks::new();
    hooks
        .meta_schema
        .add(|mut fields, _keys| {
            fields.push(FieldSpec::numeric("price").sortable());
            fields
        });

    let harness = TestHarness::with_hooks(Vec::new(), hooks)
        .with_config(|c| c.with_meta_keys(strings(&["color"])));
    let schema = harness.coordinator().schema().unwrap();

    let names = schema.field_names();
    assert_eq!(names[names.len() - 2..].to_vec(), vec!["color", "price"]);
}
