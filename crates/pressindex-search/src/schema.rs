//! Index schema derivation.
//!
//! The schema has three sections, always in this order:
//! - Fixed post fields (title, content, dates, ...)
//! - One TAG field per indexable taxonomy
//! - One TEXT field per indexable metadata key, after the `meta_schema` hook

use std::collections::HashSet;

use pressindex_types::{validate_index_name, FieldSpec, Hooks, IndexSchema, TypesError};

use crate::error::SearchError;

pub const FIELD_POST_TITLE: &str = "post_title";
pub const FIELD_POST_CONTENT: &str = "post_content";
pub const FIELD_POST_CONTENT_FILTERED: &str = "post_content_filtered";
pub const FIELD_POST_EXCERPT: &str = "post_excerpt";
pub const FIELD_POST_TYPE: &str = "post_type";
pub const FIELD_POST_AUTHOR: &str = "post_author";
pub const FIELD_POST_ID: &str = "post_id";
pub const FIELD_MENU_ORDER: &str = "menu_order";
pub const FIELD_PERMALINK: &str = "permalink";
pub const FIELD_POST_DATE: &str = "post_date";

/// Relevance weight of the title field
pub const TITLE_WEIGHT: f64 = 5.0;

/// Fixed post fields in declaration order.
pub fn fixed_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text(FIELD_POST_TITLE)
            .with_weight(TITLE_WEIGHT)
            .sortable(),
        FieldSpec::text(FIELD_POST_CONTENT),
        FieldSpec::text(FIELD_POST_CONTENT_FILTERED),
        FieldSpec::text(FIELD_POST_EXCERPT),
        FieldSpec::text(FIELD_POST_TYPE),
        FieldSpec::text(FIELD_POST_AUTHOR),
        FieldSpec::numeric(FIELD_POST_ID).sortable(),
        FieldSpec::numeric(FIELD_MENU_ORDER),
        FieldSpec::text(FIELD_PERMALINK),
        FieldSpec::numeric(FIELD_POST_DATE).sortable(),
    ]
}

/// Build the schema for `index_name`.
///
/// Deterministic for a given configuration and hook registry. Fails with
/// [`SearchError::SchemaConflict`] on the first repeated field name.
pub fn build_schema(
    index_name: &str,
    indexable_meta_keys: &[String],
    indexable_taxonomies: &[String],
    hooks: &Hooks,
) -> Result<IndexSchema, SearchError> {
    validate_index_name(index_name).map_err(|e| match e {
        TypesError::InvalidConfiguration(msg) => SearchError::InvalidConfiguration(msg),
        other => SearchError::Types(other),
    })?;

    let mut fields = fixed_fields();

    fields.extend(indexable_taxonomies.iter().map(FieldSpec::tag));

    let meta_fields: Vec<FieldSpec> = indexable_meta_keys.iter().map(FieldSpec::text).collect();
    fields.extend(hooks.meta_schema.apply(meta_fields, indexable_meta_keys));

    let mut seen = HashSet::with_capacity(fields.len());
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SearchError::SchemaConflict(field.name.clone()));
        }
    }

    Ok(IndexSchema::new(index_name, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressindex_types::FieldType;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fixed_fields_order() {
        let schema = build_schema("blog", &[], &[], &Hooks::new()).unwrap();
        assert_eq!(
            schema.field_names(),
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

        let title = schema.field("post_title").unwrap();
        assert_eq!(title.weight, Some(5.0));
        assert!(title.sortable);
        assert_eq!(schema.field("post_id").unwrap().field_type, FieldType::Numeric);
    }

    #[test]
    fn test_sections_ordered() {
        let schema = build_schema(
            "blog",
            &strings(&["price", "sku"]),
            &strings(&["category", "post_tag"]),
            &Hooks::new(),
        )
        .unwrap();

        let names = schema.field_names();
        assert_eq!(&names[10..], &["category", "post_tag", "price", "sku"]);
        assert_eq!(schema.field("category").unwrap().field_type, FieldType::Tag);
        assert_eq!(schema.field("price").unwrap().field_type, FieldType::Text);
    }

    #[test]
    fn test_deterministic() {
        let meta = strings(&["a", "b"]);
        let tax = strings(&["category"]);
        let hooks = Hooks::new();
        let first = build_schema("blog", &meta, &tax, &hooks).unwrap();
        let second = build_schema("blog", &meta, &tax, &hooks).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_meta_schema_hook_can_modify() {
        let mut hooks = Hooks::new();
        hooks.meta_schema.add(|mut fields, keys| {
            assert_eq!(keys.len(), 1);
            assert_eq!(keys[0], "price");
            fields[0] = FieldSpec::numeric("price").sortable();
            fields
        });

        let schema = build_schema("blog", &strings(&["price"]), &[], &hooks).unwrap();
        let price = schema.field("price").unwrap();
        assert_eq!(price.field_type, FieldType::Numeric);
        assert!(price.sortable);
    }

    #[test]
    fn test_duplicate_names_conflict() {
        let err = build_schema("blog", &strings(&["post_title"]), &[], &Hooks::new()).unwrap_err();
        assert!(matches!(err, SearchError::SchemaConflict(name) if name == "post_title"));

        let err = build_schema(
            "blog",
            &strings(&["genre"]),
            &strings(&["genre"]),
            &Hooks::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::SchemaConflict(_)));

        let err = build_schema("blog", &[], &strings(&["tag", "tag"]), &Hooks::new()).unwrap_err();
        assert!(matches!(err, SearchError::SchemaConflict(_)));
    }

    #[test]
    fn test_invalid_index_name() {
        let err = build_schema("bad name", &[], &[], &Hooks::new()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));
    }
}
