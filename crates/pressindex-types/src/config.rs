//! Configuration loading for pressindex.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/pressindex/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Post types owned by extensions; never indexed.
pub const RESERVED_POST_TYPES: &[&str] = &["product"];

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Public site URL, used to derive the default index name
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Explicit index name; derived from `site_url` when unset or empty
    #[serde(default)]
    pub index_name: Option<String>,

    /// Index engine host
    #[serde(default = "default_server")]
    pub server: String,

    /// Index engine port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Documents per bulk indexing batch
    #[serde(default = "default_indexing_batches")]
    pub indexing_batches: usize,

    /// Ask the engine to persist to disk after mutations
    #[serde(default)]
    pub write_to_disk: bool,

    /// Post types eligible for indexing
    #[serde(default = "default_post_types")]
    pub post_types: Vec<String>,

    /// Taxonomies indexed as TAG fields
    #[serde(default)]
    pub indexable_taxonomies: Vec<String>,

    /// Metadata keys indexed as TEXT fields
    #[serde(default)]
    pub indexable_meta_keys: Vec<String>,

    /// Default indexing language
    #[serde(default = "default_language")]
    pub language: String,

    /// Path to the RocksDB options/progress store
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Path to the exported corpus (JSON)
    #[serde(default)]
    pub corpus_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_server() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_indexing_batches() -> usize {
    20
}

fn default_post_types() -> Vec<String> {
    vec!["post".to_string()]
}

fn default_language() -> String {
    "english".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "pressindex")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            index_name: None,
            server: default_server(),
            port: default_port(),
            indexing_batches: default_indexing_batches(),
            write_to_disk: false,
            post_types: default_post_types(),
            indexable_taxonomies: Vec::new(),
            indexable_meta_keys: Vec::new(),
            language: default_language(),
            db_path: default_db_path(),
            corpus_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/pressindex/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PRESSINDEX_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "pressindex")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("site_url", default_site_url())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("server", default_server())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("port", default_port() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("indexing_batches", default_indexing_batches() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("write_to_disk", false)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("language", default_language())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("db_path", default_db_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PRESSINDEX_INDEXING_BATCHES=50, PRESSINDEX_POST_TYPES=post,page
        builder = builder.add_source(
            Environment::with_prefix("PRESSINDEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("post_types")
                .with_list_parse_key("indexable_taxonomies")
                .with_list_parse_key("indexable_meta_keys"),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))
    }

    /// The configured index name, or one derived from the site URL.
    pub fn index_name(&self) -> String {
        match self.index_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derive_index_name(&self.site_url),
        }
    }

    /// Connection URL for the index engine.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.server, self.port)
    }

    /// Eligible post types: configured list (or `post` when empty) minus
    /// reserved types.
    pub fn indexable_post_types(&self) -> Vec<String> {
        let configured: Vec<String> = self
            .post_types
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let types = if configured.is_empty() {
            default_post_types()
        } else {
            configured
        };

        types
            .into_iter()
            .filter(|t| !RESERVED_POST_TYPES.contains(&t.as_str()))
            .collect()
    }

    /// Fail fast on values that would make any engine call meaningless.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.indexing_batches == 0 {
            return Err(TypesError::InvalidConfiguration(
                "indexing_batches must be > 0".to_string(),
            ));
        }
        validate_index_name(&self.index_name())
    }

    /// Expand ~ in db_path to the home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

/// Derive an index name from a site URL: `https://my-site.example.com/blog`
/// becomes `my_site_example_com_blog`. Anything other than an ASCII letter,
/// digit or `_` becomes `_`, so the result always passes
/// [`validate_index_name`] unless empty.
pub fn derive_index_name(site_url: &str) -> String {
    let without_scheme = site_url
        .strip_prefix("https://")
        .or_else(|| site_url.strip_prefix("http://"))
        .unwrap_or(site_url);

    without_scheme
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Index names must be non-empty and limited to `[A-Za-z0-9_:-]`.
pub fn validate_index_name(name: &str) -> Result<(), TypesError> {
    if name.is_empty() {
        return Err(TypesError::InvalidConfiguration(
            "index name is empty".to_string(),
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-')))
    {
        return Err(TypesError::InvalidConfiguration(format!(
            "index name {:?} contains invalid character {:?}",
            name, bad
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server, "127.0.0.1");
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.indexing_batches, 20);
        assert!(!settings.write_to_disk);
        assert_eq!(settings.post_types, vec!["post"]);
        assert_eq!(settings.language, "english");
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert!(!settings.server.is_empty());
        assert!(settings.indexing_batches > 0);
    }

    #[test]
    fn test_redis_url() {
        let settings = Settings::default();
        assert_eq!(settings.redis_url(), "redis://127.0.0.1:6379/");
    }

    #[test]
    fn test_derive_index_name() {
        assert_eq!(
            derive_index_name("https://my-site.example.com/blog"),
            "my_site_example_com_blog"
        );
        assert_eq!(derive_index_name("http://localhost"), "localhost");
        assert_eq!(derive_index_name("example.org/"), "example_org");
    }

    #[test]
    fn test_derived_name_from_unusual_url_is_valid() {
        for (url, expected) in [
            ("http://example.com/~blog", "example_com__blog"),
            ("https://user@example.com/100%", "user_example_com_100_"),
            ("http://localhost:8080/caf\u{e9}", "localhost_8080_caf_"),
        ] {
            let name = derive_index_name(url);
            assert_eq!(name, expected);
            assert!(validate_index_name(&name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_settings_with_unusual_site_url_validate() {
        let settings = Settings {
            site_url: "https://example.com/~news".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.index_name(), "example_com__news");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_index_name_prefers_configured() {
        let mut settings = Settings {
            site_url: "https://news.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.index_name(), "news_example_com");

        settings.index_name = Some("   ".to_string());
        assert_eq!(settings.index_name(), "news_example_com");

        settings.index_name = Some("custom_idx".to_string());
        assert_eq!(settings.index_name(), "custom_idx");
    }

    #[test]
    fn test_indexable_post_types_excludes_reserved() {
        let mut settings = Settings {
            post_types: vec!["post".into(), "product".into(), "page".into()],
            ..Default::default()
        };
        assert_eq!(settings.indexable_post_types(), vec!["post", "page"]);

        settings.post_types = vec![];
        assert_eq!(settings.indexable_post_types(), vec!["post"]);
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.indexing_batches = 0;
        assert!(matches!(
            settings.validate(),
            Err(TypesError::InvalidConfiguration(_))
        ));

        settings.indexing_batches = 20;
        settings.index_name = Some("has space".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_index_name() {
        assert!(validate_index_name("blog_example_com").is_ok());
        assert!(validate_index_name("idx:posts-v2").is_ok());
        assert!(validate_index_name("").is_err());
        assert!(validate_index_name("a/b").is_err());
    }

    #[test]
    fn test_load_from_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pressindex.toml");

        let written = Settings {
            index_name: Some("from_file".to_string()),
            indexing_batches: 35,
            indexable_meta_keys: vec!["color".to_string()],
            ..Default::default()
        };
        std::fs::write(&path, toml::to_string(&written).unwrap()).unwrap();

        let loaded = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.index_name(), "from_file");
        assert_eq!(loaded.indexing_batches, 35);
        assert_eq!(loaded.indexable_meta_keys, vec!["color"]);
    }

    #[test]
    fn test_load_missing_config_file_fails() {
        assert!(matches!(
            Settings::load(Some("/nonexistent/pressindex.toml")),
            Err(TypesError::Config(_))
        ));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"indexing_batches": 50, "indexable_taxonomies": ["category", "post_tag"]}"#,
        )
        .unwrap();
        assert_eq!(settings.indexable_taxonomies, vec!["category", "post_tag"]);
        assert_eq!(settings.indexing_batches, 50);
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.post_types, vec!["post"]);
    }
}
