//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub source_dir: String,
    pub posts_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,
    pub parallel: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Listing
    pub per_page: usize,
    pub pagination_dir: String,
    pub feed_limit: usize,

    // Date format (Moment.js style, e.g. `YYYY-MM-DD`)
    pub date_format: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":year/:month/:day/:slug/".to_string(),

            source_dir: "source".to_string(),
            posts_dir: "_posts".to_string(),
            public_dir: "public".to_string(),

            render_drafts: false,
            parallel: true,
            highlight: HighlightConfig::default(),

            per_page: 10,
            pagination_dir: "page".to_string(),
            feed_limit: 20,

            date_format: "YYYY-MM-DD".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        // An empty file is a valid "use every default" config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.permalink, ":year/:month/:day/:slug/");
        assert_eq!(config.per_page, 10);
        assert!(config.parallel);
        assert!(!config.highlight.enable);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Framework Notes
author: Test User
per_page: 5
highlight:
  enable: true
twitter: "@notes"
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Framework Notes");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 5);
        assert!(config.highlight.enable);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert!(config.extra.contains_key("twitter"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiteConfig::from_yaml("\n").unwrap();
        assert_eq!(config.public_dir, "public");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "per_page: [not, a, number]").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("_config.yml"));
    }
}
