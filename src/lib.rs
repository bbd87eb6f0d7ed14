//! folio: a static blog generator
//!
//! Markdown posts with YAML front matter are parsed into an ordered content
//! store, rendered through compiled-in Tera layouts and written out together
//! with a paginated index, an Atom feed and a JSON listing.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod index;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Component, Path, PathBuf};

use content::{ContentStore, Layout};

/// A site rooted at one base directory
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Folio {
    /// Open the site in `base_dir`, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::warn!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Open the site in `base_dir` with an already-loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Result<Self> {
        let config_path = base_dir.join("_config.yml");
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        if !config.permalink.contains(":slug") && !config.permalink.contains(":title") {
            return Err(Error::Config {
                path: config_path,
                reason: format!(
                    "permalink `{}` must contain :slug or :title",
                    config.permalink
                ),
            });
        }

        // The output directory is wiped on every build
        let public = normalize(&public_dir);
        if public == normalize(&base_dir) || normalize(&source_dir).starts_with(&public) {
            return Err(Error::Config {
                path: config_path,
                reason: format!(
                    "public_dir `{}` would overwrite the site sources",
                    config.public_dir
                ),
            });
        }

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        })
    }

    /// Load every post into a content store
    pub fn load(&self) -> Result<ContentStore> {
        ContentStore::load(&self.config, &self.source_dir)
    }

    /// Build the static site
    pub fn build(&self) -> Result<commands::build::BuildSummary> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post, returning the path of the scaffolded file
    pub fn new_post(&self, title: &str, layout: Layout) -> Result<PathBuf> {
        commands::new::run(self, title, layout)
    }
}

/// Lexically normalize a path: drop `.` and resolve `..` against earlier
/// components. Paths are compared before they exist, so nothing is
/// canonicalized on disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "Folio");
        assert_eq!(folio.source_dir, dir.path().join("source"));
        assert_eq!(folio.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_new_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: My Blog\npublic_dir: site\n",
        )
        .unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "My Blog");
        assert_eq!(folio.public_dir, dir.path().join("site"));
    }

    #[test]
    fn test_rejects_permalink_without_slug() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "permalink: :year/:month/\n").unwrap();
        let err = Folio::new(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_public_dir_over_sources() {
        for public_dir in [".", "", "./", "source/.."] {
            let config = config::SiteConfig {
                public_dir: public_dir.to_string(),
                ..Default::default()
            };
            let err = Folio::with_config(PathBuf::from("/site"), config).unwrap_err();
            assert!(
                matches!(err, Error::Config { .. }),
                "public_dir {public_dir:?} accepted"
            );
        }

        let config = config::SiteConfig {
            source_dir: "public/source".to_string(),
            ..Default::default()
        };
        assert!(Folio::with_config(PathBuf::from("/site"), config).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/")), PathBuf::from("/a"));
    }
}
