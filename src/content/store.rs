//! Content store - loads every post of one build from the source directory

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, Layout, MarkdownRenderer, Post};
use crate::config::SiteConfig;
use crate::error::{Error, Result};

lazy_static! {
    /// Jekyll-style post file names: `2018-05-23-my-post`
    static ref DATED_NAME: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").expect("valid file name pattern");
}

/// The ordered set of posts for one build.
///
/// Posts are sorted newest first, ties broken by slug. The store is built once
/// and never mutated.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Vec<Post>,
}

impl ContentStore {
    /// Load all posts from `<source_dir>/<posts_dir>`
    pub fn load(config: &SiteConfig, source_dir: &Path) -> Result<Self> {
        let loader = PostLoader::new(config, source_dir);
        let posts = loader.load_all()?;
        Self::from_posts(posts)
    }

    /// Build a store from already-parsed posts. Rejects duplicate slugs;
    /// the error names the two sources in the order they were given.
    pub fn from_posts(mut posts: Vec<Post>) -> Result<Self> {
        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(posts.len());
        for post in &posts {
            if let Some(first) = seen.insert(&post.slug, &post.source) {
                return Err(Error::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.to_string(),
                    second: post.source.clone(),
                });
            }
        }

        posts.sort_by(Post::listing_order);
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Look a post up by slug
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }
}

impl<'a> IntoIterator for &'a ContentStore {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

/// Parses post files into [`Post`]s
pub struct PostLoader<'a> {
    config: &'a SiteConfig,
    source_dir: &'a Path,
    renderer: MarkdownRenderer,
}

impl<'a> PostLoader<'a> {
    pub fn new(config: &'a SiteConfig, source_dir: &'a Path) -> Self {
        Self {
            config,
            source_dir,
            renderer: MarkdownRenderer::with_options(&config.highlight),
        }
    }

    /// Load every published post. The first failing document, in file-path
    /// order, aborts the load.
    pub fn load_all(&self) -> Result<Vec<Post>> {
        let files = self.discover()?;

        let results: Vec<Result<Option<Post>>> = if self.config.parallel {
            files.par_iter().map(|path| self.load_post(path)).collect()
        } else {
            files.iter().map(|path| self.load_post(path)).collect()
        };

        let mut posts = Vec::with_capacity(results.len());
        for result in results {
            if let Some(post) = result? {
                posts.push(post);
            }
        }

        tracing::info!("Loaded {} posts", posts.len());
        Ok(posts)
    }

    /// Markdown files under the posts directory, sorted by path
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let posts_dir = self.source_dir.join(&self.config.posts_dir);
        if !posts_dir.is_dir() {
            return Err(Error::read(
                &posts_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "posts directory not found"),
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(posts_dir.as_path()).to_path_buf();
                Error::read(path, e.into())
            })?;
            if entry.file_type().is_file() && is_markdown_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Load a single post from a file. Returns `None` for unpublished posts
    /// when drafts are not rendered.
    pub fn load_post(&self, path: &Path) -> Result<Option<Post>> {
        let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let source = path
            .strip_prefix(self.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let (fm, body) = FrontMatter::parse(&source, &content)?;

        if !fm.published && !self.config.render_drafts {
            tracing::info!("Skipping unpublished post {}", source);
            return Ok(None);
        }

        let layout_name = fm.layout.unwrap_or_default();
        let layout: Layout = layout_name.parse().map_err(|_| Error::UnknownLayout {
            path: source.clone(),
            layout: layout_name.clone(),
        })?;
        let title = fm.title.unwrap_or_default().trim().to_string();

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let (name_date, name_slug) = match DATED_NAME.captures(stem) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str()),
                caps.get(2).map_or(stem, |m| m.as_str()),
            ),
            None => (None, stem),
        };

        let date = match fm.date.as_deref().or(name_date) {
            Some(value) => parse_date_string(value).ok_or_else(|| Error::InvalidDate {
                path: source.clone(),
                value: value.to_string(),
            })?,
            None => {
                return Err(Error::MissingRequiredField {
                    path: source,
                    field: "date",
                })
            }
        };

        let slug = [fm.slug.as_deref(), Some(name_slug), Some(title.as_str())]
            .into_iter()
            .flatten()
            .map(slug::slugify)
            .find(|s| !s.is_empty())
            .ok_or_else(|| Error::MissingRequiredField {
                path: source.clone(),
                field: "slug",
            })?;

        if body.trim().is_empty() {
            return Err(Error::EmptyBody { path: source });
        }

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body);
        let rendered_body = self.renderer.render(&full_md);
        let excerpt = excerpt_md
            .filter(|e| !e.trim().is_empty())
            .map(|e| self.renderer.render(&e));

        tracing::debug!("Parsed {} as `{}`", source, slug);

        Ok(Some(Post {
            slug,
            title,
            date,
            layout,
            description: fm.description.filter(|d| !d.trim().is_empty()),
            canonical_url: fm.originally_published_at.filter(|u| !u.trim().is_empty()),
            tags: fm.tags,
            body: body.to_string(),
            rendered_body,
            excerpt,
            source,
        }))
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset, and Jekyll's `2018-05-23 10:00:00 +0200`
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|dt| dt.date_naive())
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
