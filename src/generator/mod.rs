//! Generator module - renders the whole site in memory, then writes it out

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::{ContentStore, Layout};
use crate::error::{Error, Result};
use crate::helpers::{
    absolutize_urls, date_xml, escape_xml, full_url_for, output_path_for,
    strip_invalid_xml_chars,
};
use crate::index::{build_index, paginate, permalink_for, IndexEntry};
use crate::templates::{NavLink, PostNav, TemplateRenderer};

/// A rendered document and where it goes, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
    /// What produced the file: a post's source path or a generated listing
    pub origin: String,
}

/// Static site generator using the built-in Tera templates
pub struct Generator<'a> {
    config: &'a SiteConfig,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(config: &'a SiteConfig) -> Result<Self> {
        Ok(Self {
            config,
            renderer: TemplateRenderer::new(config)?,
        })
    }

    /// Render every output document. Nothing touches the disk here, so a
    /// render failure leaves the previous output untouched.
    ///
    /// Two documents mapping to the same output file abort the build.
    pub fn render_site(&self, store: &ContentStore) -> Result<Vec<OutputFile>> {
        let index = build_index(store, self.config);

        let mut files = self.render_posts(store)?;
        files.extend(self.render_index_pages(&index)?);
        files.push(self.render_atom_feed(store, &index));
        files.push(self.render_index_json(&index)?);

        let mut seen: HashMap<&Path, &str> = HashMap::with_capacity(files.len());
        for file in &files {
            if let Some(first) = seen.insert(&file.path, &file.origin) {
                return Err(Error::OutputCollision {
                    path: file.path.clone(),
                    first: first.to_string(),
                    second: file.origin.clone(),
                });
            }
        }

        Ok(files)
    }

    /// Generate the entire site into `output_dir`, replacing whatever was
    /// there. Returns the number of files written.
    pub fn generate(&self, store: &ContentStore, output_dir: &Path) -> Result<usize> {
        let files = self.render_site(store)?;

        if output_dir.exists() {
            fs::remove_dir_all(output_dir).map_err(|e| Error::write(output_dir, e))?;
        }
        fs::create_dir_all(output_dir).map_err(|e| Error::write(output_dir, e))?;

        for file in &files {
            let path = output_dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
            }
            fs::write(&path, &file.contents).map_err(|e| Error::write(&path, e))?;
            tracing::debug!("Generated: {:?}", path);
        }

        Ok(files.len())
    }

    /// Render individual post pages
    fn render_posts(&self, store: &ContentStore) -> Result<Vec<OutputFile>> {
        let posts = store.posts();
        let nav_link = |i: usize| {
            let post = &posts[i];
            (post.layout == Layout::Post).then(|| NavLink {
                title: post.title.clone(),
                permalink: permalink_for(post, self.config),
            })
        };

        let mut files = Vec::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            let permalink = permalink_for(post, self.config);
            let nav = PostNav {
                prev: (i + 1 < posts.len()).then(|| nav_link(i + 1)).flatten(),
                next: i.checked_sub(1).and_then(&nav_link),
                permalink,
            };

            let contents = self.renderer.render_post(post, &nav)?;
            files.push(OutputFile {
                path: output_path_for(self.config, &nav.permalink),
                contents,
                origin: post.source.clone(),
            });
        }

        Ok(files)
    }

    /// Render index pages with pagination
    fn render_index_pages(&self, index: &[IndexEntry]) -> Result<Vec<OutputFile>> {
        paginate(index, self.config)
            .iter()
            .map(|page| {
                Ok(OutputFile {
                    path: output_path_for(self.config, &page.url),
                    contents: self.renderer.render_index(page)?,
                    origin: format!("index page {}", page.number),
                })
            })
            .collect()
    }

    /// Render the Atom feed. `<updated>` is the newest post's date so
    /// repeated builds of the same content are byte-identical.
    fn render_atom_feed(&self, store: &ContentStore, index: &[IndexEntry]) -> OutputFile {
        let config = self.config;
        let feed_url = full_url_for(config, "atom.xml");
        let home_url = full_url_for(config, "");
        let updated = store
            .posts()
            .first()
            .map(|p| date_xml(&p.date))
            .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        if !config.description.is_empty() {
            feed.push_str(&format!(
                "  <subtitle>{}</subtitle>\n",
                escape_xml(&config.description)
            ));
        }
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            escape_xml(&feed_url)
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", escape_xml(&home_url)));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", escape_xml(&home_url)));
        if !config.author.is_empty() {
            feed.push_str(&format!(
                "  <author><name>{}</name></author>\n",
                escape_xml(&config.author)
            ));
        }

        let limit = if config.feed_limit == 0 {
            usize::MAX
        } else {
            config.feed_limit
        };
        for (post, entry) in store.iter().zip(index).take(limit) {
            let url = escape_xml(&entry.url);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                date_xml(&post.date)
            ));
            feed.push_str(&format!("    <updated>{}</updated>\n", date_xml(&post.date)));
            if let Some(description) = &post.description {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(description)
                ));
            }
            let content = absolutize_urls(&post.rendered_body, &config.url);
            let content = strip_invalid_xml_chars(&content).replace("]]>", "]]]]><![CDATA[>");
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        OutputFile {
            path: PathBuf::from("atom.xml"),
            contents: feed,
            origin: "atom feed".to_string(),
        }
    }

    /// Render the listing as JSON
    fn render_index_json(&self, index: &[IndexEntry]) -> Result<OutputFile> {
        let json = serde_json::to_string_pretty(index).map_err(|e| Error::Template {
            path: "index.json".to_string(),
            name: "JSON listing".to_string(),
            source: tera::Error::json(e),
        })?;
        Ok(OutputFile {
            path: PathBuf::from("index.json"),
            contents: json + "\n",
            origin: "JSON listing".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use chrono::NaiveDate;

    fn post(slug: &str, date: (i32, u32, u32), layout: Layout) -> Post {
        Post {
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            layout,
            description: Some(format!("About {}", slug)),
            canonical_url: None,
            tags: Vec::new(),
            body: "body".to_string(),
            rendered_body: format!("<p>{} <a href=\"/x/\">x</a></p>\n", slug),
            excerpt: None,
            source: format!("_posts/{}.md", slug),
        }
    }

    fn store() -> ContentStore {
        ContentStore::from_posts(vec![
            post("older", (2018, 4, 30), Layout::Post),
            post("about", (2018, 5, 1), Layout::Page),
            post("newer", (2018, 5, 23), Layout::Post),
        ])
        .unwrap()
    }

    fn file<'f>(files: &'f [OutputFile], path: &str) -> &'f OutputFile {
        files
            .iter()
            .find(|f| f.path == Path::new(path))
            .unwrap_or_else(|| panic!("missing output {path}"))
    }

    #[test]
    fn test_render_site_layout() {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let generator = Generator::new(&config).unwrap();
        let files = generator.render_site(&store()).unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "2018/05/23/newer/index.html",
                "2018/05/01/about/index.html",
                "2018/04/30/older/index.html",
                "index.html",
                "atom.xml",
                "index.json",
            ]
        );

        let index = &file(&files, "index.html").contents;
        let newer = index.find("Title newer").unwrap();
        let older = index.find("Title older").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_navigation_skips_pages() {
        let config = SiteConfig::default();
        let generator = Generator::new(&config).unwrap();
        let files = generator.render_site(&store()).unwrap();

        let newer = &file(&files, "2018/05/23/newer/index.html").contents;
        assert!(!newer.contains(r#"class="prev""#));

        let older = &file(&files, "2018/04/30/older/index.html").contents;
        assert!(!older.contains(r#"class="next""#));
    }

    #[test]
    fn test_atom_feed_is_deterministic() {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            title: "Rails & Friends".to_string(),
            feed_limit: 2,
            ..Default::default()
        };
        let generator = Generator::new(&config).unwrap();
        let first = generator.render_site(&store()).unwrap();
        let second = generator.render_site(&store()).unwrap();
        assert_eq!(first, second);

        let feed = &file(&first, "atom.xml").contents;
        assert!(feed.contains("<title>Rails &amp; Friends</title>"));
        assert!(feed.contains("  <updated>2018-05-23T00:00:00Z</updated>\n"));
        assert!(feed.contains("<id>https://example.com/2018/05/23/newer/</id>"));
        assert!(feed.contains(r#"href="https://example.com/x/""#));
        assert_eq!(feed.matches("<entry>").count(), 2);
    }

    #[test]
    fn test_index_json() {
        let config = SiteConfig::default();
        let generator = Generator::new(&config).unwrap();
        let files = generator.render_site(&store()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&file(&files, "index.json").contents).unwrap();
        assert_eq!(json[0]["slug"], "newer");
        assert_eq!(json[0]["date"], "2018-05-23");
        assert_eq!(json[0]["permalink"], "/2018/05/23/newer/");
    }

    #[test]
    fn test_post_colliding_with_listing_is_rejected() {
        let config = SiteConfig {
            permalink: ":slug.html".to_string(),
            ..Default::default()
        };
        let store = ContentStore::from_posts(vec![post("index", (2018, 5, 23), Layout::Post)])
            .unwrap();
        let generator = Generator::new(&config).unwrap();

        match generator.render_site(&store).unwrap_err() {
            Error::OutputCollision {
                path,
                first,
                second,
            } => {
                assert_eq!(path, Path::new("index.html"));
                assert_eq!(first, "_posts/index.md");
                assert_eq!(second, "index page 1");
            }
            other => panic!("unexpected error: {other}"),
        }

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public");
        assert!(generator.generate(&store, &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_post_colliding_with_pagination_is_rejected() {
        let config = SiteConfig {
            permalink: "page/:slug/".to_string(),
            per_page: 1,
            ..Default::default()
        };
        let store = ContentStore::from_posts(vec![
            post("2", (2018, 5, 23), Layout::Post),
            post("other", (2018, 4, 30), Layout::Post),
        ])
        .unwrap();
        let generator = Generator::new(&config).unwrap();

        let err = generator.render_site(&store).unwrap_err();
        assert!(matches!(err, Error::OutputCollision { ref first, .. } if first == "_posts/2.md"));
        assert!(err.to_string().contains("_posts/2.md"));
    }

    #[test]
    fn test_generate_replaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("stale/index.html"), "old").unwrap();

        let config = SiteConfig::default();
        let generator = Generator::new(&config).unwrap();
        let written = generator.generate(&store(), &out).unwrap();

        assert_eq!(written, 6);
        assert!(!out.join("stale").exists());
        assert!(out.join("2018/05/23/newer/index.html").is_file());
        assert!(out.join("atom.xml").is_file());
    }
}
