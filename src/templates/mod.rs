//! Built-in theme templates using the Tera template engine
//!
//! Templates are compiled into the binary and only ever substitute data:
//! nothing a post author writes is evaluated as a template. Autoescaping is on,
//! so front-matter values are escaped; rendered markdown is inserted with
//! `safe` because the markdown renderer already escapes raw HTML.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Layout, Post};
use crate::error::{Error, Result};
use crate::helpers::{decode_entities, format_date, strip_html, url_for};
use crate::index::IndexPage;

const INDEX_TEMPLATE: &str = "index.html";

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
    layouts: HashMap<Layout, &'static str>,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("post.html", include_str!("default/post.html")),
            ("page.html", include_str!("default/page.html")),
            (INDEX_TEMPLATE, include_str!("default/index.html")),
        ])
        .map_err(|e| Error::Template {
            path: "built-in theme".to_string(),
            name: "default theme".to_string(),
            source: e,
        })?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        let default_format = config.date_format.clone();
        tera.register_filter(
            "date_format",
            move |value: &tera::Value, args: &HashMap<String, tera::Value>| {
                date_format_filter(value, args, &default_format)
            },
        );

        let layouts = HashMap::from([(Layout::Post, "post.html"), (Layout::Page, "page.html")]);

        Ok(Self {
            tera,
            layouts,
            site: SiteData::from(config),
        })
    }

    /// The template registered for `post`'s layout
    fn template_for(&self, post: &Post) -> Result<&'static str> {
        self.layouts
            .get(&post.layout)
            .copied()
            .ok_or_else(|| Error::UnknownLayout {
                path: post.source.clone(),
                layout: post.layout.to_string(),
            })
    }

    /// Render a post wrapped in its layout
    pub fn render_post(&self, post: &Post, nav: &PostNav) -> Result<String> {
        let template = self.template_for(post)?;

        let mut context = self.base_context();
        context.insert("post", post);
        context.insert("permalink", &nav.permalink);
        context.insert("canonical_url", &canonical_url(post));
        context.insert("prev", &nav.prev);
        context.insert("next", &nav.next);

        self.render(&post.source, template, &context)
    }

    /// Render one page of the post listing
    pub fn render_index(&self, page: &IndexPage) -> Result<String> {
        let mut context = self.base_context();
        context.insert("page", page);
        self.render(&format!("index page {}", page.number), INDEX_TEMPLATE, &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context
    }

    /// Render a template with given context. `document` names what is
    /// being produced, for error reports.
    pub fn render(
        &self,
        document: &str,
        template_name: &str,
        context: &Context,
    ) -> Result<String> {
        self.tera
            .render(template_name, context)
            .map_err(|e| Error::Template {
                path: document.to_string(),
                name: template_name.to_string(),
                source: e,
            })
    }
}

/// Only http(s) origins are linked; anything else in
/// `originally_published_at` is left out of the page.
fn canonical_url(post: &Post) -> Option<&str> {
    post.canonical_url
        .as_deref()
        .map(str::trim)
        .filter(|u| u.starts_with("https://") || u.starts_with("http://"))
}

/// Tera filter: strip HTML tags, leaving plain text for autoescape to
/// encode once
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(decode_entities(&strip_html(&s))))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    let s = s.trim();
    if s.chars().count() <= length {
        Ok(tera::Value::String(s.to_string()))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a `YYYY-MM-DD` date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
    default_format: &str,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => default_format.to_string(),
    };

    match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(tera::Value::String(format_date(&date, &format))),
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Site-wide values every template sees as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub home: String,
    pub feed_url: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            home: url_for(config, ""),
            feed_url: url_for(config, "atom.xml"),
        }
    }
}

/// A link to a neighbouring post
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// Where a post lives and what sits next to it in the listing
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostNav {
    pub permalink: String,
    /// The next older post
    pub prev: Option<NavLink>,
    /// The next newer post
    pub next: Option<NavLink>,
}
