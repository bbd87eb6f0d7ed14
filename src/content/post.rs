//! Post model

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The closed set of layouts a post can ask for. Each one maps to a template
/// compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// A dated article, listed in the index and the feed
    Post,
    /// A standalone article without prev/next navigation
    Page,
}

impl Layout {
    pub const ALL: [Layout; 2] = [Layout::Post, Layout::Page];

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Post => "post",
            Layout::Page => "page",
        }
    }
}

impl FromStr for Layout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.name() == s.trim())
            .ok_or(())
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A blog post. Immutable once the content store has loaded it.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// URL-friendly identifier, unique within a build
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Layout template to use
    pub layout: Layout,

    /// Short summary shown in listings
    pub description: Option<String>,

    /// External URL the post was first published at
    pub canonical_url: Option<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// Raw markdown content
    pub body: String,

    /// Rendered HTML content
    pub rendered_body: String,

    /// Rendered HTML of the text before `<!-- more -->`
    pub excerpt: Option<String>,

    /// Source file path, relative to the source directory
    pub source: String,
}

impl Post {
    /// Sort key: newest first, then slug ascending
    pub fn listing_order(a: &Post, b: &Post) -> std::cmp::Ordering {
        b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!("post".parse::<Layout>(), Ok(Layout::Post));
        assert_eq!(" page ".parse::<Layout>(), Ok(Layout::Page));
        assert!("default".parse::<Layout>().is_err());
        assert!("Post".parse::<Layout>().is_err());
    }
}
