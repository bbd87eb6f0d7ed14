//! Index builder - permalinks and the reverse-chronological listing

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{ContentStore, Post};
use crate::helpers::{full_url_for, url_for};

/// One row of the post listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Root-relative URL, e.g. `/2018/05/23/my-post/`
    pub permalink: String,
    /// Absolute URL including the site domain
    pub url: String,
    pub date: NaiveDate,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
}

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    /// 1-based page number
    pub number: usize,
    pub total: usize,
    /// Root-relative URL of this page
    pub url: String,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub entries: Vec<IndexEntry>,
}

/// Stable output URL for a post: the configured permalink pattern filled in
/// from the post's date and slug, under the site root.
///
/// Supported placeholders: `:year :month :day :i_month :i_day :slug :title`
/// (`:title` is an alias for `:slug`).
pub fn permalink_for(post: &Post, config: &SiteConfig) -> String {
    let date = &post.date;
    let path = config
        .permalink
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":slug", &post.slug)
        .replace(":title", &post.slug);

    url_for(config, &path)
}

/// The listing view over a loaded store, newest first
pub fn build_index(store: &ContentStore, config: &SiteConfig) -> Vec<IndexEntry> {
    store
        .iter()
        .map(|post| {
            let permalink = permalink_for(post, config);
            IndexEntry {
                slug: post.slug.clone(),
                title: post.title.clone(),
                description: post.description.clone(),
                url: full_url_for(config, &permalink_without_root(&permalink, config)),
                permalink,
                date: post.date,
                excerpt: post.excerpt.clone(),
                tags: post.tags.clone(),
            }
        })
        .collect()
}

/// Split the listing into pages of `per_page` entries. Page 1 lives at the
/// site root, page N at `<root><pagination_dir>/N/`. A `per_page` of zero puts
/// everything on one page. An empty listing still yields one (empty) page.
pub fn paginate(entries: &[IndexEntry], config: &SiteConfig) -> Vec<IndexPage> {
    let chunks: Vec<&[IndexEntry]> = if entries.is_empty() || config.per_page == 0 {
        vec![entries]
    } else {
        entries.chunks(config.per_page).collect()
    };

    let total = chunks.len();
    let page_url = |number: usize| {
        if number == 1 {
            url_for(config, "")
        } else {
            url_for(config, &format!("{}/{}/", config.pagination_dir, number))
        }
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let number = i + 1;
            IndexPage {
                number,
                total,
                url: page_url(number),
                prev_url: (number > 1).then(|| page_url(number - 1)),
                next_url: (number < total).then(|| page_url(number + 1)),
                entries: chunk.to_vec(),
            }
        })
        .collect()
}

fn permalink_without_root(permalink: &str, config: &SiteConfig) -> String {
    let root = config.root.trim_end_matches('/');
    permalink
        .strip_prefix(root)
        .unwrap_or(permalink)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Layout;

    fn post(slug: &str, date: (i32, u32, u32)) -> Post {
        Post {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            layout: Layout::Post,
            description: None,
            canonical_url: None,
            tags: Vec::new(),
            body: "body".to_string(),
            rendered_body: "<p>body</p>\n".to_string(),
            excerpt: None,
            source: format!("_posts/{}.md", slug),
        }
    }

    #[test]
    fn test_permalink_default_pattern() {
        let config = SiteConfig::default();
        assert_eq!(
            permalink_for(&post("my-post", (2018, 5, 3)), &config),
            "/2018/05/03/my-post/"
        );
    }

    #[test]
    fn test_permalink_custom_pattern_and_root() {
        let config = SiteConfig {
            root: "/blog/".to_string(),
            permalink: "posts/:i_month-:i_day/:title.html".to_string(),
            ..Default::default()
        };
        assert_eq!(
            permalink_for(&post("my-post", (2018, 5, 3)), &config),
            "/blog/posts/5-3/my-post.html"
        );
    }

    #[test]
    fn test_permalink_is_stable() {
        let config = SiteConfig::default();
        let p = post("stable", (2018, 4, 30));
        assert_eq!(permalink_for(&p, &config), permalink_for(&p.clone(), &config));
    }

    #[test]
    fn test_index_lists_newest_first() {
        let store = ContentStore::from_posts(vec![
            post("april", (2018, 4, 30)),
            post("may", (2018, 5, 23)),
        ])
        .unwrap();
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..Default::default()
        };

        let index = build_index(&store, &config);
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].slug, "may");
        assert_eq!(index[0].permalink, "/blog/2018/05/23/may/");
        assert_eq!(index[0].url, "https://example.com/blog/2018/05/23/may/");
        assert_eq!(index[1].slug, "april");
    }

    #[test]
    fn test_paginate() {
        let posts: Vec<Post> = (1..=5).map(|d| post(&format!("p{d}"), (2018, 1, d))).collect();
        let store = ContentStore::from_posts(posts).unwrap();
        let config = SiteConfig {
            per_page: 2,
            ..Default::default()
        };
        let entries = build_index(&store, &config);

        let pages = paginate(&entries, &config);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].url, "/");
        assert_eq!(pages[0].prev_url, None);
        assert_eq!(pages[0].next_url.as_deref(), Some("/page/2/"));
        assert_eq!(pages[1].prev_url.as_deref(), Some("/"));
        assert_eq!(pages[2].url, "/page/3/");
        assert_eq!(pages[2].entries.len(), 1);
        assert_eq!(pages[2].entries[0].slug, "p1");
    }

    #[test]
    fn test_paginate_disabled_and_empty() {
        let config = SiteConfig {
            per_page: 0,
            ..Default::default()
        };
        let store = ContentStore::from_posts(vec![post("a", (2018, 1, 1))]).unwrap();
        let entries = build_index(&store, &config);
        assert_eq!(paginate(&entries, &config).len(), 1);

        let pages = paginate(&[], &config);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].entries.is_empty());
    }
}
