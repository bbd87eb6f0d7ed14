//! URL helper functions

use std::path::PathBuf;

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/2018/05/23/hello/") // -> "/blog/2018/05/23/hello/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of the file that serves `url`, relative to the output directory.
/// URLs ending in `/` are served by an `index.html` inside that directory.
///
/// The site root is not part of the output layout, so it is stripped.
pub fn output_path_for(config: &SiteConfig, url: &str) -> PathBuf {
    let root = config.root.trim_matches('/');
    let mut path = url.trim_start_matches('/');
    if !root.is_empty() {
        match path.strip_prefix(root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                path = rest.trim_start_matches('/');
            }
            _ => {}
        }
    }

    let mut out: PathBuf = path
        .split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect();
    if path.is_empty() || path.ends_with('/') {
        out.push("index.html");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_root(root: &str) -> SiteConfig {
        SiteConfig {
            url: "https://example.com/".to_string(),
            root: root.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = config_with_root("/");
        assert_eq!(url_for(&config, ""), "/");
        assert_eq!(url_for(&config, "/a/b/"), "/a/b/");

        let config = config_with_root("/blog/");
        assert_eq!(url_for(&config, ""), "/blog/");
        assert_eq!(url_for(&config, "a/b/"), "/blog/a/b/");
    }

    #[test]
    fn test_full_url_for() {
        let config = config_with_root("/blog/");
        assert_eq!(
            full_url_for(&config, "/2018/05/23/hello/"),
            "https://example.com/blog/2018/05/23/hello/"
        );
    }

    #[test]
    fn test_output_path_for() {
        let config = config_with_root("/blog/");
        assert_eq!(
            output_path_for(&config, "/blog/2018/05/23/hello/"),
            PathBuf::from("2018/05/23/hello/index.html")
        );
        assert_eq!(output_path_for(&config, "/blog/"), PathBuf::from("index.html"));

        let config = config_with_root("/");
        assert_eq!(
            output_path_for(&config, "/posts/hello.html"),
            PathBuf::from("posts/hello.html")
        );
        assert_eq!(
            output_path_for(&config, "/../etc/x/"),
            PathBuf::from("etc/x/index.html")
        );
    }
}
