//! HTML and XML text helpers

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// `href="/` or `src="/`, capturing a second slash if one follows
    static ref ROOT_RELATIVE: Regex =
        Regex::new(r#"\b(href|src)="/(/?)"#).expect("valid attribute pattern");
}

/// Strip HTML tags from content
pub fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Decode the entities the markdown renderer emits, so stripped text can be
/// escaped again exactly once
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert root-relative URLs in HTML content to absolute URLs.
/// Protocol-relative URLs (`//host/...`) are left alone.
pub fn absolutize_urls(content: &str, base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    ROOT_RELATIVE
        .replace_all(content, |caps: &Captures| {
            if caps[2].is_empty() {
                format!("{}=\"{}/", &caps[1], base_url)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Strip characters XML 1.0 does not allow
/// (`#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`)
pub fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}
