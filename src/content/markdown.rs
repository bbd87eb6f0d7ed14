//! Markdown rendering
//!
//! Code blocks are never handed to the markdown formatter: their text is
//! collected, escaped and embedded as-is (or passed through the syntax
//! highlighter, which escapes as well). Raw HTML in a post body is escaped
//! rather than passed through, since posts come from many contributors.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Marker separating a post's excerpt from the rest of its body
pub const MORE_MARKER: &str = "<!-- more -->";

struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

/// Markdown renderer with optional syntax highlighting
pub struct MarkdownRenderer {
    highlighter: Option<Highlighter>,
}

impl MarkdownRenderer {
    /// Create a plain renderer: code blocks are escaped, not highlighted
    pub fn new() -> Self {
        Self { highlighter: None }
    }

    /// Create a renderer from the site's highlight settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        if !config.enable {
            return Self::new();
        }

        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set.themes.remove(&config.theme).or_else(|| {
            tracing::warn!(
                "Unknown highlight theme {:?}, falling back to the first bundled theme",
                config.theme
            );
            theme_set.themes.into_values().next()
        });

        Self {
            highlighter: theme.map(|theme| Highlighter {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
                line_numbers: config.line_number,
            }),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, markdown_options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => code_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let block = self.code_block(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => code_block_content.push_str(&text),
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        match &self.highlighter {
            Some(highlighter) => highlighter.highlight(code, lang),
            None => plain_code_block(code, lang),
        }
    }

    /// Split content at `<!-- more -->`.
    /// Returns (excerpt, full content without the marker).
    ///
    /// Only a marker standing as its own top-level HTML block counts. One
    /// inside a code block, a code span or a nested block is left alone, and
    /// the rest of the source is kept byte for byte.
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        let mut depth = 0usize;
        let mut block = None;
        let mut block_html = String::new();

        for (event, range) in Parser::new_ext(content, markdown_options()).into_offset_iter() {
            match event {
                Event::Start(Tag::HtmlBlock) => {
                    if depth == 0 {
                        block = Some(range);
                        block_html.clear();
                    }
                    depth += 1;
                }
                Event::Html(html) if depth == 1 && block.is_some() => block_html.push_str(&html),
                Event::End(TagEnd::HtmlBlock) => {
                    depth = depth.saturating_sub(1);
                    match block.take() {
                        Some(range) if depth == 0 && block_html.trim() == MORE_MARKER => {
                            let excerpt = &content[..range.start];
                            // Keep a paragraph break where the marker was
                            let full = format!("{}\n{}", excerpt, &content[range.end..]);
                            return (Some(excerpt.to_string()), full);
                        }
                        _ => {}
                    }
                }
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        (None, content.to_string())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let token = lang.unwrap_or("text");
        let syntax = self
            .syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) if self.line_numbers => add_line_numbers(&highlighted, token),
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                token, highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting failed, emitting plain block: {}", e);
                plain_code_block(code, lang)
            }
        }
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Language token from a fenced block's info string, restricted to
/// characters that are safe inside a class attribute
fn code_language(info: &str) -> Option<String> {
    let lang: String = info
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect();
    if lang.is_empty() {
        None
    } else {
        Some(lang)
    }
}

fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            lang,
            html_escape(code)
        ),
        None => format!("<pre><code>{}</code></pre>", html_escape(code)),
    }
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang,
        gutter,
        lines.join("\n")
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
