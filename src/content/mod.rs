//! Content module - handles posts, front-matter and markdown processing

mod frontmatter;
mod markdown;
mod post;
pub mod store;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, MORE_MARKER};
pub use post::{Layout, Post};
pub use store::{ContentStore, PostLoader};
