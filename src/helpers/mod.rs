//! Helper functions shared by the index builder, the templates and the
//! generator: URL generation, date formatting and HTML/XML text handling.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
