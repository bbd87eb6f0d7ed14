//! Build errors
//!
//! Every variant aborts the build. Each one names the document (or file) it
//! was raised for so the operator can find the offending input.

use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions encountered while building a site
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The front-matter block is absent, unterminated or not valid YAML
    #[error("{path}: malformed front-matter: {reason}")]
    MalformedFrontMatter { path: String, reason: String },

    /// A required front-matter key is missing or empty
    #[error("{path}: missing required front-matter field `{field}`")]
    MissingRequiredField { path: String, field: &'static str },

    /// The publication date could not be parsed into a calendar date
    #[error("{path}: invalid publication date `{value}`")]
    InvalidDate { path: String, value: String },

    /// The document has nothing after its front-matter
    #[error("{path}: post body is empty")]
    EmptyBody { path: String },

    /// Two documents resolve to the same slug
    #[error("duplicate slug `{slug}` in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    /// Two documents would be written to the same output file
    #[error("output '{}' would be written by both {first} and {second}", path.display())]
    OutputCollision {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// A post asks for a layout that has no registered template
    #[error("{path}: unknown layout `{layout}`")]
    UnknownLayout { path: String, layout: String },

    /// Reading a source file or directory failed
    #[error("failed to read '{}'", path.display())]
    FilesystemRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an output file or directory failed
    #[error("failed to write '{}'", path.display())]
    FilesystemWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering a template failed while producing `path`
    #[error("{path}: failed to render template `{name}`")]
    Template {
        path: String,
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The site configuration could not be loaded
    #[error("failed to load configuration from '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    /// Wraps an I/O error raised while reading `path`
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FilesystemRead {
            path: path.into(),
            source,
        }
    }

    /// Wraps an I/O error raised while writing `path`
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FilesystemWrite {
            path: path.into(),
            source,
        }
    }
}

/// Default return type for fallible build operations
pub type Result<T> = std::result::Result<T, Error>;
