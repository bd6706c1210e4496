// src/error.rs
// =============================================================================
// Typed errors for everything below main.rs.
//
// Only a few of these stop a run: a primary doc that can't be transformed,
// a file we can't read, a bad --ignore glob or catalog URL, a broken config
// file. Broken links are NOT errors here - they end up in the Report.
//
// main.rs converts these into anyhow errors with the ? operator.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the extract, crawl and checker modules.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A document could not be turned into its intermediate form.
    #[error("unable to parse {}: {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    /// Reading a document from disk failed.
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid catalog URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The catalog service did not hand out its entry list.
    #[error("catalog index unavailable at {url}: {reason}")]
    Catalog { url: String, reason: String },

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
