// src/extract/mod.rs
// =============================================================================
// This module turns the text of one document into links and anchors.
//
// Submodules:
// - markdown: builds the raw and intermediate (rendered HTML) representations
// - links: regex scanning and link classification
// - paths: lexical path resolution
// - slug: GitHub-style heading ids
//
// The intermediate pass runs first, then the raw pass; results are merged.
// If the intermediate form can't be built we still scan the raw text, unless
// the file is a primary doc (.md / .mdx), in which case we give up loudly.
// =============================================================================

mod links;
mod markdown;
pub mod paths;
mod slug;

use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};

pub use links::{ExtractedLinks, LinkRecord};

/// Extensions that are always parsed, and whose parse failures are fatal.
pub const PRIMARY_EXTENSIONS: [&str; 2] = ["md", "mdx"];

pub const DEFAULT_INDEX_FILE: &str = "index.mdx";

/// How a document is treated when its intermediate form can't be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Real documentation source: failures abort the run
    Primary,
    /// Scanned opportunistically: failures fall back to raw text
    Incidental,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Appended to directory links (`./guide/` -> `./guide/index.mdx`)
    pub index_file: String,
    /// Extra extensions to scan as incidental documents
    pub extra_extensions: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            index_file: DEFAULT_INDEX_FILE.to_string(),
            extra_extensions: Vec::new(),
        }
    }
}

impl ExtractOptions {
    pub fn is_document_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        PRIMARY_EXTENSIONS.contains(&ext.as_str()) || self.extra_extensions.iter().any(|e| *e == ext)
    }

    /// `None` for files we only check for existence (images, PDFs, ...).
    pub fn kind_of(&self, path: &Path) -> Option<DocumentKind> {
        let ext = paths::extension_of(path)?;

        if PRIMARY_EXTENSIONS.contains(&ext.as_str()) {
            Some(DocumentKind::Primary)
        } else if self.extra_extensions.iter().any(|e| *e == ext) {
            Some(DocumentKind::Incidental)
        } else {
            None
        }
    }
}

/// Extracts links and anchors from `text`, the contents of `document`.
///
/// `document` must be absolute; internal links are resolved against it.
pub fn extract(
    text: &str,
    document: &Path,
    kind: DocumentKind,
    options: &ExtractOptions,
) -> Result<ExtractedLinks> {
    let raw = markdown::strip_fenced_code(text);
    let mut found = ExtractedLinks::default();

    match markdown::render_intermediate(&raw) {
        Ok(intermediate) => {
            links::scan(&intermediate, links::Source::Intermediate, document, options, &mut found);
        }
        Err(reason) if kind == DocumentKind::Primary => {
            return Err(Error::ParseFailure {
                path: document.to_path_buf(),
                reason,
            });
        }
        Err(reason) => {
            warn!("{}: {reason}; scanning raw text only", document.display());
        }
    }

    links::scan(&raw, links::Source::Raw, document, options, &mut found);
    Ok(found)
}
