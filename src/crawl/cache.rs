// src/crawl/cache.rs
// =============================================================================
// The document cache: absolute path -> links and anchors found in that file.
//
// - Each file is read and extracted at most once per run.
// - Entries are never changed or removed after they are inserted.
// - Insertion order is kept, because the walker visits documents in the
//   order they were discovered.
//
// The cache is a plain value owned by whoever runs the check; there is no
// global state and no locking.
// =============================================================================

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::{self, paths, DocumentKind, ExtractOptions, LinkRecord};

/// One parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    /// The path as it was first requested
    pub path: PathBuf,
    /// Cache key
    pub absolute: PathBuf,
    pub kind: DocumentKind,
    pub external: Vec<String>,
    pub internal: Vec<LinkRecord>,
    pub catalog: Vec<String>,
    pub anchors: BTreeSet<String>,
}

impl DocumentEntry {
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors.contains(anchor)
    }
}

#[derive(Debug, Default)]
pub struct DocumentCache {
    options: ExtractOptions,
    entries: Vec<Arc<DocumentEntry>>,
    index: HashMap<PathBuf, usize>,
    extractions: usize,
}

impl DocumentCache {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Builds a cache from seed files, relative to `base_dir`, in order.
    pub fn from_seeds<P: AsRef<Path>>(base_dir: &Path, seeds: &[P], options: ExtractOptions) -> Result<Self> {
        let mut cache = Self::new(options);
        for seed in seeds {
            cache.ensure_populated(&base_dir.join(seed))?;
        }
        Ok(cache)
    }

    /// Makes sure `path` is in the cache.
    ///
    /// Returns `Ok(true)` only when this call parsed the file. Paths that are
    /// already cached, and files that aren't documents, are a silent no-op.
    pub fn ensure_populated(&mut self, path: &Path) -> Result<bool> {
        let absolute = paths::absolutize(path);

        if self.index.contains_key(&absolute) {
            return Ok(false);
        }

        let Some(kind) = self.options.kind_of(&absolute) else {
            return Ok(false);
        };

        let text = read_lossy(&absolute)?;

        self.extractions += 1;
        let found = extract::extract(&text, &absolute, kind, &self.options)?;

        debug!(
            "cached {} ({} external, {} internal, {} catalog, {} anchors)",
            absolute.display(),
            found.external.len(),
            found.internal.len(),
            found.catalog.len(),
            found.anchors.len()
        );

        let entry = DocumentEntry {
            path: path.to_path_buf(),
            absolute: absolute.clone(),
            kind,
            external: found.external,
            internal: found.internal,
            catalog: found.catalog,
            anchors: found.anchors,
        };

        self.index.insert(absolute, self.entries.len());
        self.entries.push(Arc::new(entry));
        Ok(true)
    }

    pub fn lookup(&self, absolute: &Path) -> Option<&DocumentEntry> {
        self.index.get(absolute).map(|&i| self.entries[i].as_ref())
    }

    /// Cheap shared handle to an entry, so the walker can hold one while it
    /// keeps adding documents to the cache.
    pub fn entry(&self, absolute: &Path) -> Option<Arc<DocumentEntry>> {
        self.index.get(absolute).map(|&i| Arc::clone(&self.entries[i]))
    }

    /// Cached paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(|entry| entry.absolute.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times the extractor has run.
    pub fn extractions(&self) -> usize {
        self.extractions
    }
}

/// Reads a document, replacing bytes that aren't UTF-8 (Latin-1 docs) with U+FFFD.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_populating_twice_extracts_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "# Title\n").unwrap();

        let mut cache = DocumentCache::new(ExtractOptions::default());
        assert!(cache.ensure_populated(&file).unwrap());
        assert!(!cache.ensure_populated(&file).unwrap());
        // Same file through a different spelling of the path
        assert!(!cache.ensure_populated(&dir.path().join("./sub/../a.md")).unwrap());

        assert_eq!(cache.extractions(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_non_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, [0u8, 1, 2]).unwrap();

        let mut cache = DocumentCache::new(ExtractOptions::default());
        assert!(!cache.ensure_populated(&image).unwrap());
        assert!(cache.is_empty());
        assert_eq!(cache.extractions(), 0);
    }

    #[test]
    fn test_missing_document_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DocumentCache::new(ExtractOptions::default());
        let result = cache.ensure_populated(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_non_utf8_document_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("latin1.md");
        fs::write(&file, b"# Caf\xe9\n\n[next](./next.md)\n").unwrap();

        let mut cache = DocumentCache::new(ExtractOptions::default());
        assert!(cache.ensure_populated(&file).unwrap());

        let entry = cache.lookup(&paths::absolutize(&file)).unwrap();
        assert_eq!(entry.internal.len(), 1);
        assert_eq!(entry.anchors.len(), 1);
    }

    #[test]
    fn test_seeds_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "<h2 id=\"x\">a</h2>").unwrap();

        let cache = DocumentCache::from_seeds(dir.path(), &["b.md", "a.md", "b.md"], ExtractOptions::default()).unwrap();
        let names: Vec<_> = cache.paths().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["b.md", "a.md"]);

        let a = cache.lookup(&paths::absolutize(&dir.path().join("a.md"))).unwrap();
        assert!(a.has_anchor("x"));
        assert_eq!(a.path, dir.path().join("a.md"));
    }
}
