// src/discover.rs
// =============================================================================
// Finds the seed documents when none are given on the command line.
//
// Strategy:
// - Walk the docs directory with `walkdir`, in file-name order so runs are
//   reproducible
// - Skip hidden directories (.git, .storybook, ...) and node_modules
// - Keep only primary docs (.md / .mdx); incidental files are only read when
//   a document links to them
// =============================================================================

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::{DirEntry, WalkDir};

use crate::extract::{DocumentKind, ExtractOptions};

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (name.starts_with('.') || name == "node_modules")
}

/// Primary documents under `dir`, relative to it.
pub fn find_documents(dir: &Path, options: &ExtractOptions) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        // depth 0 is `dir` itself, which may well be "."
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable path: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| options.kind_of(entry.path()) == Some(DocumentKind::Primary))
        .filter_map(|entry| entry.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_primary_docs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "b.mdx",
            "a.md",
            "guide/setup.md",
            "notes.txt",
            "logo.png",
            ".storybook/preview.mdx",
            "node_modules/pkg/README.md",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }

        let options = ExtractOptions {
            extra_extensions: vec!["txt".to_string()],
            ..ExtractOptions::default()
        };
        let found = find_documents(root, &options);

        assert_eq!(
            found,
            vec![PathBuf::from("a.md"), PathBuf::from("b.mdx"), PathBuf::from("guide/setup.md")]
        );
    }
}
