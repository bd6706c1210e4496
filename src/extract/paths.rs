// src/extract/paths.rs
// =============================================================================
// Path helpers for turning what a link says into the file it points at.
//
// Everything here is lexical: we collapse "." and ".." ourselves instead of
// asking the filesystem (std::fs::canonicalize fails for files that don't
// exist, and a missing file is exactly what we want to report).
// =============================================================================

use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root, the same way `cd /..` does.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Only pop real names; never pop the root or a drive prefix
                let poppable = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if poppable {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Makes `path` absolute against the current working directory, then normalizes it.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }

    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// Resolves an internal link target relative to the document that contains it.
///
/// `document` must already be absolute. A leading `/` on the link is treated
/// like any other relative link: it resolves under the document's directory.
pub fn resolve_link(document: &Path, link_path: &str) -> PathBuf {
    if link_path.is_empty() {
        return document.to_path_buf();
    }

    let dir = document.parent().unwrap_or_else(|| Path::new("/"));
    normalize(&dir.join(link_path.trim_start_matches('/')))
}

/// Splits `path#fragment` into its parts. An empty fragment counts as none.
pub fn split_fragment(link: &str) -> (&str, Option<&str>) {
    match link.split_once('#') {
        Some((path, fragment)) if !fragment.is_empty() => (path, Some(fragment)),
        Some((path, _)) => (path, None),
        None => (link, None),
    }
}

/// Lowercased extension of a path, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dots() {
        let path = normalize(Path::new("/docs/guides/../api/./intro.md"));
        assert_eq!(path, PathBuf::from("/docs/api/intro.md"));
    }

    #[test]
    fn test_normalize_stops_at_root() {
        let path = normalize(Path::new("/../../etc/file.md"));
        assert_eq!(path, PathBuf::from("/etc/file.md"));
    }

    #[test]
    fn test_resolve_sibling_and_parent() {
        let doc = Path::new("/repo/docs/guide/setup.mdx");
        assert_eq!(resolve_link(doc, "./install.md"), PathBuf::from("/repo/docs/guide/install.md"));
        assert_eq!(resolve_link(doc, "../index.mdx"), PathBuf::from("/repo/docs/index.mdx"));
    }

    #[test]
    fn test_resolve_root_relative_stays_under_document_dir() {
        let doc = Path::new("/repo/docs/setup.mdx");
        assert_eq!(resolve_link(doc, "/api/button.md"), PathBuf::from("/repo/docs/api/button.md"));
    }

    #[test]
    fn test_split_fragment() {
        assert_eq!(split_fragment("a.md#intro"), ("a.md", Some("intro")));
        assert_eq!(split_fragment("a.md#"), ("a.md", None));
        assert_eq!(split_fragment("a.md"), ("a.md", None));
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension_of(Path::new("README.MD")), Some("md".to_string()));
        assert_eq!(extension_of(Path::new("Makefile")), None);
    }
}
