// src/extract/links.rs
// =============================================================================
// This module pulls links and anchors out of one text representation.
//
// It is purely textual - two regexes run over the text and every match is
// classified:
//
//   id="x" / name="x" / "id": "x"           -> anchor
//   href= / to= / src= / kind= / "href": ... -> link candidate
//
// Link candidates are sorted into three buckets:
//   - Storybook catalog links (kind=, ?path=/docs/, ?path=/story/)
//   - external http(s) links
//   - internal links, resolved to an absolute path (+ optional fragment)
// Anything else with a URI scheme (mailto:, javascript:, tel:) is dropped.
//
// Scanning never consumes or rewrites the text; we only iterate matches.
// =============================================================================

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::trace;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;

use super::paths;
use super::ExtractOptions;

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+(?:"(?:id|name)":\s*|(?:id|name)=)"([^"]+)""#).expect("Invalid ANCHOR_RE regex")
});

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\s+(?:"(?:href|to|src|path=/docs/|path=/story/)":\s*|(?:href|to|src|kind)=)["']([^"']+?)['"]"#,
    )
    .expect("Invalid LINK_RE regex")
});

static HTTP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("Invalid HTTP_RE regex"));

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("Invalid SCHEME_RE regex"));

/// `dir/#fragment`: the index file goes between the slash and the `#`
static DIR_FRAGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*/)(#[^/]+)$").expect("Invalid DIR_FRAGMENT_RE regex"));

/// Which text a scan runs over. The intermediate form is HTML, so its
/// attribute values come back entity-escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Raw,
    Intermediate,
}

/// A link to another file (or a spot in this one) inside the docs tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkRecord {
    /// The link as written in the document, percent-escapes decoded
    pub original: String,
    /// Absolute, normalized path of the file it points at
    pub target: PathBuf,
    pub fragment: Option<String>,
}

impl LinkRecord {
    /// `target#fragment`, or just the target when there is no fragment.
    pub fn absolute(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{}", self.target.display(), fragment),
            None => self.target.display().to_string(),
        }
    }
}

/// Everything found in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedLinks {
    pub external: Vec<String>,
    pub internal: Vec<LinkRecord>,
    pub catalog: Vec<String>,
    pub anchors: BTreeSet<String>,
}

/// Scans `text` and merges what it finds into `links`.
///
/// `document` is the absolute path of the file the text came from; relative
/// links are resolved against its directory.
pub fn scan(
    text: &str,
    source: Source,
    document: &Path,
    options: &ExtractOptions,
    links: &mut ExtractedLinks,
) {
    for caps in ANCHOR_RE.captures_iter(text) {
        links.anchors.insert(decode(&caps[1], source));
    }

    for caps in LINK_RE.captures_iter(text) {
        let whole = &caps[0];
        let value = decode(&caps[1], source);

        if is_catalog_match(whole) {
            push_unique(&mut links.catalog, format_catalog_link(&value));
        } else if HTTP_RE.is_match(&value) {
            push_unique(&mut links.external, value);
        } else if SCHEME_RE.is_match(&value) {
            trace!("ignoring {value} in {}", document.display());
        } else {
            // `./my%20file.md` names `my file.md` on disk
            let value = percent_decode_str(&value).decode_utf8_lossy();
            let record = internal_record(&value, document, options);
            if !links.internal.contains(&record) {
                links.internal.push(record);
            }
        }
    }
}

fn is_catalog_match(whole: &str) -> bool {
    whole.contains("kind=") || whole.contains("path=/docs/") || whole.contains("path=/story/")
}

/// Turns a Storybook link into the `id&viewMode=mode` form we compare against.
///
/// `?path=/docs/button--default` -> `button--default&viewMode=docs`
pub fn format_catalog_link(link: &str) -> String {
    let mode = if link.contains("story") { "story" } else { "docs" };
    let link = link.replacen("?path=/docs/", "", 1).replacen("?path=/story/", "", 1);
    format!("{link}&viewMode={mode}")
}

fn internal_record(value: &str, document: &Path, options: &ExtractOptions) -> LinkRecord {
    let rewritten = with_index_file(value, options);
    let (path_part, fragment) = paths::split_fragment(&rewritten);

    LinkRecord {
        original: value.to_string(),
        target: paths::resolve_link(document, path_part),
        fragment: fragment.map(str::to_string),
    }
}

/// `./guide/` -> `./guide/index.mdx`, `./guide/#setup` -> `./guide/index.mdx#setup`.
fn with_index_file(value: &str, options: &ExtractOptions) -> String {
    if value.starts_with('#') || names_document(value, options) {
        return value.to_string();
    }

    if value.ends_with('/') {
        return format!("{value}{}", options.index_file);
    }

    match DIR_FRAGMENT_RE.captures(value) {
        Some(caps) => format!("{}{}{}", &caps[1], options.index_file, &caps[2]),
        None => value.to_string(),
    }
}

/// True for `something.md`, `something.mdx#frag` and friends.
fn names_document(value: &str, options: &ExtractOptions) -> bool {
    let (path, fragment) = value.split_once('#').unwrap_or((value, ""));
    let fragment_ok = fragment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ',' | '-'));

    fragment_ok
        && path
            .rsplit_once('.')
            .map_or(false, |(_, ext)| options.is_document_extension(ext))
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn decode(value: &str, source: Source) -> String {
    match source {
        Source::Raw => value.to_string(),
        Source::Intermediate => value
            .replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_raw(text: &str) -> ExtractedLinks {
        let mut links = ExtractedLinks::default();
        scan(text, Source::Raw, Path::new("/repo/docs/page.mdx"), &ExtractOptions::default(), &mut links);
        links
    }

    #[test]
    fn test_anchor_definitions_are_a_set() {
        let links = scan_raw(r#"<div id="setup"></div> <a name="setup"></a> <h2 {...{ "id": "usage" }}>"#);
        assert_eq!(links.anchors.len(), 2);
        assert!(links.anchors.contains("setup"));
        assert!(links.anchors.contains("usage"));
    }

    #[test]
    fn test_external_links_are_deduplicated() {
        let links = scan_raw(r#"<a href="https://rust-lang.org">a</a> <a href='https://rust-lang.org'>b</a>"#);
        assert_eq!(links.external, vec!["https://rust-lang.org"]);
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        let links = scan_raw(r#"<a href="mailto:docs@example.test">m</a> <a href="javascript:void(0)">j</a>"#);
        assert!(links.external.is_empty());
        assert!(links.internal.is_empty());
        assert!(links.catalog.is_empty());
    }

    #[test]
    fn test_directory_link_gets_index_file() {
        let links = scan_raw(r#"<Link to="./foo/" />"#);
        let record = &links.internal[0];
        assert_eq!(record.original, "./foo/");
        assert_eq!(record.target, PathBuf::from("/repo/docs/foo/index.mdx"));
        assert_eq!(record.fragment, None);
    }

    #[test]
    fn test_directory_fragment_link_gets_index_file() {
        let links = scan_raw(r#"<Link to="./foo/#bar" />"#);
        let record = &links.internal[0];
        assert_eq!(record.original, "./foo/#bar");
        assert_eq!(record.target, PathBuf::from("/repo/docs/foo/index.mdx"));
        assert_eq!(record.fragment.as_deref(), Some("bar"));
        assert_eq!(record.absolute(), "/repo/docs/foo/index.mdx#bar");
    }

    #[test]
    fn test_document_links_are_left_alone() {
        let links = scan_raw(r#"<a href="../api/button.md#props">x</a>"#);
        let record = &links.internal[0];
        assert_eq!(record.target, PathBuf::from("/repo/docs/api/button.md"));
        assert_eq!(record.fragment.as_deref(), Some("props"));
    }

    #[test]
    fn test_same_document_anchor() {
        let links = scan_raw(r##"<a href="#install">x</a>"##);
        let record = &links.internal[0];
        assert_eq!(record.original, "#install");
        assert_eq!(record.target, PathBuf::from("/repo/docs/page.mdx"));
        assert_eq!(record.fragment.as_deref(), Some("install"));
    }

    #[test]
    fn test_catalog_links() {
        let links = scan_raw(
            r#"<a href="?path=/docs/button--default">b</a> <Meta kind="components-card--primary" /> <a href="?path=/story/card--story">c</a>"#,
        );
        assert_eq!(
            links.catalog,
            vec![
                "button--default&viewMode=docs",
                "components-card--primary&viewMode=docs",
                "card--story&viewMode=story",
            ]
        );
        assert!(links.internal.is_empty());
    }

    #[test]
    fn test_format_catalog_link() {
        assert_eq!(format_catalog_link("?path=/docs/button--default"), "button--default&viewMode=docs");
        assert_eq!(format_catalog_link("?path=/story/button--primary"), "button--primary&viewMode=story");
    }

    #[test]
    fn test_intermediate_values_are_unescaped() {
        let mut links = ExtractedLinks::default();
        scan(
            r#"<a href="https://example.test/?a=1&amp;b=2">x</a>"#,
            Source::Intermediate,
            Path::new("/repo/docs/page.mdx"),
            &ExtractOptions::default(),
            &mut links,
        );
        assert_eq!(links.external, vec!["https://example.test/?a=1&b=2"]);
    }

    #[test]
    fn test_internal_links_are_percent_decoded() {
        let mut links = ExtractedLinks::default();
        scan(
            r#"<a href="./caf%C3%A9.md#caf%C3%A9">x</a> <a href="./my%20file.md">y</a>"#,
            Source::Intermediate,
            Path::new("/repo/docs/page.mdx"),
            &ExtractOptions::default(),
            &mut links,
        );

        assert_eq!(links.internal[0].original, "./café.md#café");
        assert_eq!(links.internal[0].target, PathBuf::from("/repo/docs/café.md"));
        assert_eq!(links.internal[0].fragment.as_deref(), Some("café"));
        assert_eq!(links.internal[1].target, PathBuf::from("/repo/docs/my file.md"));
    }

    #[test]
    fn test_external_links_keep_their_escapes() {
        let mut links = ExtractedLinks::default();
        scan(
            r#"<a href="https://example.test/a%20b">x</a>"#,
            Source::Intermediate,
            Path::new("/repo/docs/page.mdx"),
            &ExtractOptions::default(),
            &mut links,
        );
        assert_eq!(links.external, vec!["https://example.test/a%20b"]);
    }

    #[test]
    fn test_repeated_internal_link_is_recorded_once() {
        let links = scan_raw(r#"<a href="./a.md">1</a> <a href="./a.md">2</a>"#);
        assert_eq!(links.internal.len(), 1);
    }
}
