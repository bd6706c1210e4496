// src/extract/markdown.rs
// =============================================================================
// This module builds the two text representations we scan for links.
//
// 1. Raw: the document source with fenced ``` code blocks removed, so example
//    snippets never produce fake links.
// 2. Intermediate: the document parsed with `pulldown-cmark` and rendered to
//    HTML. On the way we:
//    - expand JSX-style props (`to={"./a.md"}`) into plain attributes
//    - refuse documents whose <Components> are not balanced (checked on the
//      source text, since a tag with a JSX expression in it isn't HTML as far
//      as CommonMark is concerned)
//    - give every heading an id (its GitHub-style slug)
//    - drop code blocks from the event stream
//
// Markdown links like [text](./a.md) only show up as href="..." in the
// rendered HTML, while component props often only survive in the raw text,
// which is why the extractor scans both.
// =============================================================================

use std::ops::Range;

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use regex::Regex;

use super::slug::Slugger;

static FENCED_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\s\S]+?```").expect("Invalid FENCED_CODE_RE regex"));

/// `attr={"value"}`, `attr={'value'}` or ``attr={`value`}``
static JSX_PROP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][\w-]*)=\{\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)\s*\}"#)
        .expect("Invalid JSX_PROP_RE regex")
});

fn parser_options() -> Options {
    Options::ENABLE_HEADING_ATTRIBUTES | Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Removes ``` fenced blocks from the raw source.
pub fn strip_fenced_code(markdown: &str) -> String {
    FENCED_CODE_RE.replace_all(markdown, "").into_owned()
}

/// Renders the document into its intermediate HTML form.
///
/// Returns the reason as an `Err` when the component markup can't be
/// understood; the caller decides whether that is fatal.
pub fn render_intermediate(markdown: &str) -> Result<String, String> {
    let expanded = expand_component_props(markdown);
    check_components(&expanded)?;

    let options = parser_options();
    let slugs = heading_slugs(&expanded, options);
    let mut next_slug = slugs.iter();
    let mut in_code_block = false;

    let events = Parser::new_ext(&expanded, options).filter_map(|event| match event {
        Event::Start(Tag::CodeBlock(_)) => {
            in_code_block = true;
            None
        }
        Event::End(Tag::CodeBlock(_)) => {
            in_code_block = false;
            None
        }
        _ if in_code_block => None,
        Event::Start(Tag::Heading(level, id, classes)) => {
            // Explicit {#id} attributes win over the generated slug
            let slug = next_slug.next().and_then(Option::as_deref);
            Some(Event::Start(Tag::Heading(level, id.or(slug), classes)))
        }
        other => Some(other),
    });

    let mut rendered = String::with_capacity(expanded.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    Ok(rendered)
}

/// Rewrites `attr={"value"}` style props into `attr="value"`.
fn expand_component_props(markdown: &str) -> String {
    JSX_PROP_RE
        .replace_all(markdown, |caps: &regex::Captures| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            format!("{}=\"{}\"", &caps[1], value)
        })
        .into_owned()
}

/// One `<Component ...>`, `</Component>` or `<Component ... />`.
#[derive(Debug, PartialEq, Eq)]
struct ComponentTag<'a> {
    name: &'a str,
    closing: bool,
    self_closing: bool,
}

/// Checks that every opened component is closed, in order.
fn check_components(markdown: &str) -> Result<(), String> {
    let text = without_code(markdown);
    let mut open: Vec<&str> = Vec::new();

    for tag in component_tags(&text) {
        if tag.self_closing {
            continue;
        }

        if !tag.closing {
            open.push(tag.name);
            continue;
        }

        match open.pop() {
            Some(expected) if expected == tag.name => {}
            Some(expected) => {
                return Err(format!("expected </{expected}> but found </{}>", tag.name));
            }
            None => return Err(format!("unexpected closing tag </{}>", tag.name)),
        }
    }

    match open.pop() {
        Some(unclosed) => Err(format!("unclosed <{unclosed}>")),
        None => Ok(()),
    }
}

/// Byte ranges of code spans and code blocks.
fn code_ranges(markdown: &str) -> Vec<Range<usize>> {
    Parser::new_ext(markdown, parser_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// `markdown` with every code span and block replaced by a space.
fn without_code(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    let mut last = 0;

    for range in code_ranges(markdown) {
        if range.start < last {
            continue;
        }
        text.push_str(&markdown[last..range.start]);
        text.push(' ');
        last = range.end;
    }

    text.push_str(&markdown[last..]);
    text
}

/// Capitalized tags are components; lowercase ones are plain HTML and may be
/// left open (<br>, <img>) without breaking anything. HTML comments are
/// skipped.
fn component_tags(text: &str) -> Vec<ComponentTag<'_>> {
    let bytes = text.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' || (i > 0 && bytes[i - 1] == b'\\') {
            i += 1;
            continue;
        }

        if text[i..].starts_with("<!--") {
            i = text[i + 4..].find("-->").map_or(bytes.len(), |end| i + 4 + end + 3);
            continue;
        }

        let closing = bytes.get(i + 1) == Some(&b'/');
        let name_start = i + 1 + usize::from(closing);
        let name_len = text[name_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(text.len() - name_start);
        let name = &text[name_start..name_start + name_len];

        if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            i += 1;
            continue;
        }

        match tag_end(text, name_start + name_len) {
            Some((end, self_closing)) => {
                tags.push(ComponentTag {
                    name,
                    closing,
                    self_closing,
                });
                i = end;
            }
            None => i += 1,
        }
    }

    tags
}

/// Finds the `>` ending a tag whose attributes start at `from`.
///
/// `>` inside quotes or `{...}` expressions (`onClick={() => go()}`) doesn't
/// count. Returns the offset just past the `>` and whether the tag ends in `/>`.
fn tag_end(text: &str, from: usize) -> Option<(usize, bool)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut last_significant = None;

    for (offset, c) in text[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'' | '`') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some((from + offset + 1, last_significant == Some('/'))),
            // `a < B` style prose, not a tag
            (None, '<') if depth == 0 => return None,
            _ => {}
        }

        if !c.is_whitespace() {
            last_significant = Some(c);
        }
    }

    None
}

/// Generated slugs for every heading, in document order. Headings with an
/// explicit `{#id}` get `None` and don't take up a slug.
fn heading_slugs(markdown: &str, options: Options) -> Vec<Option<String>> {
    let mut slugger = Slugger::new();
    let mut slugs = Vec::new();
    // Some(text) while we're inside a heading that needs a slug
    let mut current: Option<String> = None;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading(_, Some(_), _)) => slugs.push(None),
            Event::Start(Tag::Heading(..)) => current = Some(String::new()),
            Event::End(Tag::Heading(..)) => {
                if let Some(text) = current.take() {
                    slugs.push(Some(slugger.slug(&text)));
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            _ => {}
        }
    }

    slugs
}
