// src/extract/slug.rs
// GitHub-style heading slugs: "## Getting Started!" -> "getting-started".
// Repeated headings get "-1", "-2", ... so every slug in a document is unique.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slug for `heading`, unique within this slugger.
    pub fn slug(&mut self, heading: &str) -> String {
        let base = slugify(heading);
        let mut candidate = base.clone();
        let mut count = 0;

        while self.seen.contains(&candidate) {
            count += 1;
            candidate = format!("{base}-{count}");
        }

        self.seen.insert(candidate.clone());
        candidate
    }
}

/// Lowercases, drops punctuation (except `-` and `_`) and turns spaces into `-`.
pub fn slugify(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
