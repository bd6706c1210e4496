// src/report.rs
// =============================================================================
// What a run produces.
//
// `errors` is the list of documents with at least one failing link. It keeps
// one entry per failing check, so a document with three broken links shows up
// three times (and one link can count twice: missing file AND missing anchor).
//
// `outcomes` is the per-link trace - every check, pass or fail - which is what
// main.rs prints and what --json serializes.
// =============================================================================

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    External,
    Internal,
    Catalog,
}

/// Why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingTarget,
    MissingAnchor,
    ExternalUnreachable,
    CatalogUnresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub document: PathBuf,
    /// The link as written (or normalized, for catalog links)
    pub link: String,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Documents with failing links, one entry per failure
    pub errors: Vec<PathBuf>,
    pub outcomes: Vec<LinkOutcome>,
    /// How many documents were walked
    pub documents: usize,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn pass(&mut self, document: &Path, link: &str, kind: LinkKind) {
        self.outcomes.push(LinkOutcome {
            document: document.to_path_buf(),
            link: link.to_string(),
            kind,
            failure: None,
            message: None,
        });
    }

    /// Records a failure and adds `document` to the error list.
    pub fn fail(
        &mut self,
        document: &Path,
        link: &str,
        kind: LinkKind,
        failure: FailureKind,
        message: Option<String>,
    ) {
        self.errors.push(document.to_path_buf());
        self.outcomes.push(LinkOutcome {
            document: document.to_path_buf(),
            link: link.to_string(),
            kind,
            failure: Some(failure),
            message,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinkOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }
}
