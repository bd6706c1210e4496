// src/checker/mod.rs
// =============================================================================
// This module contains the checks that leave the filesystem.
//
// Submodules:
// - http: Makes HTTP requests to check if external links are alive
// - catalog: Compares Storybook links against the Storybook's own index
//
// Both are exposed as traits (UrlProbe, CatalogCheck) plus one real
// implementation each, so the walker never has to know about reqwest.
// =============================================================================

mod catalog;
mod http;

pub use catalog::{CatalogCheck, StorybookCatalog};
pub use http::{
    HttpProbe, LinkCheckResult, LinkStatus, ProbeMethod, UrlProbe, DEFAULT_TIMEOUT_SECS,
    REACHABLE_STATUSES,
};
