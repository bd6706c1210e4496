// src/crawl/queue.rs
// =============================================================================
// This module walks the document cache and checks every link.
//
// How it works:
// 1. Start with every document already in the cache in a queue
// 2. Pop a document, check its external links, then its internal links
// 3. An internal link to a document we haven't parsed yet, that exists on
//    disk, gets parsed into the cache and pushed onto the back of the queue
// 4. Check its Storybook links, if a catalog is configured
// 5. Repeat until the queue is empty
//
// So documents are visited breadth-first, in the order we discovered them,
// and only documents reachable from the seeds are ever read.
//
// Every check is awaited before the next one starts: at most one request is
// in flight at any time.
// =============================================================================

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use log::{debug, info, warn};

use super::cache::{DocumentCache, DocumentEntry};
use crate::checker::{CatalogCheck, UrlProbe};
use crate::error::{Error, Result};
use crate::extract::LinkRecord;
use crate::report::{FailureKind, LinkKind, Report};

/// Compiles the --ignore pattern. `*` does not cross `/`.
pub fn compile_ignore(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

    Ok(glob.compile_matcher())
}

fn is_ignored(ignore: Option<&GlobMatcher>, link: &str) -> bool {
    ignore.map_or(false, |glob| glob.is_match(link))
}

/// Checks every document in `cache`, growing it with newly discovered docs.
///
/// Returns an error only when a newly discovered primary doc can't be read or
/// parsed; broken links end up in the report.
pub async fn validate<P, C>(
    cache: &mut DocumentCache,
    ignore: Option<&GlobMatcher>,
    probe: &P,
    catalog: Option<&C>,
) -> Result<Report>
where
    P: UrlProbe + ?Sized,
    C: CatalogCheck + ?Sized,
{
    let mut report = Report::default();

    // Documents waiting to be walked, in discovery order
    let mut queue: VecDeque<PathBuf> = cache.paths().map(Path::to_path_buf).collect();

    while let Some(path) = queue.pop_front() {
        let Some(entry) = cache.entry(&path) else {
            continue;
        };

        report.documents += 1;
        info!("FILE: {}", entry.absolute.display());

        check_external(&entry, ignore, probe, &mut report).await;

        for link in &entry.internal {
            check_internal(cache, &mut queue, &entry.absolute, link, ignore, &mut report)?;
        }

        if let Some(catalog) = catalog {
            check_catalog(&entry, catalog, &mut report).await;
        }
    }

    Ok(report)
}

async fn check_external<P: UrlProbe + ?Sized>(
    entry: &DocumentEntry,
    ignore: Option<&GlobMatcher>,
    probe: &P,
    report: &mut Report,
) {
    for url in &entry.external {
        if is_ignored(ignore, url) {
            debug!("\t[skip] {url}");
            continue;
        }

        let result = probe.probe(url).await;

        if result.is_ok() {
            info!("\t[✔] {url}");
            report.pass(&entry.absolute, url, LinkKind::External);
        } else {
            warn!("\t[✖] {url} ({})", result.message.as_deref().unwrap_or("unreachable"));
            report.fail(
                &entry.absolute,
                url,
                LinkKind::External,
                FailureKind::ExternalUnreachable,
                result.message,
            );
        }
    }
}

fn check_internal(
    cache: &mut DocumentCache,
    queue: &mut VecDeque<PathBuf>,
    document: &Path,
    link: &LinkRecord,
    ignore: Option<&GlobMatcher>,
    report: &mut Report,
) -> Result<()> {
    if is_ignored(ignore, &link.original) {
        debug!("\t[skip] {}", link.original);
        return Ok(());
    }

    let target = &link.target;
    let mut failed = false;

    if cache.lookup(target).is_none() {
        if target.exists() {
            if cache.ensure_populated(target)? {
                debug!("\tdiscovered {}", target.display());
                queue.push_back(target.clone());
            }
        } else {
            warn!("\t[✖] {} (no such file {})", link.original, target.display());
            report.fail(
                document,
                &link.original,
                LinkKind::Internal,
                FailureKind::MissingTarget,
                Some(format!("{} does not exist", target.display())),
            );
            failed = true;
        }
    }

    // A missing file with a fragment fails twice: once above, once here
    if let Some(fragment) = link.fragment.as_deref() {
        let anchored = cache.lookup(target).map_or(false, |t| t.has_anchor(fragment));

        if !anchored {
            warn!("\t[✖] {} (no anchor #{fragment})", link.original);
            report.fail(
                document,
                &link.original,
                LinkKind::Internal,
                FailureKind::MissingAnchor,
                Some(format!("#{fragment} not found in {}", target.display())),
            );
            failed = true;
        }
    }

    if !failed {
        info!("\t[✔] {}", link.original);
        report.pass(document, &link.original, LinkKind::Internal);
    }

    Ok(())
}

async fn check_catalog<C: CatalogCheck + ?Sized>(entry: &DocumentEntry, catalog: &C, report: &mut Report) {
    if entry.catalog.is_empty() {
        return;
    }

    match catalog.unresolved(&entry.catalog).await {
        Ok(unresolved) => {
            for link in &entry.catalog {
                if unresolved.contains(link) {
                    warn!("\t[✖] {link}");
                    report.fail(
                        &entry.absolute,
                        link,
                        LinkKind::Catalog,
                        FailureKind::CatalogUnresolved,
                        Some("not in the catalog index".to_string()),
                    );
                } else {
                    info!("\t[✔] {link}");
                    report.pass(&entry.absolute, link, LinkKind::Catalog);
                }
            }
        }
        Err(e) => {
            warn!("\tcatalog check failed for {}: {e}", entry.absolute.display());
            for link in &entry.catalog {
                report.fail(
                    &entry.absolute,
                    link,
                    LinkKind::Catalog,
                    FailureKind::CatalogUnresolved,
                    Some(e.to_string()),
                );
            }
        }
    }
}
