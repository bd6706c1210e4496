// src/checker/catalog.rs
// =============================================================================
// Checks Storybook ("catalog") links against the running Storybook.
//
// Storybook publishes the list of everything it knows at /index.json
// (Storybook 7+) or /stories.json (older versions). We fetch that once per
// run, build a set of "id&viewMode=mode" keys, and compare each normalized
// link from a document against it.
//
// Like the HTTP probe this sits behind a trait (`CatalogCheck`) so the walker
// can be tested without a Storybook.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{Error, Result};

/// Where Storybook lists its entries, newest format first.
const INDEX_FILES: [&str; 2] = ["index.json", "stories.json"];

pub trait CatalogCheck {
    /// Returns the links (as given) that the catalog doesn't know.
    fn unresolved<'a>(&'a self, links: &'a [String]) -> BoxFuture<'a, Result<Vec<String>>>;
}

// Shape of index.json (v4/v5) and stories.json (v3). Only the fields we need.
#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    entries: HashMap<String, RawEntry>,
    #[serde(default)]
    stories: HashMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    #[serde(rename = "type")]
    entry_type: Option<String>,
    title: Option<String>,
    /// stories.json calls the title "kind"
    kind: Option<String>,
}

/// The set of things a Storybook can show.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogIndex {
    keys: HashSet<String>,
    titles: HashSet<String>,
}

impl CatalogIndex {
    fn from_raw(raw: RawIndex) -> Self {
        let mut index = Self::default();

        for entry in raw.entries.into_values() {
            let mode = entry.entry_type.as_deref().unwrap_or("story");
            index.keys.insert(format!("{}&viewMode={mode}", entry.id));
            index.add_title(entry.title.or(entry.kind));
        }

        // Legacy entries can be opened in either mode
        for entry in raw.stories.into_values() {
            index.keys.insert(format!("{}&viewMode=story", entry.id));
            index.keys.insert(format!("{}&viewMode=docs", entry.id));
            index.add_title(entry.kind.or(entry.title));
        }

        index
    }

    fn add_title(&mut self, title: Option<String>) {
        if let Some(title) = title {
            self.titles.insert(title);
        }
    }

    /// `link` is in normalized form: `<id or url>&viewMode=<mode>`.
    pub fn contains(&self, link: &str) -> bool {
        if self.keys.contains(link) {
            return true;
        }

        let (target, mode) = link.rsplit_once("&viewMode=").unwrap_or((link, "docs"));

        // Full URLs (https://storybook.example/button--primary) end in the id
        let last_segment = target.rsplit('/').next().unwrap_or(target);
        self.keys.contains(&format!("{last_segment}&viewMode={mode}")) || self.titles.contains(target)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Checks catalog links against a live Storybook.
#[derive(Debug)]
pub struct StorybookCatalog {
    base: Url,
    client: Client,
    index: OnceCell<CatalogIndex>,
}

impl StorybookCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last path segment unless it ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base = Url::parse(&normalized).map_err(|source| Error::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base,
            client,
            index: OnceCell::new(),
        })
    }

    async fn index(&self) -> Result<&CatalogIndex> {
        self.index.get_or_try_init(|| self.fetch_index()).await
    }

    async fn fetch_index(&self) -> Result<CatalogIndex> {
        let mut last_failure = String::from("no index file found");

        for file in INDEX_FILES {
            let url = self.base.join(file).map_err(|source| Error::InvalidUrl {
                url: format!("{}{file}", self.base),
                source,
            })?;

            debug!("fetching catalog index {url}");

            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_failure = e.to_string();
                    continue;
                }
            };

            if !response.status().is_success() {
                last_failure = format!("HTTP {} from {url}", response.status().as_u16());
                continue;
            }

            match response.json::<RawIndex>().await {
                Ok(raw) => {
                    let index = CatalogIndex::from_raw(raw);
                    info!("loaded {} catalog entries from {url}", index.len());
                    return Ok(index);
                }
                Err(e) => last_failure = format!("invalid {file}: {e}"),
            }
        }

        Err(Error::Catalog {
            url: self.base.to_string(),
            reason: last_failure,
        })
    }
}

impl CatalogCheck for StorybookCatalog {
    fn unresolved<'a>(&'a self, links: &'a [String]) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            if links.is_empty() {
                return Ok(Vec::new());
            }

            let index = self.index().await?;
            Ok(links.iter().filter(|link| !index.contains(link)).cloned().collect())
        }
        .boxed()
    }
}
