// src/checker/http.rs
// =============================================================================
// This module checks if external URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes one HTTP HEAD request per URL (or GET, if configured)
// - 200, 201, 403 and 429 count as "reachable": a login wall or a rate limit
//   still proves the page exists
// - Detects various failure modes (404, timeout, SSL errors, etc.)
// - Never retries; every URL gets exactly one request
//
// The walker talks to this through the `UrlProbe` trait so tests can swap in
// a fake that never touches the network.
//
// Rust concepts:
// - async/await: For network I/O
// - Traits + BoxFuture: An async method we can call through a trait
// - Enums: To represent different link states
// =============================================================================

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status codes we treat as "the link works".
pub const REACHABLE_STATUSES: [u16; 4] = [200, 201, 403, 429];

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Represents the status of a link after checking
//
// #[derive(Serialize, Deserialize)] lets us convert to/from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Link answered with one of the reachable statuses
    Ok,
    /// Link answered with any other status (404, 410, 500, ...)
    Broken(u16),
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error
    Error,
}

// Represents the result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL that was checked
    pub url: String,
    /// The status of the link
    #[serde(flatten)]
    pub status: LinkStatus,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkCheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok)
    }
}

/// Which HTTP method the probe uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    #[default]
    Head,
    Get,
}

/// Anything that can tell us whether an external URL is reachable.
pub trait UrlProbe {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, LinkCheckResult>;
}

/// The real probe: one reqwest request per URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    method: ProbeMethod,
}

impl HttpProbe {
    // Create an HTTP client with reasonable settings
    // We'll reuse this client for all requests (connection pooling)
    pub fn new(timeout: Duration, method: ProbeMethod) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, method })
    }

    async fn check_single_link(&self, url: &str) -> LinkCheckResult {
        let method = match self.method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        };

        match self.client.request(method, url).send().await {
            Ok(response) => analyze_status(url, response.status()),
            Err(e) => categorize_error(url, e),
        }
    }
}

impl UrlProbe for HttpProbe {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, LinkCheckResult> {
        self.check_single_link(url).boxed()
    }
}

// Turns an HTTP status code into a LinkCheckResult
//
// Redirects have already been followed by reqwest, so this is the final status.
fn analyze_status(url: &str, status_code: StatusCode) -> LinkCheckResult {
    let code = status_code.as_u16();
    let status = if REACHABLE_STATUSES.contains(&code) {
        LinkStatus::Ok
    } else {
        LinkStatus::Broken(code)
    };

    LinkCheckResult {
        url: url.to_string(),
        status,
        message: Some(format!("HTTP {code}")),
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(url: &str, error: reqwest::Error) -> LinkCheckResult {
    let error_string = format!("{error:?}").to_lowercase();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() && error_string.contains("dns") {
        (LinkStatus::DnsError, "Could not resolve hostname".to_string())
    } else if error_string.contains("certificate") || error_string.contains("ssl") || error_string.contains("tls") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else if error.is_connect() {
        (LinkStatus::Error, "Connection failed".to_string())
    } else {
        (LinkStatus::Error, error.to_string())
    };

    LinkCheckResult {
        url: url.to_string(),
        status,
        message: Some(message),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why BoxFuture instead of `async fn` in the trait?
//    - The walker is generic over the probe, and tests use a fake one
//    - A boxed future keeps the trait simple and object-safe
//    - .boxed() comes from futures::FutureExt
//
// 2. Why is 403 a success?
//    - Plenty of sites answer bots with 403 while the page is fine for people
//    - Same story for 429 (rate limited): the server is there, it's just busy
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(method: ProbeMethod) -> HttpProbe {
        HttpProbe::new(Duration::from_secs(5), method).unwrap()
    }

    #[test]
    fn test_reachable_statuses() {
        for code in [200, 201, 403, 429] {
            let result = analyze_status("https://example.test", StatusCode::from_u16(code).unwrap());
            assert!(result.is_ok(), "{code} should be reachable");
        }
        for code in [204, 301, 404, 410, 500] {
            let result = analyze_status("https://example.test", StatusCode::from_u16(code).unwrap());
            assert_eq!(result.status, LinkStatus::Broken(code));
        }
    }

    #[tokio::test]
    async fn test_probe_404_is_broken() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/gone").with_status(404).create_async().await;

        let result = probe(ProbeMethod::Head).probe(&format!("{}/gone", server.url())).await;
        assert_eq!(result.status, LinkStatus::Broken(404));
        assert!(!result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_403_is_ok() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/private").with_status(403).create_async().await;

        let result = probe(ProbeMethod::Head).probe(&format!("{}/private", server.url())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_uses_get_when_asked() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("GET", "/page").with_status(200).create_async().await;

        let result = probe(ProbeMethod::Get).probe(&format!("{}/page", server.url())).await;
        assert!(result.is_ok());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        // Port 9 (discard) on localhost is almost never listening
        let result = probe(ProbeMethod::Head).probe("http://127.0.0.1:9/").await;
        assert!(!result.is_ok());
    }

    #[test]
    fn test_link_result_serializes_status() {
        let result = LinkCheckResult {
            url: "https://example.test".to_string(),
            status: LinkStatus::Broken(404),
            message: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "broken");
        assert_eq!(json["code"], 404);
    }
}
