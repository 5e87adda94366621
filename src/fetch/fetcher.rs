//! HTTP page fetcher
//!
//! This module performs all HTTP requests for the ingestion pipeline:
//! - Building a client with a realistic browser header set
//! - GET requests with bounded retry and linear backoff
//! - Silent-redirect detection for chapter URLs

use crate::config::FetchSettings;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Path fragment that every supported site's chapter URLs carry. A redirect
/// that lands on a URL without it means the requested chapter does not exist
/// and the site bounced us to the novel homepage.
const CHAPTER_PATH_MARKER: &str = "chapter";

/// Result of a fetch operation
///
/// Always definitive: a parsed-ready document, a failure that should not be
/// retried at the same URL, or retry exhaustion.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Document {
        /// Final URL after redirects
        final_url: String,
        /// Response body
        body: String,
    },

    /// The request resolved but did not produce a usable chapter document
    /// (e.g. a silent redirect off the chapter path). Not retried.
    TransientFailure {
        /// Failure description
        reason: String,
    },

    /// All retry attempts failed
    Exhausted {
        /// Description of the last failure
        reason: String,
    },
}

impl FetchOutcome {
    /// Returns true if the outcome carries a document body
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document { .. })
    }
}

/// Builds an HTTP client with a browser-identifying header set
///
/// The source sites serve stripped-down or bounced pages to obvious bots, so
/// the header set mimics a desktop Chrome install.
pub fn build_http_client(settings: &FetchSettings) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches single pages with bounded retry and linear backoff
pub struct PageFetcher {
    client: Client,
    settings: FetchSettings,
}

impl PageFetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&settings)?;
        Ok(Self { client, settings })
    }

    /// Fetches a URL, retrying transport failures up to `max-retries` times
    ///
    /// Backoff between attempts is linear: `backoff-base-ms * attempt index`.
    /// A redirect that leaves the chapter path is returned immediately as a
    /// `TransientFailure` so the caller can classify the chapter as absent
    /// instead of retrying a URL that will keep bouncing.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::info!("Fetching: {} (attempt {})", url, attempt);

            match self.try_fetch(url).await {
                Ok(outcome) => return outcome,
                Err(reason) => {
                    tracing::warn!("Request failed (attempt {}): {}", attempt, reason);
                    if attempt > self.settings.max_retries {
                        tracing::error!("Failed to fetch {} after {} attempts", url, attempt);
                        return FetchOutcome::Exhausted { reason };
                    }
                    let delay =
                        Duration::from_millis(self.settings.backoff_base_ms * attempt as u64);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Performs one GET attempt
    ///
    /// `Err` means a retryable transport failure; `Ok` is always definitive.
    async fn try_fetch(&self, url: &str) -> Result<FetchOutcome, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| describe_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let final_url = response.url().to_string();
        if final_url != url
            && url.contains(CHAPTER_PATH_MARKER)
            && !final_url.contains(CHAPTER_PATH_MARKER)
        {
            tracing::warn!("Redirected from {} to {}", url, final_url);
            return Ok(FetchOutcome::TransientFailure {
                reason: format!("redirected off chapter path to {}", final_url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("body read failed: {}", e))?;

        Ok(FetchOutcome::Document { final_url, body })
    }
}

/// Classifies a reqwest error into a short loggable description
fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}
