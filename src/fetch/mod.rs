//! HTTP fetch boundary
//!
//! The engine only needs "fetch(url) -> document-or-failure"; everything
//! about transport (pooling, TLS, compression) lives behind this module.

mod fetcher;

pub use fetcher::{build_http_client, FetchOutcome, PageFetcher};
