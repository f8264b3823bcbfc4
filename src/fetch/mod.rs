//! Source resolution: HTTP fetch or local file read.
//!
//! One attempt, no retries. The dataset is a single batch download; a fetch
//! that fails or times out aborts the whole run.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{Error, Result};

/// Fetches the body bytes of `url` with a single GET request.
///
/// Non-success HTTP statuses and transport failures (including the client
/// timeout) are both reported as [`Error::SourceUnavailable`].
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Error::SourceUnavailable {
        source_loc: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| Error::SourceUnavailable {
            source_loc: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::SourceUnavailable {
            source_loc: url.to_string(),
            reason: format!("HTTP {status}"),
        });
    }

    let body = resp.bytes().await.map_err(|e| Error::SourceUnavailable {
        source_loc: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(body.to_vec())
}

/// Loads raw dataset bytes from a URL or a local file path.
pub async fn read_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(client, source).await
    } else {
        std::fs::read(source).map_err(|e| Error::SourceUnavailable {
            source_loc: source.to_string(),
            reason: e.to_string(),
        })
    }
}
