// src/fetch/mod.rs

use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT},
    Client, StatusCode,
};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::process::{extract_pallet_table, ExtractionResult};

/// Ways an upstream fetch can fail. Every variant is reported to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("pallet id must be a non-empty string of digits, got {0:?}")]
    InvalidPalletId(String),

    #[error("timed out after {timeout_ms} ms fetching pallet {pallet_id}")]
    Timeout { pallet_id: String, timeout_ms: u64 },

    #[error("upstream returned {status} for pallet {pallet_id}")]
    Status {
        pallet_id: String,
        status: StatusCode,
    },

    #[error("request for pallet {pallet_id} failed: {source}")]
    Transport {
        pallet_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid request header: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("building http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    fn from_reqwest(pallet_id: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                pallet_id: pallet_id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                pallet_id: pallet_id.to_string(),
                status,
            }
        } else {
            FetchError::Transport {
                pallet_id: pallet_id.to_string(),
                source: err,
            }
        }
    }
}

/// Trim a pallet id and check it is all ASCII digits, so it is safe to
/// place in the upstream query.
pub fn validate_pallet_id(raw: &str) -> Result<&str, FetchError> {
    let id = raw.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FetchError::InvalidPalletId(raw.to_string()));
    }
    Ok(id)
}

/// Fetches pallet listing pages from the auction site.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PalletFetcher {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl PalletFetcher {
    pub fn new(cfg: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(&cfg.accept)?);

        let mut builder = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .default_headers(headers)
            .timeout(cfg.fetch_timeout())
            .cookie_store(true)
            .gzip(true);
        if !cfg.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(FetchError::Client)?;

        // a base path without a trailing slash would lose its last segment on join
        let mut base = Url::parse(&cfg.upstream_base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client,
            base,
            timeout: cfg.fetch_timeout(),
        })
    }

    /// `<base>/auction/container?id=<id>&_cmd=view&_table=pallet`
    pub fn pallet_url(&self, pallet_id: &str) -> Result<Url, FetchError> {
        let mut url = self.base.join("auction/container")?;
        url.query_pairs_mut()
            .append_pair("id", pallet_id)
            .append_pair("_cmd", "view")
            .append_pair("_table", "pallet");
        Ok(url)
    }

    /// Download the raw listing page. Non-2xx responses are errors, and so
    /// is an id that is not all digits (nothing is sent for it).
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_page(&self, pallet_id: &str) -> Result<String, FetchError> {
        let pallet_id = validate_pallet_id(pallet_id)?;
        let url = self.pallet_url(pallet_id)?;
        let start = Instant::now();
        debug!(%url, "fetching listing");

        let wrap = |e| FetchError::from_reqwest(pallet_id, self.timeout, e);
        let resp = self.client.get(url).send().await.map_err(wrap)?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "upstream rejected request");
            return Err(FetchError::Status {
                pallet_id: pallet_id.to_string(),
                status,
            });
        }
        let body = resp.text().await.map_err(wrap)?;

        info!(bytes = body.len(), elapsed = ?start.elapsed(), "fetched listing");
        Ok(body)
    }

    /// Fetch a listing and extract its pallet table.
    pub async fn fetch_pallet(&self, pallet_id: &str) -> Result<ExtractionResult, FetchError> {
        let html = self.fetch_page(pallet_id).await?;
        Ok(extract_pallet_table(&html))
    }
}
