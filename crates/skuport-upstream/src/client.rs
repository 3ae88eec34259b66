//! HTTP client for the Upright Labs reports API.
//!
//! Wraps `reqwest` with the static `X-Authorization` credential and base URL
//! handling. Responses are returned as raw `serde_json::Value` collections
//! (a bare array or a `{"data": [...]}` envelope depending on endpoint and
//! API revision) and left to the pipeline to unwrap.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::UpstreamError;

const DEFAULT_BASE_URL: &str = "https://app.uprightlabs.com/api/reports";

/// A report endpoint under the upstream base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    OrderItems,
    EbayListings,
    ShopgoodwillListings,
    PaidOrders,
}

impl Endpoint {
    /// Path of this endpoint relative to the reports base URL.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::OrderItems => "order_items",
            Endpoint::EbayListings => "listings/ebay",
            Endpoint::ShopgoodwillListings => "listings/shopgoodwill",
            Endpoint::PaidOrders => "paid_orders",
        }
    }
}

/// Client for the Upright reports API.
///
/// Manages the HTTP client, API key, and base URL. Use [`UprightClient::new`]
/// for production or [`UprightClient::with_base_url`] to point at a mock
/// server in tests.
pub struct UprightClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl UprightClient {
    /// Creates a new client pointed at the production reports API.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, UpstreamError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("skuport/0.1 (sku-export)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining an endpoint path appends a segment rather than replacing
        // the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| UpstreamError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    /// Fetches one report collection for a time window.
    ///
    /// `time_start` and `time_end` are passed through unmodified as query
    /// parameters; the upstream owns their format and this client performs
    /// no validation. The `X-Authorization` header carries the API key.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Http`] on network failure or a non-2xx status.
    /// - [`UpstreamError::Deserialize`] if the body is not valid JSON.
    pub async fn fetch_window(
        &self,
        endpoint: Endpoint,
        time_start: &str,
        time_end: &str,
    ) -> Result<Value, UpstreamError> {
        let url = self.build_url(endpoint, time_start, time_end)?;
        let response = self
            .client
            .get(url)
            .header("X-Authorization", &self.api_key)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
            context: endpoint.path().to_owned(),
            source: e,
        })
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters.
    fn build_url(
        &self,
        endpoint: Endpoint,
        time_start: &str,
        time_end: &str,
    ) -> Result<Url, UpstreamError> {
        let mut url = self
            .base_url
            .join(endpoint.path())
            .map_err(|e| UpstreamError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("time_start", time_start);
            pairs.append_pair("time_end", time_end);
        }
        Ok(url)
    }
}
