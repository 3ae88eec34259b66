use thiserror::Error;

/// Errors returned by the Upright reports API client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network or TLS failure from the underlying HTTP client, or a non-2xx
    /// HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
