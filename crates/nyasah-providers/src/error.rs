use thiserror::Error;

/// Errors returned by inference providers and the provider factory.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS or timeout failure reaching the backend.
    #[error("provider unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The backend answered with a non-2xx HTTP status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The body could not be decoded into the shape the backend documents.
    #[error("malformed response from {provider}: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    /// The body decoded but carried no usable result.
    #[error("{provider} returned no response")]
    NoResponse { provider: &'static str },

    #[error("unsupported provider type: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} provider requires the `{key}` option")]
    MissingCredential {
        provider: &'static str,
        key: &'static str,
    },

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
