use thiserror::Error;

/// Failure reported by the provider or the transport talking to it.
///
/// These are surfaced to callers as-is: nothing in this crate retries or
/// inspects the status code.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to weather provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("weather provider returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Raised before any network I/O when no usable API key is configured.
    #[error("{0}")]
    CredentialMissing(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("stored favorites could not be read: {0}")]
    PersistenceCorrupt(#[source] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl WeatherError {
    pub fn is_credential_missing(&self) -> bool {
        matches!(self, WeatherError::CredentialMissing(_))
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
