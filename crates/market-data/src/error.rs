use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to execute the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The provider returned an error for {series}: {message}")]
    Api { series: String, message: String },

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),

    #[error("No data available for {series} after {attempts} attempts")]
    DataUnavailable { series: String, attempts: u32 },

    #[error("FRED_API_KEY is not set in the environment")]
    MissingApiKey,
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed. Malformed responses
    /// and missing credentials fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Request(_) | ProviderError::Api { .. }
        )
    }
}
