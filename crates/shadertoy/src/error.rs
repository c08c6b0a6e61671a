use thiserror::Error;

/// Failures surfaced while looking up a shader or downloading its media.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport, DNS, or unexpected HTTP status failure.
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Neither the API nor the fallback endpoint knows the shader.
    #[error("shader '{id}' was not found on either endpoint")]
    NotFound { id: String },

    /// The response body did not have the expected JSON shape.
    #[error("unexpected Shadertoy response: {0}")]
    Parse(String),

    /// Client configuration was rejected before any request was made.
    #[error("invalid Shadertoy configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    pub(crate) fn network(url: impl ToString, message: impl ToString) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
