use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChirperError>;

#[derive(Debug, Error)]
pub enum ChirperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ChirperError {
    fn from(err: reqwest::Error) -> Self {
        ChirperError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ChirperError {
    fn from(err: serde_json::Error) -> Self {
        ChirperError::Parse(err.to_string())
    }
}
