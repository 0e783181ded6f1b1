use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CLI input")]
    InvalidInput,

    #[error("{0}")]
    InvalidCommand(String),

    #[error("API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Other(String),
}

impl AppError {
    pub fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
