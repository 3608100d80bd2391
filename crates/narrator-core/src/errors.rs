//! Error types shared across the narrator crates.

/// Dialog script or process configuration is unusable.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Errors from the speech synthesis collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No API key was configured for the collaborator.
    #[error("speech API key not configured (set ELEVENLABS_API_KEY)")]
    MissingApiKey,

    /// Collaborator answered with a non-2xx status.
    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Request never produced a response (DNS, TLS, timeout, ...).
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response whose body could not be read or parsed.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl SpeechError {
    /// HTTP status the proxy surfaces for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingApiKey => 500,
            Self::Upstream { status, .. } => *status,
            Self::Network { .. } => 502,
            Self::InvalidResponse { .. } => 502,
        }
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("achievement store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("achievement store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),
}
