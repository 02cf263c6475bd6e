use thiserror::Error;

/// Main error type for the tracker
#[derive(Error, Debug)]
pub enum GridcastError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Contest pointer unavailable: {0}")]
    ContestUnavailable(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Collaborator errors
    #[error("Bundle formatter failed: {0}")]
    Formatter(String),

    #[error("Content sink failed: {0}")]
    Sink(String),

    #[error("Invalid output unit: {0}")]
    InvalidUnit(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GridcastError
pub type Result<T> = std::result::Result<T, GridcastError>;

/// Failures of a single box-score fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("unparseable response: {0}")]
    Parse(String),

    /// Non-200 status code inside an otherwise valid response envelope
    #[error("provider status {status_code}: {message}")]
    Provider { status_code: i64, message: String },
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

/// How the poll loop treats a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Contest pointer unreadable: retry after backoff, no output
    ConfigUnavailable,
    /// No snapshot at all: placeholder unit, longer backoff
    FetchFailure,
    /// Feed-embedded error text; a classification signal, not a failure
    ProviderSignal,
    /// External bundle build failed: skip that stage
    FormatterFailure,
    /// Delivery failed: log, next unit attempts independently
    SinkFailure,
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ConfigUnavailable => write!(f, "config_unavailable"),
            FailureKind::FetchFailure => write!(f, "fetch_failure"),
            FailureKind::ProviderSignal => write!(f, "provider_signal"),
            FailureKind::FormatterFailure => write!(f, "formatter_failure"),
            FailureKind::SinkFailure => write!(f, "sink_failure"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}

impl GridcastError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GridcastError::Config(_) | GridcastError::ContestUnavailable(_) => {
                FailureKind::ConfigUnavailable
            }
            GridcastError::Feed(FeedError::Provider { .. }) => FailureKind::ProviderSignal,
            GridcastError::Http(_) | GridcastError::Feed(_) => FailureKind::FetchFailure,
            GridcastError::Formatter(_) => FailureKind::FormatterFailure,
            GridcastError::Sink(_) => FailureKind::SinkFailure,
            GridcastError::Json(_)
            | GridcastError::InvalidUnit(_)
            | GridcastError::Io(_)
            | GridcastError::Internal(_)
            | GridcastError::Other(_) => FailureKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            GridcastError::ContestUnavailable("missing".into()).kind(),
            FailureKind::ConfigUnavailable
        );
        assert_eq!(
            GridcastError::from(FeedError::Network("timeout".into())).kind(),
            FailureKind::FetchFailure
        );
        assert_eq!(
            GridcastError::from(FeedError::Provider {
                status_code: 500,
                message: "Game hasn't started yet".into(),
            })
            .kind(),
            FailureKind::ProviderSignal
        );
        assert_eq!(
            GridcastError::Sink("disk full".into()).kind(),
            FailureKind::SinkFailure
        );
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(FeedError::from(err), FeedError::Parse(_)));
    }
}
