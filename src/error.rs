use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimited(u64),

    #[error("profile fetch failed for {subject}: {source}")]
    UpstreamUnavailable {
        subject: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::Network(_))
    }

    /// Wraps a profile-step failure. Only this step aborts a whole fetch;
    /// every other failure degrades to a diagnostic.
    pub fn upstream(subject: &str, source: Error) -> Self {
        Error::UpstreamUnavailable {
            subject: subject.to_string(),
            source: Box::new(source),
        }
    }
}
