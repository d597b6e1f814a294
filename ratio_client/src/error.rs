use thiserror::Error;

/// Why a submission did not produce a result text.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The service answered with a non-success status.
    #[error("ratio service returned HTTP {status}")]
    Http { status: u16, body: String },

    /// The request never completed (connect, DNS, timeout, broken body).
    #[error("network error: {0}")]
    Network(String),

    #[error("could not encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl SubmitError {
    /// HTTP status code, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
