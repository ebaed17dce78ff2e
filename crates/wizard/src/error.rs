use signup_core::error::CoreError;

use crate::store::StoreError;

/// Errors from the wizard runtime itself.
///
/// Validation failures and rejected submissions are not errors here: they are
/// reported as [`crate::machine::StepOutcome`] variants.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("The wizard state has not been loaded yet")]
    NotLoaded,

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The submission client could not be built.
    #[error(transparent)]
    Client(#[from] SubmissionError),
}

/// Category of a failed remote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Validation,
    Server,
    Other,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Other => "other",
        }
    }
}

/// A rejected or failed submission to the remote endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// 4xx: the endpoint refused the record.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 5xx.
    #[error("Server error: {0}")]
    Server(String),

    /// Any other non-success status.
    #[error("Request failed ({status}): {message}")]
    Other { status: u16, message: String },

    /// The request never produced a status (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success status with a body that is not the expected envelope.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl SubmissionError {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Validation(_) => FailureCategory::Validation,
            Self::Server(_) => FailureCategory::Server,
            Self::Other { .. } | Self::Transport(_) | Self::Decode(_) => FailureCategory::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_error_display() {
        assert_eq!(
            SubmissionError::Validation("Email taken".into()).to_string(),
            "Validation failed: Email taken"
        );
        assert_eq!(
            SubmissionError::Server("boom".into()).to_string(),
            "Server error: boom"
        );
        assert_eq!(
            SubmissionError::Other { status: 302, message: "Found".into() }.to_string(),
            "Request failed (302): Found"
        );
    }

    #[test]
    fn categories() {
        assert_eq!(SubmissionError::Validation(String::new()).category().as_str(), "validation");
        assert_eq!(SubmissionError::Server(String::new()).category().as_str(), "server");
        assert_eq!(SubmissionError::Decode(String::new()).category(), FailureCategory::Other);
    }
}
