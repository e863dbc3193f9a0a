use paylens_ingest::Rejection;
use thiserror::Error;

/// Substring the backend uses when a statement parses but yields nothing.
pub const NO_TRANSACTIONS_MARKER: &str = "No transactions found";

pub const NO_TRANSACTIONS_MESSAGE: &str = "No transactions could be found in this PDF. Please make sure this is a valid PhonePe statement and try again.";

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to analyze statement. Please make sure this is a valid PhonePe statement PDF and try again.";

/// Message used when a failed response carries neither `details` nor `error`.
pub const FALLBACK_DETAIL: &str = "Analysis failed";

/// Failure of one analysis request.
///
/// `message` is the most specific text available (`details` > `error` >
/// fallback) and is meant for logs; users see [`AnalysisError::user_message`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// Network failure, timeout, non-2xx status or an undecodable body
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The backend answered but reported a problem in `error`/`details`
    #[error("backend error: {message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },
}

impl AnalysisError {
    pub fn transport(message: impl Into<String>) -> Self {
        AnalysisError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AnalysisError::Transport { message, .. } | AnalysisError::Backend { message, .. } => {
                message
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Transport { status, .. } | AnalysisError::Backend { status, .. } => {
                *status
            }
        }
    }

    /// True for the one backend condition that gets its own wording.
    pub fn is_no_transactions(&self) -> bool {
        self.message().contains(NO_TRANSACTIONS_MARKER)
    }

    /// What the user is told.
    ///
    /// Only "no transactions found" is singled out; every other failure,
    /// whatever its class, collapses to one generic message.
    pub fn user_message(&self) -> &'static str {
        if self.is_no_transactions() {
            NO_TRANSACTIONS_MESSAGE
        } else {
            GENERIC_FAILURE_MESSAGE
        }
    }
}

/// Why a session operation did not happen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// The upload gate refused the file; state is unchanged
    #[error("upload rejected: {0}")]
    Rejected(#[from] Rejection),

    /// A request is already in flight
    #[error("an analysis is already in progress")]
    Busy,

    /// Results are showing; start over from the upload view first
    #[error("results are showing; reset the session to upload another statement")]
    NotAtUpload,

    /// The request failed and the session went back to the upload view
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl SessionError {
    /// Notice text for the UI.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Rejected(r) => r.user_message().to_string(),
            SessionError::Analysis(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_transactions_gets_specific_message() {
        let e = AnalysisError::Backend {
            status: Some(500),
            message: "No transactions found in the PhonePe statement. This could be because...".into(),
        };
        assert!(e.is_no_transactions());
        assert!(e.user_message().contains("No transactions could be found"));
    }

    #[test]
    fn test_everything_else_is_generic() {
        let cases = [
            AnalysisError::transport("connection refused"),
            AnalysisError::Transport {
                status: Some(502),
                message: "Bad gateway".into(),
            },
            AnalysisError::Backend {
                status: Some(400),
                message: "Invalid PDF".into(),
            },
        ];
        for e in cases {
            assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE, "{e}");
        }
    }

    #[test]
    fn test_session_error_messages() {
        let e = SessionError::from(AnalysisError::transport("boom"));
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(SessionError::Busy.user_message().contains("already in progress"));
    }
}
