//! Errors reported by the AI backend

/// Failure of a backend call
///
/// The `Display` text doubles as the detail line of user-facing notices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Transport failure or a non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with `success: false`
    #[error("{0}")]
    Rejected(String),

    /// The response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidPayload(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl BackendError {
    /// A `success: false` envelope, with or without an error string
    pub(crate) fn rejected(error: Option<String>) -> Self {
        Self::Rejected(error.unwrap_or_else(|| "Unknown error occurred".to_string()))
    }
}

impl From<ureq::Error> for BackendError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Network(format!("HTTP error! status: {}", code)),
            ureq::Error::Json(e) => Self::InvalidPayload(e.to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_is_bare_message() {
        let err = BackendError::rejected(Some("No emails provided".to_string()));
        assert_eq!(err.to_string(), "No emails provided");
    }

    #[test]
    fn test_rejected_without_message() {
        assert_eq!(BackendError::rejected(None).to_string(), "Unknown error occurred");
    }

    #[test]
    fn test_status_code_maps_to_network() {
        let err: BackendError = ureq::Error::StatusCode(500).into();
        assert_eq!(err, BackendError::Network("HTTP error! status: 500".to_string()));
    }
}
