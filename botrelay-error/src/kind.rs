//! Error kinds for botrelay operations

use std::fmt;

/// The kind of error that occurred.
///
/// Callers match on `ErrorKind` to pick the message shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// Invalid or missing configuration
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Transport errors
    // =========================================================================
    /// The remote service could not be reached
    ConnectionFailed,

    /// The request did not complete within its timeout
    Timeout,

    /// Any other transport-level failure
    NetworkFailed,

    // =========================================================================
    // Service errors
    // =========================================================================
    /// The service answered with a non-success HTTP status
    ApiFailed,

    /// The inference service is up but has no model loaded
    ServiceUnavailable,

    /// The agent control server reported an error body
    AgentFailed,

    /// Response body could not be decoded
    ParseFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// Console or file IO failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            ErrorKind::ConnectionFailed => "ConnectionFailed",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::NetworkFailed => "NetworkFailed",

            ErrorKind::ApiFailed => "ApiFailed",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::AgentFailed => "AgentFailed",
            ErrorKind::ParseFailed => "ParseFailed",

            ErrorKind::IoFailed => "IoFailed",
        }
    }

    /// Whether the failure is likely to clear up if the operator tries again.
    ///
    /// Nothing in botrelay retries automatically; this only shapes log output.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectionFailed
                | ErrorKind::Timeout
                | ErrorKind::NetworkFailed
                | ErrorKind::ServiceUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Timeout.to_string(), "Timeout");
        assert_eq!(ErrorKind::ServiceUnavailable.to_string(), "ServiceUnavailable");
    }

    #[test]
    fn test_is_transient() {
        assert!(ErrorKind::Timeout.is_transient());
        assert!(ErrorKind::ConnectionFailed.is_transient());
        assert!(!ErrorKind::ParseFailed.is_transient());
        assert!(!ErrorKind::AgentFailed.is_transient());
    }
}
