//! Client error helpers
//!
//! Re-exports botrelay-error and maps transport failures onto its kinds.

pub use botrelay_error::{Error, ErrorKind, Result};

/// Wrap a reqwest failure, keeping the url and HTTP status as context.
///
/// Timeouts are checked first: a connect timeout reports both `is_timeout`
/// and `is_connect`.
pub(crate) fn http_error(err: reqwest::Error, operation: &'static str) -> Error {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_connect() {
        ErrorKind::ConnectionFailed
    } else if err.is_status() {
        ErrorKind::ApiFailed
    } else if err.is_decode() {
        ErrorKind::ParseFailed
    } else {
        ErrorKind::NetworkFailed
    };

    let mut error = Error::new(kind, err.to_string()).with_operation(operation);
    if let Some(url) = err.url() {
        error = error.with_context("url", url.as_str());
    }
    if let Some(status) = err.status() {
        error = error.with_context("status", status.as_u16().to_string());
    }
    error.set_source(err)
}

/// Whether the request never reached the server, including a connect timeout
/// that `http_error` classified as [`ErrorKind::Timeout`].
pub(crate) fn is_connect_failure(err: &Error) -> bool {
    err.kind() == ErrorKind::ConnectionFailed
        || err
            .source_ref()
            .and_then(|source| source.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_connect)
}
