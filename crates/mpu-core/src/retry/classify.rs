//! Classify HTTP status and transport errors into retry policy error kinds.

use super::error::TransferError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        408 => ErrorKind::Timeout,
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(status),
        _ => ErrorKind::Other,
    }
}

/// Classify an HTTP client error for retry decisions.
pub fn classify_transport_error(e: &reqwest::Error) -> ErrorKind {
    if e.is_timeout() {
        return ErrorKind::Timeout;
    }
    if let Some(status) = e.status() {
        return classify_http_status(status.as_u16());
    }
    // Resets and truncated bodies surface as request/body errors.
    if e.is_connect() || e.is_request() || e.is_body() {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a part transfer error into an ErrorKind.
pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::Transport(te) => classify_transport_error(te),
        TransferError::Http { status } => classify_http_status(*status),
        TransferError::Read(_)
        | TransferError::MissingIdentifier { .. }
        | TransferError::InvalidIdentifier
        | TransferError::NoSuchPart { .. } => ErrorKind::Other,
    }
}
