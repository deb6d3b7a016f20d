use std::collections::BTreeMap;

use thiserror::Error;

/// Top-level error type for the `postal-api` crate.
///
/// Splits "the service said no" (`Api`) from "the service was unreachable"
/// (`Transport`) so callers can tell a validation failure apart from a dead
/// host. The CLI maps these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Application errors ──────────────────────────────────────────
    /// Structured error from the management API envelope.
    #[error("API error ({code}): {message}")]
    Api {
        code: String,
        message: String,
        /// Per-field validation details, when the service provides them.
        fields: Option<BTreeMap<String, Vec<String>>>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API key contains bytes that cannot be sent as a header value.
    #[error("invalid management API key")]
    InvalidApiKey,

    // ── Data ────────────────────────────────────────────────────────
    /// Response body did not match the expected shape; keeps the raw body
    /// for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient transport failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Per-field validation details from an application error, if any.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::Api { fields, .. } => fields.as_ref(),
            _ => None,
        }
    }

    /// The machine-readable API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Transport-side transience is covered in tests/client_test.rs,
    // where a real connect failure is available.
    #[test]
    fn application_errors_are_never_transient() {
        let api = Error::Api {
            code: "ValidationError".into(),
            message: "Name has already been taken".into(),
            fields: None,
        };
        assert!(!api.is_transient());

        let decode = Error::Deserialization {
            message: "expected struct".into(),
            body: "{}".into(),
        };
        assert!(!decode.is_transient());

        assert!(!Error::InvalidApiKey.is_transient());
    }
}
