// ── Core error types ──
//
// User-facing errors from pgw-core. Consumers never see reqwest errors or
// JSON parse failures directly: the `From<pgw_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Input rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("CIDR is not allowed. Please enter a single IPv4 address (e.g., 192.168.2.3).")]
    CidrNotAllowed,

    #[error("Invalid IPv4 address format: {input}")]
    InvalidIpv4 { input: String },

    #[error("Please fill all required fields ({field} is missing)")]
    MissingField { field: &'static str },

    #[error("Invalid host {input:?}: whitespace is not allowed")]
    InvalidHost { input: String },

    #[error("Port {input} is outside 1-65535")]
    InvalidPort { input: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pgw_api::Error> for CoreError {
    fn from(err: pgw_api::Error) -> Self {
        match err {
            pgw_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            pgw_api::Error::Http { status: 404, message } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message,
            },
            pgw_api::Error::Http { status, message } => CoreError::Rejected { status, message },
            pgw_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pgw_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            pgw_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_status() {
        let err = CoreError::from(pgw_api::Error::Http {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(err, CoreError::Rejected { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = CoreError::from(pgw_api::Error::Http {
            status: 404,
            message: "no such proxy".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn validation_message_is_user_facing() {
        let err = CoreError::from(ValidationError::CidrNotAllowed);
        assert!(err.to_string().starts_with("CIDR is not allowed"));
    }
}
