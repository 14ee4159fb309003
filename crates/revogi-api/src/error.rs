use thiserror::Error;

/// Top-level error type for the `revogi-api` crate.
///
/// Covers every failure mode of the command relay: transport, envelope
/// decoding, session renewal, server status codes, and per-command result
/// checks. `revogi` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with a non-2xx HTTP status.
    #[error("Unexpected HTTP response status: {status}")]
    HttpStatus { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Codec ───────────────────────────────────────────────────────
    /// A command payload could not be serialized to JSON.
    #[error("Failed to encode command payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Response body (or its `data` field) did not match the expected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    // ── Session ─────────────────────────────────────────────────────
    /// Login rejected, login response without a token, or a failed
    /// session renewal (the login failure is kept as `source`).
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Too many session renewals without a usable session.
    #[error("Reached max token renewal attempts ({max_retries})")]
    RetryBudgetExhausted { max_retries: u32 },

    // ── Relay status codes ──────────────────────────────────────────
    /// The relay reported a server error (code 500). The cooldown has
    /// already elapsed when this is returned.
    #[error("Relay busy (code 500) after {cooldown_secs}s cooldown: {data}")]
    ServerBusy { cooldown_secs: u64, data: String },

    /// Any other non-success envelope code.
    #[error("Unexpected response code {code}: {data}")]
    UnexpectedStatus { code: i64, data: String },

    // ── Command results ─────────────────────────────────────────────
    /// The power command's echo did not confirm the requested device.
    #[error("Unexpected result: {raw}")]
    UnexpectedResult { raw: String },

    /// A stats query returned no rows for the device.
    #[error("No stats returned for device {sn}")]
    NotFound { sn: String },
}

impl Error {
    /// Build an `Authentication` error without an underlying cause.
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` for network-level and HTTP-status failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }

    /// Returns `true` if credentials or the session are the problem.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::RetryBudgetExhausted { .. }
        )
    }

    /// Returns `true` if the caller may reasonably try the same call again.
    ///
    /// `ServerBusy` is retryable because the cooldown has already been served.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { status } => *status >= 500,
            Self::ServerBusy { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_failure_keeps_login_cause() {
        let inner = Error::UnexpectedStatus {
            code: 401,
            data: "\"bad password\"".into(),
        };
        let err = Error::Authentication {
            message: "session renewal failed".into(),
            source: Some(Box::new(inner)),
        };

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Unexpected response code 401: \"bad password\"")
        );
        assert!(err.is_auth());
        assert!(!err.is_retryable());
    }

    #[test]
    fn classification_helpers() {
        assert!(Error::HttpStatus { status: 502 }.is_transport());
        assert!(Error::HttpStatus { status: 502 }.is_retryable());
        assert!(!Error::HttpStatus { status: 404 }.is_retryable());
        assert!(
            Error::ServerBusy {
                cooldown_secs: 5,
                data: String::new()
            }
            .is_retryable()
        );
        assert!(Error::NotFound { sn: "SWW1".into() }.is_not_found());
        assert!(Error::RetryBudgetExhausted { max_retries: 3 }.is_auth());
    }
}
