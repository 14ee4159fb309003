//! CLI error types with miette diagnostics.
//!
//! Maps `revogi_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use revogi_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const BUSY: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Revogi relay at {url}")]
    #[diagnostic(
        code(revogi::connection_failed),
        help(
            "Check your network connection and the api_url setting.\n\
             Try: revogi login -v"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(revogi::tls_error),
        help("Check ca_cert in your config, or use --insecure (-k) for a self-signed relay mirror.")
    )]
    TlsError { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(revogi::timeout),
        help("Increase timeout with --timeout or the timeout config key.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(revogi::auth_failed),
        help(
            "Verify your username and password.\n\
             Run: revogi config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Session could not be renewed after {max_retries} attempts")]
    #[diagnostic(
        code(revogi::retry_budget_exhausted),
        help("The relay keeps rejecting the session. Check your credentials or raise --max-retries.")
    )]
    RetryBudgetExhausted { max_retries: u32 },

    #[error("No credentials configured: {reason}")]
    #[diagnostic(
        code(revogi::no_credentials),
        help(
            "Configure credentials with: revogi config init\n\
             Or set REVOGI_USERNAME and REVOGI_PASSWORD."
        )
    )]
    NoCredentials { reason: String },

    // ── Relay ────────────────────────────────────────────────────────
    #[error("The relay is busy (waited {cooldown_secs}s)")]
    #[diagnostic(code(revogi::server_busy), help("Try again in a moment."))]
    ServerBusy { cooldown_secs: u64 },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(revogi::not_found),
        help("Run: revogi {list_command} to see available devices")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(revogi::api_error))]
    ApiError { code: String, message: String },

    // ── Validation / Config ──────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(revogi::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(revogi::config),
        help("Check the file printed by: revogi config path")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(revogi::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(revogi::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. }
            | Self::RetryBudgetExhausted { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ServerBusy { .. } => exit_code::BUSY,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── revogi_api::Error → CliError mapping ─────────────────────────────

impl From<revogi_api::Error> for CliError {
    fn from(err: revogi_api::Error) -> Self {
        use revogi_api::Error as ApiErr;

        match err {
            ApiErr::Transport(e) if e.is_timeout() => CliError::Timeout,

            ApiErr::Transport(e) => CliError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },

            ApiErr::HttpStatus { status } => CliError::ApiError {
                code: format!("http_{status}"),
                message: format!("relay answered with HTTP {status}"),
            },

            ApiErr::InvalidUrl(e) => CliError::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            },

            ApiErr::Tls(message) => CliError::TlsError { message },

            ApiErr::Encoding(e) => CliError::Json(e),

            ApiErr::MalformedResponse { message, .. } => CliError::ApiError {
                code: "malformed_response".into(),
                message,
            },

            ApiErr::Authentication { message, source } => CliError::AuthFailed {
                message: match source {
                    Some(cause) => format!("{message}: {cause}"),
                    None => message,
                },
            },

            ApiErr::RetryBudgetExhausted { max_retries } => {
                CliError::RetryBudgetExhausted { max_retries }
            }

            ApiErr::ServerBusy { cooldown_secs, .. } => CliError::ServerBusy { cooldown_secs },

            ApiErr::UnexpectedStatus { code, data } => CliError::ApiError {
                code: code.to_string(),
                message: data,
            },

            ApiErr::UnexpectedResult { raw } => CliError::ApiError {
                code: "unexpected_result".into(),
                message: raw,
            },

            ApiErr::NotFound { sn } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: sn,
                list_command: "devices list".into(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoUsername => CliError::NoCredentials {
                reason: "no username".into(),
            },
            ConfigError::NoPassword { username } => CliError::NoCredentials {
                reason: format!("no password for '{username}'"),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let busy: CliError = revogi_api::Error::ServerBusy {
            cooldown_secs: 3,
            data: String::new(),
        }
        .into();
        assert_eq!(busy.exit_code(), exit_code::BUSY);

        let exhausted: CliError = revogi_api::Error::RetryBudgetExhausted { max_retries: 2 }.into();
        assert_eq!(exhausted.exit_code(), exit_code::AUTH);

        let missing: CliError = revogi_api::Error::NotFound { sn: "SWW1".into() }.into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "device 'SWW1' not found");
    }

    #[test]
    fn renewal_cause_is_kept_in_message() {
        let err: CliError = revogi_api::Error::Authentication {
            message: "session renewal failed".into(),
            source: Some(Box::new(revogi_api::Error::UnexpectedStatus {
                code: 401,
                data: "\"denied\"".into(),
            })),
        }
        .into();

        match err {
            CliError::AuthFailed { ref message } => {
                assert!(message.starts_with("session renewal failed: "), "{message}");
                assert!(message.contains("denied"), "{message}");
            }
            ref other => panic!("expected AuthFailed, got: {other:?}"),
        }
    }

    #[test]
    fn missing_username_is_a_credentials_error() {
        let err: CliError = ConfigError::NoUsername.into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
