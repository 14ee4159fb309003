// Relay command client
//
// Wraps `reqwest::Client` with endpoint resolution, envelope decoding and
// the status-code policy every command goes through. Login lives in
// `auth.rs`; device commands are inherent methods in their own files so this
// module stays about dispatch.

use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace, warn};
use url::Url;

use crate::envelope::{Command, Envelope, STATUS_OK, STATUS_SERVER_ERROR, STATUS_UNAUTHORIZED};
use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;

/// Default relay host, used until a login hands out a regional domain.
pub const DEFAULT_API_URL: &str = "https://server.revogi.net";

const AJAX_PATH: &str = "/services/ajax.html";

/// Everything the client needs for its whole lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay base URL. A session domain replaces its authority but keeps
    /// the scheme.
    pub api_url: Url,
    pub username: String,
    pub password: SecretString,
    /// Session renewals allowed after a 401 before giving up.
    pub max_retries: u32,
    /// Pause applied after a code 500 before the error is returned.
    pub cooldown: Duration,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            username: username.into(),
            password,
            max_retries: 3,
            cooldown: Duration::from_secs(10),
            transport: TransportConfig::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Client for the Revogi cloud relay.
///
/// Owns the session for its whole lifetime. Safe to share between tasks:
/// the session sits behind a lock and logins are serialized, so two calls
/// that hit an expired token renew it once.
pub struct RevogiClient {
    http: reqwest::Client,
    config: ClientConfig,
    pub(crate) session: RwLock<Session>,
    /// Held for the duration of every login attempt.
    pub(crate) login_gate: Mutex<()>,
}

impl RevogiClient {
    /// Create a client, building the HTTP client from `config.transport`.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            session: RwLock::new(Session::default()),
            login_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The domain override handed out by the last login, if any.
    pub async fn session_domain(&self) -> Option<String> {
        self.session.read().await.domain().map(str::to_owned)
    }

    /// Whether a login has produced a usable token.
    pub async fn has_session(&self) -> bool {
        self.session.read().await.has_token()
    }

    /// Failed session renewals since the last successful login.
    pub async fn renewal_failures(&self) -> u32 {
        self.session.read().await.retries()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send a command and apply the relay's status policy.
    ///
    /// - `200`: the envelope is returned.
    /// - `401` on a session command: the session is renewed and the command
    ///   resubmitted, at most `max_retries` times per call.
    /// - `500`: the cooldown is served, then `Error::ServerBusy`.
    /// - anything else: `Error::UnexpectedStatus`.
    pub async fn send(&self, command: &Command) -> Result<Envelope, Error> {
        if command.requires_session() {
            self.ensure_session().await?;
        }

        let max_retries = self.config.max_retries;
        for attempt in 0..=max_retries {
            let (envelope, sent_token) = self.transmit(command).await?;
            match envelope.code {
                STATUS_OK => return Ok(envelope),
                STATUS_UNAUTHORIZED if command.requires_session() => {
                    if attempt == max_retries {
                        break;
                    }
                    warn!(cmd = %command.code(), attempt, "session expired, renewing");
                    self.renew_session(sent_token.as_deref()).await?;
                }
                STATUS_SERVER_ERROR => return Err(self.cool_down(&envelope).await),
                code => {
                    return Err(Error::UnexpectedStatus {
                        code,
                        data: envelope.raw_data(),
                    });
                }
            }
        }

        Err(Error::RetryBudgetExhausted { max_retries })
    }

    /// One round trip: POST the form, check the HTTP status, decode the
    /// envelope. No status-code policy is applied here.
    ///
    /// Also returns the session token that went out with the request, so a
    /// 401 can be matched to the token it rejected.
    pub(crate) async fn transmit(
        &self,
        command: &Command,
    ) -> Result<(Envelope, Option<String>), Error> {
        let (url, sent_token) = {
            let session = self.session.read().await;
            (
                self.endpoint(session.domain())?,
                session
                    .token()
                    .filter(|_| command.requires_session())
                    .map(str::to_owned),
            )
        };

        debug!(cmd = %command.code(), %url, "sending command");

        let resp = self
            .http
            .post(url)
            .form(&command.form(sent_token.as_deref()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(Error::Transport)?;
        let envelope = Envelope::decode(&body)?;
        trace!(
            code = envelope.code,
            response = envelope.response,
            sn = %envelope.correlation,
            "received envelope"
        );
        Ok((envelope, sent_token))
    }

    /// Serve the cooldown for a code 500 and build the resulting error.
    pub(crate) async fn cool_down(&self, envelope: &Envelope) -> Error {
        let cooldown = self.config.cooldown;
        warn!(
            cooldown_secs = cooldown.as_secs(),
            "relay reported a server error, cooling down"
        );
        tokio::time::sleep(cooldown).await;
        Error::ServerBusy {
            cooldown_secs: cooldown.as_secs(),
            data: envelope.raw_data(),
        }
    }

    /// `{scheme}://{domain-or-api-host}/services/ajax.html`
    fn endpoint(&self, domain: Option<&str>) -> Result<Url, Error> {
        let url = match domain {
            Some(domain) => Url::parse(&format!(
                "{}://{domain}{AJAX_PATH}",
                self.config.api_url.scheme()
            ))?,
            None => self.config.api_url.join(AJAX_PATH)?,
        };
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(api_url: &str) -> RevogiClient {
        let config = ClientConfig::new("user", SecretString::from("pw".to_owned()))
            .with_api_url(Url::parse(api_url).unwrap());
        RevogiClient::with_client(reqwest::Client::new(), config)
    }

    #[test]
    fn endpoint_defaults_to_api_host() {
        let client = client(DEFAULT_API_URL);
        let url = client.endpoint(None).unwrap();
        assert_eq!(url.as_str(), "https://server.revogi.net/services/ajax.html");
    }

    #[test]
    fn endpoint_prefers_session_domain() {
        let client = client("http://127.0.0.1:8080");
        let url = client.endpoint(Some("lon.revogi.net")).unwrap();
        assert_eq!(url.as_str(), "http://lon.revogi.net/services/ajax.html");
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("user", SecretString::from("pw".to_owned()));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cooldown, Duration::from_secs(10));
        assert_eq!(config.api_url.as_str(), "https://server.revogi.net/");
    }
}
