// Session authentication
//
// Login (command 101) and the renewal path the dispatcher takes on a 401.
// This is the only code that writes to the session.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::RevogiClient;
use crate::envelope::{Command, CommandCode, STATUS_OK, STATUS_SERVER_ERROR};
use crate::error::Error;
use crate::models::LoginData;

impl RevogiClient {
    /// Authenticate with the configured username/password.
    ///
    /// On success the session domain and token are replaced together and
    /// the renewal counter is reset. On failure the previous session is
    /// left as it was.
    pub async fn login(&self) -> Result<(), Error> {
        let _gate = self.login_gate.lock().await;
        self.authenticate().await
    }

    /// Log in lazily before the first session command.
    pub(crate) async fn ensure_session(&self) -> Result<(), Error> {
        if self.session.read().await.has_token() {
            return Ok(());
        }

        let _gate = self.login_gate.lock().await;
        // Another call may have logged in while we waited.
        if self.session.read().await.has_token() {
            return Ok(());
        }

        debug!("no session token yet, logging in");
        self.authenticate().await
    }

    /// Replace the session whose token `stale` was just rejected.
    ///
    /// If the session no longer holds `stale`, another call has already
    /// renewed it and nothing is done. Fails with `RetryBudgetExhausted` once `max_retries` renewals in a
    /// row have failed. A failed login bumps that counter and is returned
    /// wrapped in `Error::Authentication`.
    pub(crate) async fn renew_session(&self, stale: Option<&str>) -> Result<(), Error> {
        let _gate = self.login_gate.lock().await;

        {
            let session = self.session.read().await;
            if session.has_token() && session.token() != stale {
                debug!("session already renewed by a concurrent call");
                return Ok(());
            }
            let max_retries = self.config().max_retries;
            if session.retries() >= max_retries {
                return Err(Error::RetryBudgetExhausted { max_retries });
            }
        }

        match self.authenticate().await {
            Ok(()) => Ok(()),
            Err(e) => {
                let failures = {
                    let mut session = self.session.write().await;
                    session.record_failure();
                    session.retries()
                };
                warn!(failures, error = %e, "session renewal failed");
                Err(Error::Authentication {
                    message: "session renewal failed".into(),
                    source: Some(Box::new(e)),
                })
            }
        }
    }

    /// Run the login command and install the resulting session.
    ///
    /// Callers must hold `login_gate`.
    async fn authenticate(&self) -> Result<(), Error> {
        let config = self.config();
        let payload = json!({
            "username": config.username,
            "password": config.password.expose_secret(),
        });
        let command = Command::new(CommandCode::Login, &payload, false)?;

        debug!(username = %config.username, "logging in");
        let (envelope, _) = self.transmit(&command).await?;

        match envelope.code {
            STATUS_OK => {}
            STATUS_SERVER_ERROR => return Err(self.cool_down(&envelope).await),
            code => {
                return Err(Error::auth(format!(
                    "login rejected (code {code}): {}",
                    envelope.raw_data()
                )));
            }
        }

        let data: LoginData = envelope.data_as().map_err(|e| Error::Authentication {
            message: "unreadable login response".into(),
            source: Some(Box::new(e)),
        })?;

        if data.token.is_empty() {
            return Err(Error::auth("login response carried no session token"));
        }

        info!(
            domain = %data.domain,
            user_id = %data.user_id,
            name = %data.name,
            "logged in"
        );
        if !data.message.is_empty() {
            debug!(message = %data.message, "login message");
        }

        self.session
            .write()
            .await
            .establish(data.domain, SecretString::from(data.token));
        Ok(())
    }
}
