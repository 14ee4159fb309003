// Session state
//
// Domain override + token from the last successful login, plus the
// cross-call counter of failed renewals. Only the authenticator in
// `auth.rs` mutates it.

use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Default)]
pub(crate) struct Session {
    /// Host returned by login. Empty means "use the configured API host".
    domain: String,
    token: Option<SecretString>,
    /// Failed renewals since the last successful login.
    retries: u32,
}

impl Session {
    pub(crate) fn domain(&self) -> Option<&str> {
        Some(self.domain.as_str()).filter(|d| !d.is_empty())
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    pub(crate) fn retries(&self) -> u32 {
        self.retries
    }

    /// Install a fresh session. Domain and token are replaced together and
    /// the renewal counter starts over.
    pub(crate) fn establish(&mut self, domain: String, token: SecretString) {
        self.domain = domain;
        self.token = Some(token);
        self.retries = 0;
    }

    /// Count a failed renewal. The existing domain/token stay untouched.
    pub(crate) fn record_failure(&mut self) {
        self.retries = self.retries.saturating_add(1);
    }
}
