//! Session Gate for LinkSaver.
//!
//! Decides whether the current session is signed in. The only state is the
//! presence of a token under [`AUTH_TOKEN_KEY`]; its content is never inspected.
//! Credentials are checked against a single hard-coded demo account.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::storage::{LocalStorage, AUTH_TOKEN_KEY};
use crate::types::errors::SessionError;

pub const DEMO_EMAIL: &str = "demo@test.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Trait defining sign-in state operations.
pub trait SessionGateTrait {
    /// Returns `Ok(true)` and stores a token when the pair matches the demo account.
    fn login(&self, email: &str, password: &str) -> Result<bool, SessionError>;
    fn is_authenticated(&self) -> bool;
    /// Removes the token. Calling it while signed out is a no-op.
    fn logout(&self) -> Result<(), SessionError>;
}

pub struct SessionGate {
    storage: Arc<dyn LocalStorage>,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn LocalStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Form-level sign in: rejects blank fields, then maps a failed `login`
    /// to the message shown next to the form.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        if self.login(email, password)? {
            Ok(())
        } else {
            Err(SessionError::InvalidCredentials {
                email: DEMO_EMAIL,
                password: DEMO_PASSWORD,
            })
        }
    }

    fn issue_token(&self, email: &str) -> String {
        let millis = self.clock.now().timestamp_millis();
        BASE64.encode(format!("{}:{}", email, millis))
    }
}

impl SessionGateTrait for SessionGate {
    fn login(&self, email: &str, password: &str) -> Result<bool, SessionError> {
        if email != DEMO_EMAIL || password != DEMO_PASSWORD {
            debug!("login rejected");
            return Ok(false);
        }

        let token = self.issue_token(email);
        self.storage.set_item(AUTH_TOKEN_KEY, &token)?;
        debug!("session token issued");
        Ok(true)
    }

    fn is_authenticated(&self) -> bool {
        match self.storage.get_item(AUTH_TOKEN_KEY) {
            Ok(token) => token.is_some_and(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read session token, treating as signed out");
                false
            }
        }
    }

    fn logout(&self) -> Result<(), SessionError> {
        self.storage.remove_item(AUTH_TOKEN_KEY)?;
        debug!("session token cleared");
        Ok(())
    }
}
