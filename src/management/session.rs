use std::time::Duration;

use tokio::sync::Mutex;

use crate::{management::TtlCache, utils};

/// How long a browser session stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 14);
/// How long a started login may take before its state is forgotten.
pub const LOGIN_STATE_TTL: Duration = Duration::from_secs(600);

/// Sessions of the HTTP front end.
///
/// Keeps `state -> code verifier` for logins in flight and
/// `session token -> user id` for logged in browsers.
pub struct SessionStore {
    pending: Mutex<TtlCache<String, String>>,
    sessions: Mutex<TtlCache<String, String>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_TTL, LOGIN_STATE_TTL)
    }
}

impl SessionStore {
    pub fn new(session_ttl: Duration, login_state_ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(TtlCache::new(login_state_ttl)),
            sessions: Mutex::new(TtlCache::new(session_ttl)),
        }
    }

    /// Starts a login: returns the `state` to send along and the PKCE verifier.
    pub async fn begin_login(&self) -> (String, String) {
        let state = utils::generate_session_token();
        let verifier = utils::generate_code_verifier();
        self.pending
            .lock()
            .await
            .insert(state.clone(), verifier.clone());
        (state, verifier)
    }

    /// Returns the verifier for `state`; each state can be used once.
    pub async fn take_verifier(&self, state: &str) -> Option<String> {
        self.pending.lock().await.remove(&state.to_string())
    }

    pub async fn create_session(&self, user_id: &str) -> String {
        let token = utils::generate_session_token();
        self.sessions
            .lock()
            .await
            .insert(token.clone(), user_id.to_string());
        token
    }

    pub async fn user_for(&self, session_token: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .get(&session_token.to_string())
            .cloned()
    }

    pub async fn end_session(&self, session_token: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .remove(&session_token.to_string())
    }
}
