//! Redfish authentication
//!
//! Handles HTTP basic credentials and the session-token lifecycle:
//! unauthenticated → (POST credentials) → authenticated → (DELETE session) → closed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::http::RequestAuth;
use crate::error::{Error, Result};

/// Default URI of the session collection.
pub const SESSIONS_URI: &str = "/redfish/v1/SessionService/Sessions";

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// No credentials at all (service root, unauthenticated mockups).
    None,
    /// HTTP basic credentials on every request.
    Basic,
    /// `X-Auth-Token` from a login session.
    #[default]
    Session,
}

/// An established login session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// URI to DELETE on logout; `None` when the token was supplied directly.
    pub uri: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("uri", &self.uri)
            .finish()
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
    Closed,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Credentials plus shared session state
#[derive(Clone)]
pub struct Auth {
    method: AuthMethod,
    username: Option<String>,
    password: Option<String>,
    state: Arc<RwLock<SessionState>>,
    /// Held for the duration of a login so only one attempt is in flight.
    login_lock: Arc<Mutex<()>>,
}

impl Auth {
    pub fn new(
        method: AuthMethod,
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
    ) -> Self {
        let state = match token {
            Some(token) => SessionState::Authenticated(Session { token, uri: None }),
            None => SessionState::Unauthenticated,
        };

        Self {
            method,
            username,
            password,
            state: Arc::new(RwLock::new(state)),
            login_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Username and password, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Ok((user, pass)),
            _ => Err(Error::Config(
                "username and password are required to authenticate".to_string(),
            )),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub(crate) async fn lock_login(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.login_lock.lock().await
    }

    pub(crate) async fn set_state(&self, state: SessionState) {
        *self.state.write().await = state;
    }

    /// Drop back to unauthenticated after the service rejected the token.
    pub(crate) async fn expire(&self) {
        let mut state = self.state.write().await;
        if state.is_authenticated() {
            tracing::debug!("Session rejected by service, now unauthenticated");
            *state = SessionState::Unauthenticated;
        }
    }

    /// Credentials to attach to a request. In session mode, mutating verbs
    /// are refused locally until a session exists; reads go out bare so the
    /// unauthenticated service root stays reachable.
    pub async fn request_auth(&self, mutating: bool) -> Result<RequestAuth> {
        match self.method {
            AuthMethod::None => Ok(RequestAuth::None),
            AuthMethod::Basic => {
                let (username, password) = self.credentials()?;
                Ok(RequestAuth::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            AuthMethod::Session => match &*self.state.read().await {
                SessionState::Authenticated(session) => Ok(RequestAuth::Token(session.token.clone())),
                SessionState::Unauthenticated if mutating => {
                    Err(Error::NotAuthenticated("no session established"))
                }
                SessionState::Closed if mutating => Err(Error::NotAuthenticated("session closed")),
                _ => Ok(RequestAuth::None),
            },
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("method", &self.method)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_auth() -> Auth {
        Auth::new(
            AuthMethod::Session,
            Some("admin".to_string()),
            Some("secret".to_string()),
            None,
        )
    }

    #[tokio::test]
    async fn test_mutations_refused_without_session() {
        let auth = session_auth();
        let err = auth.request_auth(true).await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated(_)));

        // Reads still go out, without credentials.
        assert!(matches!(auth.request_auth(false).await, Ok(RequestAuth::None)));
    }

    #[tokio::test]
    async fn test_token_is_attached_once_authenticated() {
        let auth = session_auth();
        auth.set_state(SessionState::Authenticated(Session {
            token: "tok".to_string(),
            uri: Some("/redfish/v1/SessionService/Sessions/1".to_string()),
        }))
        .await;

        match auth.request_auth(true).await.unwrap() {
            RequestAuth::Token(token) => assert_eq!(token, "tok"),
            other => panic!("unexpected auth {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expire_returns_to_unauthenticated() {
        let auth = Auth::new(AuthMethod::Session, None, None, Some("preissued".to_string()));
        assert!(auth.state().await.is_authenticated());

        auth.expire().await;
        assert_eq!(auth.state().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_expire_keeps_closed() {
        let auth = session_auth();
        auth.set_state(SessionState::Closed).await;
        auth.expire().await;
        assert_eq!(auth.state().await, SessionState::Closed);
    }

    #[tokio::test]
    async fn test_basic_requires_credentials() {
        let auth = Auth::new(AuthMethod::Basic, Some("admin".to_string()), None, None);
        assert!(matches!(auth.request_auth(false).await, Err(Error::Config(_))));

        let auth = Auth::new(
            AuthMethod::Basic,
            Some("admin".to_string()),
            Some("pw".to_string()),
            None,
        );
        assert!(matches!(
            auth.request_auth(true).await,
            Ok(RequestAuth::Basic { .. })
        ));
    }
}
