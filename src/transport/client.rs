//! Redfish Client
//!
//! Main client for talking to a Redfish service, combining authentication
//! and HTTP functionality. Cheap to clone; clones share the session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::auth::{Auth, AuthMethod, Session, SessionState, SESSIONS_URI};
use super::http::{HttpSettings, RedfishHttpClient, Response, X_AUTH_TOKEN};
use crate::error::{Error, Result};
use crate::resource;
use crate::schemas::ServiceRoot;

/// URI of the service root.
pub const SERVICE_ROOT: &str = "/redfish/v1/";

/// Default per-request timeout. BMCs are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of concurrent member fetches in a collection.
pub const DEFAULT_FAN_OUT: usize = 8;

const DEFAULT_MAX_REDIRECTS: usize = 5;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://bmc.example.com`.
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Pre-issued session token; skips login.
    pub token: Option<String>,
    pub auth: AuthMethod,
    /// If true, skips TLS verification (insecure)
    pub insecure: bool,
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Upper bound on parallel member GETs in the collection engine.
    pub fan_out: usize,
    /// Extra attempts for a failing member GET (transport errors and 5xx only).
    pub member_retries: u32,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://127.0.0.1".to_string(),
            username: None,
            password: None,
            token: None,
            auth: AuthMethod::Session,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            fan_out: DEFAULT_FAN_OUT,
            member_retries: 0,
            user_agent: format!("redfish/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Log in with a session using these credentials.
    pub fn with_session(mut self, username: &str, password: &str) -> Self {
        self.auth = AuthMethod::Session;
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Send HTTP basic credentials on every request.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.auth = AuthMethod::Basic;
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Use a token obtained elsewhere.
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth = AuthMethod::Session;
        self.token = Some(token.to_string());
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.auth = AuthMethod::None;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn with_member_retries(mut self, retries: u32) -> Self {
        self.member_retries = retries;
        self
    }

    fn validate(&self) -> Result<Url> {
        if self.fan_out == 0 {
            return Err(Error::Config("fan_out must be at least 1".to_string()));
        }
        let url = Url::parse(&self.endpoint).map_err(|source| Error::InvalidUri {
            uri: self.endpoint.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "endpoint '{}' cannot be used as a base URL",
                self.endpoint
            )));
        }
        Ok(url)
    }
}

struct Inner {
    config: ClientConfig,
    base_url: Url,
    http: RedfishHttpClient,
    auth: Auth,
}

/// Main Redfish client
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.config.endpoint)
            .field("auth", &self.inner.auth)
            .finish()
    }
}

impl Client {
    /// Create a client without touching the network.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.validate()?;
        let http = RedfishHttpClient::new(&HttpSettings {
            timeout: config.timeout,
            max_redirects: config.max_redirects,
            insecure: config.insecure,
            user_agent: config.user_agent.clone(),
        })?;
        let auth = Auth::new(
            config.auth,
            config.username.clone(),
            config.password.clone(),
            config.token.clone(),
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                base_url,
                http,
                auth,
            }),
        })
    }

    /// Create a client and, in session mode with credentials, log in.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;
        if client.inner.auth.method() == AuthMethod::Session
            && !client.session_state().await.is_authenticated()
        {
            client.login().await?;
        }
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub async fn session_state(&self) -> SessionState {
        self.inner.auth.state().await
    }

    /// Resolve `uri` against the service base URL. Absolute URLs pass through.
    pub fn resolve(&self, uri: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(uri)
            .map_err(|source| Error::InvalidUri {
                uri: uri.to_string(),
                source,
            })
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// POST credentials to the session collection and keep the token.
    pub async fn login(&self) -> Result<()> {
        let auth = &self.inner.auth;
        let _guard = auth.lock_login().await;

        if auth.state().await.is_authenticated() {
            return Ok(());
        }

        let (username, password) = auth.credentials()?;
        tracing::info!("Creating session for {}", username);

        let body = serde_json::json!({ "UserName": username, "Password": password });
        let response = self
            .inner
            .http
            .send(
                Method::POST,
                self.resolve(SESSIONS_URI)?,
                &super::http::RequestAuth::None,
                Some(&body),
                None,
            )
            .await?;

        let token = response
            .header(X_AUTH_TOKEN)
            .map(str::to_string)
            .ok_or_else(|| Error::decode("login response carried no X-Auth-Token header"))?;

        let uri = match response.location() {
            Some(location) => Some(location.to_string()),
            None => response
                .json()
                .ok()
                .and_then(|v| v.get("@odata.id").and_then(|id| id.as_str()).map(str::to_string)),
        };

        auth.set_state(SessionState::Authenticated(Session { token, uri }))
            .await;
        Ok(())
    }

    /// DELETE the session and move to the closed state.
    pub async fn logout(&self) -> Result<()> {
        let session = match self.session_state().await {
            SessionState::Authenticated(session) => session,
            _ => return Ok(()),
        };

        if let Some(uri) = &session.uri {
            tracing::info!("Deleting session {}", uri);
            self.delete(uri).await?;
        }

        self.inner.auth.set_state(SessionState::Closed).await;
        Ok(())
    }

    // =========================================================================
    // HTTP verbs
    // =========================================================================

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        etag: Option<&str>,
    ) -> Result<Response> {
        let url = self.resolve(uri)?;
        let mutating = method != Method::GET;
        let auth = self.inner.auth.request_auth(mutating).await?;

        let result = self.inner.http.send(method, url, &auth, body, etag).await;

        if let Err(err) = &result {
            if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                && self.inner.auth.method() == AuthMethod::Session
            {
                self.inner.auth.expire().await;
            }
        }
        result
    }

    /// Make a GET request
    pub async fn get(&self, uri: &str) -> Result<Response> {
        self.request(Method::GET, uri, None, None).await
    }

    /// GET and parse the body as untyped JSON.
    pub async fn get_json(&self, uri: &str) -> Result<Value> {
        self.get(uri).await?.json()
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, uri: &str, body: &B) -> Result<Response> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, uri, Some(&body), None).await
    }

    /// Make a PATCH request, sending `If-Match` when an ETag is known
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        uri: &str,
        body: &B,
        etag: Option<&str>,
    ) -> Result<Response> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, uri, Some(&body), etag).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, uri: &str) -> Result<Response> {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Fetch the service root.
    pub async fn service_root(&self) -> Result<ServiceRoot> {
        resource::fetch::<ServiceRoot>(self, SERVICE_ROOT).await
    }
}
