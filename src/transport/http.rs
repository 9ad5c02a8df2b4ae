//! HTTP verb surface for Redfish calls

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, IF_MATCH};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::common::ErrorBody;
use crate::error::{Error, HttpError, Result};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying the session token.
pub const X_AUTH_TOKEN: &str = "X-Auth-Token";

const JSON: &str = "application/json";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Credentials attached to a single request.
#[derive(Clone)]
pub enum RequestAuth {
    None,
    Basic { username: String, password: String },
    Token(String),
}

impl std::fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => write!(f, "Basic({})", username),
            Self::Token(_) => write!(f, "Token(***)"),
        }
    }
}

/// A successful response: status, headers and the raw body bytes.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("ETag")
    }

    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Body as JSON; an empty body is `Value::Null`.
    pub fn json(&self) -> Result<Value> {
        if self.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::decode(format!("response body is not JSON: {}", e)))
    }
}

/// Transport settings taken from the client configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub insecure: bool,
    pub user_agent: String,
}

/// HTTP client wrapper for Redfish calls
#[derive(Clone, Debug)]
pub struct RedfishHttpClient {
    client: Client,
}

impl RedfishHttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send one request and return the response, or a structured error for
    /// any non-2xx status.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        auth: &RequestAuth,
        body: Option<&Value>,
        etag: Option<&str>,
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, url);

        let uri = url.to_string();
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static(JSON));

        request = match auth {
            RequestAuth::None => request,
            RequestAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            RequestAuth::Token(token) => request.header(X_AUTH_TOKEN, token),
        };

        if let Some(etag) = etag {
            request = request.header(IF_MATCH, etag);
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static(JSON))
                .body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(|source| Error::Transport {
            method: method.clone(),
            uri: uri.clone(),
            source,
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|source| Error::Transport {
            method: method.clone(),
            uri: uri.clone(),
            source,
        })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} {} - {} - {}",
                method,
                uri,
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
            let parsed = ErrorBody::parse(&body).unwrap_or_default();
            return Err(HttpError {
                method,
                uri,
                status,
                code: parsed.code,
                message: parsed.message,
                extended_info: parsed.extended_info,
            }
            .into());
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = format!("{}é", "x".repeat(MAX_LOG_BODY_LENGTH - 1));
        let sanitized = sanitize_for_log(&format!("{}{}", body, "y".repeat(50)));
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH - 1)));
    }

    #[test]
    fn test_request_auth_debug_hides_secrets() {
        let basic = RequestAuth::Basic {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(format!("{:?}", basic), "Basic(admin)");
        assert_eq!(format!("{:?}", RequestAuth::Token("abc".into())), "Token(***)");
    }

    #[test]
    fn test_empty_response_json_is_null() {
        let response = Response {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"  \n"),
        };
        assert!(response.is_empty());
        assert_eq!(response.json().unwrap(), Value::Null);
    }
}
