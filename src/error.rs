//! Error types
//!
//! Every fallible operation in the library returns [`Error`]. Callers that
//! only care about the broad category (retry on transport, re-login on auth,
//! refresh on conflict) use [`Error::kind`].

use std::collections::BTreeMap;
use std::fmt;

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::common::Message;

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network, TLS or DNS failure.
    Transport,
    /// 401 or 403, or a mutation attempted without a session.
    Auth,
    /// 404
    NotFound,
    /// 409 or 412, typically a stale ETag.
    Conflict,
    /// Any other 4xx, or a request rejected locally before dispatch.
    ClientError,
    /// 5xx
    ServerError,
    /// Body was not well-formed JSON or lacked a required field.
    Decode,
    /// `update` called on a resource that was never fetched.
    StateNotFetched,
    /// One or more collection members failed to fetch.
    CollectionPartial,
    /// The caller's cancellation token fired.
    Cancelled,
}

/// A non-2xx response from the service.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub method: Method,
    pub uri: String,
    pub status: StatusCode,
    /// `error.code` from the Redfish error payload.
    pub code: Option<String>,
    /// `error.message` from the Redfish error payload.
    pub message: Option<String>,
    /// `@Message.ExtendedInfo` entries, in server order.
    pub extended_info: Vec<Message>,
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self.status.as_u16() {
            401 | 403 => ErrorKind::Auth,
            404 => ErrorKind::NotFound,
            409 | 412 => ErrorKind::Conflict,
            500..=599 => ErrorKind::ServerError,
            _ => ErrorKind::ClientError,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} returned {}", self.method, self.uri, self.status)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        for info in &self.extended_info {
            write!(f, " [{}: {}]", info.message_id, info.message)?;
        }
        Ok(())
    }
}

/// Per-member failures of one collection fetch, keyed by member URI.
#[derive(Debug, Default)]
pub struct CollectionFailures(pub BTreeMap<String, Error>);

impl CollectionFailures {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, uri: &str) -> Option<&Error> {
        self.0.get(uri)
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, uri: String, error: Error) {
        self.0.insert(uri, error);
    }
}

impl fmt::Display for CollectionFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} member(s) failed", self.0.len())?;
        for (uri, error) in &self.0 {
            write!(f, "; {}: {}", uri, error)?;
        }
        Ok(())
    }
}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response.
    #[error("transport error: {method} {uri}: {source}")]
    Transport {
        method: Method,
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{0}")]
    Http(Box<HttpError>),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid JSON on either side of the wire.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URI could not be resolved against the service base URL.
    #[error("invalid uri '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required action parameter was empty or a value was not allowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The resource does not advertise the requested action.
    #[error("action '{0}' is not supported by this resource")]
    ActionUnsupported(&'static str),

    /// `update` was called on a resource without preserved server state.
    #[error("resource '{0}' has no fetched state to diff against")]
    StateNotFetched(String),

    /// The resource was decoded without a client and cannot reach the service.
    #[error("resource '{0}' is not attached to a client")]
    Detached(String),

    /// A mutating call was attempted while the session is not established.
    #[error("not authenticated: {0}")]
    NotAuthenticated(&'static str),

    /// Members of a collection failed; successful members are returned separately.
    #[error("collection partially fetched: {0}")]
    CollectionPartial(CollectionFailures),

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Http(http) => http.kind(),
            Self::Decode(_) | Self::Json(_) => ErrorKind::Decode,
            Self::InvalidUri { .. }
            | Self::Config(_)
            | Self::InvalidArgument(_)
            | Self::ActionUnsupported(_) => ErrorKind::ClientError,
            Self::StateNotFetched(_) | Self::Detached(_) => ErrorKind::StateNotFetched,
            Self::NotAuthenticated(_) => ErrorKind::Auth,
            Self::CollectionPartial(_) => ErrorKind::CollectionPartial,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(http) => Some(http.status),
            _ => None,
        }
    }

    /// The service's `@Message.ExtendedInfo` list, empty when absent.
    pub fn extended_info(&self) -> &[Message] {
        match self {
            Self::Http(http) => &http.extended_info,
            _ => &[],
        }
    }

    /// Whether an idempotent request may be retried after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::ServerError)
    }

    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<HttpError> for Error {
    fn from(error: HttpError) -> Self {
        Self::Http(Box::new(error))
    }
}
