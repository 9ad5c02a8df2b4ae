//! Resource runtime
//!
//! Every schema in [`crate::schemas`] is a plain data declaration plus a link
//! table; the behavior they share lives here.
//!
//! # Architecture
//!
//! - [`Resource`] - decode, fetch, link table, action table, raw `Oem`
//! - [`fetcher`] - collection engine: pagination and bounded fan-out
//! - [`update`] - diff-and-PATCH for writable resources
//! - [`dispatch`] - action invocation and parameter pre-validation
//!
//! # Example
//!
//! ```ignore
//! use redfish::resource::Resource;
//! use redfish::schemas::AccountService;
//!
//! async fn lockout(client: &redfish::Client) -> redfish::Result<()> {
//!     let mut service = AccountService::get(client, "/redfish/v1/AccountService").await?;
//!     service.account_lockout_threshold = Some(5);
//!     redfish::resource::update(&mut service).await?;
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod fetcher;
pub mod update;

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::common::{ActionTarget, Entity, Link, Links};
use crate::error::{Error, Result};
use crate::transport::Client;

pub use dispatch::{invoke, invoke_for, require};
pub use fetcher::{
    collect_uris, fetch_collection, fetch_collection_with, fetch_members, fetch_members_with,
    CollectionIndex, Collected,
};
pub use update::{changes, diff, diff_keyed, update, Writable};

/// Per-instance runtime state: the client a resource came through, the exact
/// body it was decoded from, and the response `ETag`.
#[derive(Clone, Default)]
pub struct State {
    client: Option<Client>,
    raw: Option<Bytes>,
    etag: Option<String>,
}

impl State {
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn raw(&self) -> Option<&Bytes> {
        self.raw.as_ref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("attached", &self.client.is_some())
            .field("raw_len", &self.raw.as_ref().map(Bytes::len))
            .field("etag", &self.etag)
            .finish()
    }
}

/// A link slot as reported by [`Resource::links`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRef<'a> {
    One(&'a Link),
    Many(&'a Links),
}

impl<'a> LinkRef<'a> {
    pub fn uris(&self) -> Vec<&'a str> {
        match self {
            Self::One(link) => link.as_option().into_iter().collect(),
            Self::Many(links) => links.uris().iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(link) => link.is_empty(),
            Self::Many(links) => links.is_empty(),
        }
    }
}

/// Behavior shared by every typed resource.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn entity(&self) -> &Entity;
    fn state(&self) -> &State;
    fn state_mut(&mut self) -> &mut State;

    /// Named link slots, in declaration order.
    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        Vec::new()
    }

    /// Named action targets, keyed by verb (`ResetBios`, `SimpleUpdate`, ...).
    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        Vec::new()
    }

    fn odata_id(&self) -> &str {
        &self.entity().odata_id
    }

    /// Fetch and decode the resource at `uri`.
    fn get(client: &Client, uri: &str) -> impl Future<Output = Result<Self>> + Send {
        fetch::<Self>(client, uri)
    }

    /// Decode `body`, attaching `client` for followers and actions.
    fn decode(body: Bytes, client: Option<Client>) -> Result<Self> {
        decode::<Self>(body, client)
    }

    /// The client this resource was fetched through.
    fn client(&self) -> Result<&Client> {
        self.state()
            .client()
            .ok_or_else(|| Error::Detached(self.odata_id().to_string()))
    }

    /// The `Oem` object exactly as the service sent it.
    fn oem(&self) -> Option<Box<RawValue>> {
        #[derive(Deserialize)]
        struct OemOnly {
            #[serde(rename = "Oem", default)]
            oem: Option<Box<RawValue>>,
        }

        let raw = self.state().raw()?;
        serde_json::from_slice::<OemOnly>(raw).ok()?.oem
    }

    /// Re-fetch this resource from its own URI, replacing the local state.
    fn refresh(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            let client = self.client()?.clone();
            let uri = self.odata_id().to_string();
            *self = fetch::<Self>(&client, &uri).await?;
            Ok(())
        }
    }
}

/// Decode a resource body. Fails if the body has no `@odata.id`.
pub fn decode<T: Resource>(body: Bytes, client: Option<Client>) -> Result<T> {
    let mut resource: T = serde_json::from_slice(&body)
        .map_err(|e| Error::decode(format!("{}: {}", std::any::type_name::<T>(), e)))?;

    if resource.entity().odata_id.is_empty() {
        return Err(Error::decode(format!(
            "{}: body has no @odata.id",
            std::any::type_name::<T>()
        )));
    }

    *resource.state_mut() = State {
        client,
        raw: Some(body),
        etag: None,
    };
    Ok(resource)
}

/// GET `uri` and decode it as `T`.
pub async fn fetch<T: Resource>(client: &Client, uri: &str) -> Result<T> {
    let response = client.get(uri).await?;
    let etag = response.etag().map(str::to_string);
    let mut resource: T = decode(response.body, Some(client.clone()))?;
    resource.state_mut().etag = etag;
    Ok(resource)
}

/// Follow a single link; `None` when the slot is empty.
pub async fn follow<T: Resource>(client: &Client, link: &Link) -> Result<Option<T>> {
    match link.as_option() {
        Some(uri) => Ok(Some(fetch(client, uri).await?)),
        None => Ok(None),
    }
}

/// Follow a single link from `resource` using its attached client.
pub async fn follow_from<R: Resource, T: Resource>(resource: &R, link: &Link) -> Result<Option<T>> {
    if link.is_empty() {
        return Ok(None);
    }
    follow(resource.client()?, link).await
}

/// Dereference a collection link from `resource`; empty when the slot is empty.
pub async fn collection_from<R: Resource, T: Resource>(
    resource: &R,
    link: &Link,
) -> Result<Collected<T>> {
    match link.as_option() {
        Some(uri) => fetch_collection(resource.client()?, uri).await,
        None => Ok(Collected::default()),
    }
}

/// Dereference a link array from `resource`.
pub async fn members_from<R: Resource, T: Resource>(
    resource: &R,
    links: &Links,
) -> Result<Collected<T>> {
    if links.is_empty() {
        return Ok(Collected::default());
    }
    Ok(fetch_members(resource.client()?, links.uris().to_vec()).await)
}

/// If-Match value for a resource: the response header, else `@odata.etag`.
pub(crate) fn etag_of<T: Resource>(resource: &T) -> Option<String> {
    resource
        .state()
        .etag()
        .map(str::to_string)
        .or_else(|| Some(resource.entity().odata_etag.clone()).filter(|e| !e.is_empty()))
}

pub(crate) fn set_etag<T: Resource>(resource: &mut T, etag: Option<String>) {
    resource.state_mut().etag = etag;
}

/// Drop the preserved body and ETag; the resource must be refreshed before
/// it can be diffed again.
pub(crate) fn mark_stale<T: Resource>(resource: &mut T) {
    let state = resource.state_mut();
    state.raw = None;
    state.etag = None;
}
