//! Collection Fetcher
//!
//! Follows a collection URI (and its `Members@odata.nextLink` pages) to a flat
//! list of member URIs, then fetches the members in parallel with a bounded
//! fan-out. A failing member never voids the others.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Deserialize;

use super::{fetch, Resource};
use crate::cancel::CancelToken;
use crate::common::number;
use crate::common::Links;
use crate::error::{CollectionFailures, Error, Result};
use crate::transport::Client;

/// Delay between retries of a failing member GET.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// One page of a collection body.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(rename = "Members", default)]
    members: Links,
    #[serde(
        rename = "Members@odata.count",
        default,
        deserialize_with = "number::lenient_option"
    )]
    count: Option<u64>,
    #[serde(rename = "Members@odata.nextLink", default)]
    next_link: Option<String>,
}

/// Member URIs of a collection across all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionIndex {
    pub members: Vec<String>,
    /// `Members@odata.count` as reported on the first page. Advisory only;
    /// `members.len()` is authoritative.
    pub reported_count: Option<u64>,
}

impl CollectionIndex {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of dereferencing a collection.
#[derive(Debug)]
pub struct Collected<T> {
    /// Successfully fetched members, in completion order.
    pub members: Vec<T>,
    pub failures: CollectionFailures,
    /// `Members@odata.count` from the service, when the source was a collection.
    pub reported_count: Option<u64>,
    /// The caller cancelled before every member was fetched.
    pub cancelled: bool,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            failures: CollectionFailures::default(),
            reported_count: None,
            cancelled: false,
        }
    }
}

impl<T> Collected<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members plus the aggregate error, if any. Successful members are kept
    /// either way.
    pub fn into_parts(self) -> (Vec<T>, Option<Error>) {
        let error = if self.cancelled {
            Some(Error::Cancelled)
        } else if !self.failures.is_empty() {
            Some(Error::CollectionPartial(self.failures))
        } else {
            None
        };
        (self.members, error)
    }

    /// All members, or the aggregate error if anything failed.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.into_parts() {
            (members, None) => Ok(members),
            (_, Some(error)) => Err(error),
        }
    }
}

impl<T: Resource> Collected<T> {
    /// Sort members by `@odata.id` for a deterministic order.
    pub fn sort_by_id(&mut self) {
        self.members
            .sort_by(|a, b| a.entity().odata_id.cmp(&b.entity().odata_id));
    }
}

/// Walk every page of the collection at `uri` and return its member URIs.
pub async fn collect_uris(client: &Client, uri: &str) -> Result<CollectionIndex> {
    let mut index = CollectionIndex::default();
    let mut seen = HashSet::new();
    let mut next = Some(uri.to_string());
    let mut first = true;

    while let Some(page_uri) = next.take() {
        if !seen.insert(page_uri.clone()) {
            tracing::warn!("Collection {} repeats next link {}, stopping", uri, page_uri);
            break;
        }

        let response = client.get(&page_uri).await?;
        let page: Page = serde_json::from_slice(&response.body)
            .map_err(|e| Error::decode(format!("collection {}: {}", page_uri, e)))?;

        if first {
            index.reported_count = page.count;
            first = false;
        }
        index
            .members
            .extend(page.members.uris().iter().cloned());
        next = page.next_link.filter(|link| !link.is_empty());
    }

    if let Some(count) = index.reported_count {
        if count as usize != index.members.len() {
            tracing::debug!(
                "Collection {} reports {} members but lists {}",
                uri,
                count,
                index.members.len()
            );
        }
    }

    Ok(index)
}

/// Dereference the collection at `uri` into typed members.
pub async fn fetch_collection<T: Resource>(client: &Client, uri: &str) -> Result<Collected<T>> {
    fetch_collection_with(client, uri, &CancelToken::never()).await
}

/// Like [`fetch_collection`], stopping early when `cancel` fires.
pub async fn fetch_collection_with<T: Resource>(
    client: &Client,
    uri: &str,
    cancel: &CancelToken,
) -> Result<Collected<T>> {
    let index = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        index = collect_uris(client, uri) => index?,
    };

    let mut collected = fetch_members_with(client, index.members, cancel).await;
    collected.reported_count = index.reported_count;
    Ok(collected)
}

/// Fetch `uris` as typed members with the client's fan-out.
pub async fn fetch_members<T: Resource>(client: &Client, uris: Vec<String>) -> Collected<T> {
    fetch_members_with(client, uris, &CancelToken::never()).await
}

/// Like [`fetch_members`], stopping early when `cancel` fires. In-flight
/// requests are dropped; whatever completed is returned.
pub async fn fetch_members_with<T: Resource>(
    client: &Client,
    uris: Vec<String>,
    cancel: &CancelToken,
) -> Collected<T> {
    let fan_out = client.config().fan_out.max(1);
    let retries = client.config().member_retries;
    let mut collected = Collected::default();

    tracing::debug!("Fetching {} members, fan-out {}", uris.len(), fan_out);

    let mut results = stream::iter(uris)
        .map(|uri| async move {
            let result = fetch_member::<T>(client, &uri, retries).await;
            (uri, result)
        })
        .buffer_unordered(fan_out);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Collection fetch cancelled after {} members", collected.members.len());
                collected.cancelled = true;
                break;
            }
            next = results.next() => match next {
                Some((_, Ok(member))) => collected.members.push(member),
                Some((uri, Err(err))) => {
                    tracing::debug!("Member {} failed: {}", uri, err);
                    collected.failures.insert(uri, err);
                }
                None => break,
            },
        }
    }

    collected
}

async fn fetch_member<T: Resource>(client: &Client, uri: &str, retries: u32) -> Result<T> {
    let mut attempt = 0;
    loop {
        match fetch::<T>(client, uri).await {
            Err(err) if attempt < retries && err.is_retryable() => {
                attempt += 1;
                tracing::debug!("Retrying {} (attempt {}): {}", uri, attempt, err);
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_page_decode() {
        let page: Page = serde_json::from_str(
            r#"{
                "Members": [{"@odata.id": "/redfish/v1/Systems/1"}],
                "Members@odata.count": "3",
                "Members@odata.nextLink": "/redfish/v1/Systems?$skip=1"
            }"#,
        )
        .unwrap();

        assert_eq!(page.members.uris(), ["/redfish/v1/Systems/1"]);
        assert_eq!(page.count, Some(3));
        assert_eq!(page.next_link.as_deref(), Some("/redfish/v1/Systems?$skip=1"));
    }

    #[test]
    fn test_empty_page() {
        let page: Page = serde_json::from_str(r#"{"Members": []}"#).unwrap();
        assert!(page.members.is_empty());
        assert_eq!(page.count, None);
        assert_eq!(page.next_link, None);
    }

    #[test]
    fn test_into_parts_keeps_members() {
        let mut collected: Collected<u32> = Collected {
            members: vec![1, 3],
            ..Default::default()
        };
        collected
            .failures
            .insert("/redfish/v1/Systems/2".to_string(), Error::decode("bad"));

        assert!(!collected.is_complete());
        let (members, error) = collected.into_parts();
        assert_eq!(members, vec![1, 3]);
        assert_eq!(error.unwrap().kind(), ErrorKind::CollectionPartial);
    }

    #[test]
    fn test_cancelled_takes_precedence() {
        let collected: Collected<u32> = Collected {
            members: vec![1],
            cancelled: true,
            ..Default::default()
        };
        assert!(matches!(collected.into_result(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_complete_into_result() {
        let collected: Collected<u32> = Collected {
            members: vec![7],
            ..Default::default()
        };
        assert_eq!(collected.into_result().unwrap(), vec![7]);
    }
}
