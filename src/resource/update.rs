//! Diff-and-PATCH for writable resources
//!
//! A PATCH carries only the allowlisted properties whose current value
//! differs from the value in the preserved server response. Services reject
//! read-only properties even when the value is unchanged, so nothing else is
//! ever sent.

use serde_json::{Map, Value};

use super::{decode, etag_of, mark_stale, set_etag, Resource};
use crate::error::{Error, Result};

/// A resource with properties the service accepts in a PATCH.
pub trait Writable: Resource {
    /// Property names (JSON spelling) that may be PATCHed.
    const WRITABLE: &'static [&'static str];

    /// Writable properties that are free-form maps (BIOS `Attributes`). Only
    /// their changed keys are sent, never the whole map.
    const KEYED: &'static [&'static str] = &[];

    /// URI the PATCH is sent to.
    fn patch_uri(&self) -> &str {
        self.odata_id()
    }

    /// `If-Match` value sent with the PATCH.
    fn patch_etag(&self) -> Option<String> {
        etag_of(self)
    }
}

/// Allowlisted top-level properties of `current` that differ from `original`.
///
/// Values compare structurally: arrays element-wise in order, objects by
/// field. A changed nested object is emitted whole.
pub fn diff(current: &Value, original: &Value, writable: &[&str]) -> Map<String, Value> {
    diff_keyed(current, original, writable, &[])
}

/// Like [`diff`], but properties named in `keyed` are compared one level
/// deeper and only their changed keys are emitted. A key removed locally is
/// sent as `null`.
pub fn diff_keyed(
    current: &Value,
    original: &Value,
    writable: &[&str],
    keyed: &[&str],
) -> Map<String, Value> {
    let mut patch = Map::new();
    for name in writable {
        let now = current.get(*name).unwrap_or(&Value::Null);
        let before = original.get(*name).unwrap_or(&Value::Null);
        if now == before {
            continue;
        }
        let value = match (now, before) {
            (Value::Object(now), Value::Object(before)) if keyed.contains(name) => {
                Value::Object(changed_keys(now, before))
            }
            _ => now.clone(),
        };
        patch.insert((*name).to_string(), value);
    }
    patch
}

fn changed_keys(now: &Map<String, Value>, before: &Map<String, Value>) -> Map<String, Value> {
    let mut changed: Map<String, Value> = now
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for key in before.keys() {
        if !now.contains_key(key) {
            changed.insert(key.clone(), Value::Null);
        }
    }
    changed
}

/// The PATCH body `update` would send, without sending it.
pub fn changes<T: Writable>(resource: &T) -> Result<Map<String, Value>> {
    let raw = resource
        .state()
        .raw()
        .ok_or_else(|| Error::StateNotFetched(resource.odata_id().to_string()))?;

    let original: T = serde_json::from_slice(raw)?;
    let current = serde_json::to_value(resource)?;
    let original = serde_json::to_value(&original)?;

    Ok(diff_keyed(&current, &original, T::WRITABLE, T::KEYED))
}

/// Send the changed writable properties of `resource` to the service.
///
/// Returns `false` without any network I/O when nothing changed. On success
/// the resource is re-decoded from the server's post-PATCH representation,
/// so a second call diffs against the new state.
///
/// If the PATCH succeeds but the follow-up GET or decode fails, this still
/// returns `true`. The resource keeps its local values but loses its preserved body,
/// so further updates fail with state-not-fetched until
/// [`Resource::refresh`] succeeds.
pub async fn update<T: Writable>(resource: &mut T) -> Result<bool> {
    let patch = changes(resource)?;
    if patch.is_empty() {
        tracing::debug!("No changes to {}", resource.odata_id());
        return Ok(false);
    }

    let client = resource.client()?.clone();
    let uri = resource.patch_uri().to_string();
    let etag = resource.patch_etag();

    tracing::debug!(
        "Patching {} with {:?}",
        uri,
        patch.keys().collect::<Vec<_>>()
    );
    let response = client.patch(&uri, &patch, etag.as_deref()).await?;

    let has_representation = response
        .json()
        .ok()
        .and_then(|v| v.get("@odata.id").and_then(Value::as_str).map(|id| !id.is_empty()))
        .unwrap_or(false);

    let (body, etag) = if has_representation && uri == resource.odata_id() {
        let etag = response.etag().map(str::to_string);
        (response.body, etag)
    } else {
        // 204/202, or the PATCH went to a settings object: re-read ourselves.
        let own_uri = resource.odata_id().to_string();
        match client.get(&own_uri).await {
            Ok(response) => {
                let etag = response.etag().map(str::to_string);
                (response.body, etag)
            }
            Err(e) => {
                tracing::warn!("PATCH of {} applied but refresh failed: {}", own_uri, e);
                mark_stale(resource);
                return Ok(true);
            }
        }
    };

    match decode(body, Some(client)) {
        Ok(fresh) => {
            *resource = fresh;
            set_etag(resource, etag);
        }
        Err(e) => {
            tracing::warn!("PATCH of {} applied but the new body is unreadable: {}", uri, e);
            mark_stale(resource);
        }
    }
    Ok(true)
}
