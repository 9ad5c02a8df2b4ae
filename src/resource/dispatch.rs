//! Action Dispatch
//!
//! Invokes server-side verbs by POSTing a parameter object to the action
//! target discovered in the resource body.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Resource;
use crate::common::ActionTarget;
use crate::error::{Error, Result};
use crate::schemas::ActionInfo;
use crate::transport::{Client, Response};

/// Reject an empty required parameter before any network I/O.
pub fn require(parameter: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{} is required", parameter)));
    }
    Ok(())
}

/// Reject `value` if the action advertises allowable values for `parameter`
/// and `value` is not among them.
pub fn check_allowed(action: &ActionTarget, parameter: &str, value: &str) -> Result<()> {
    match action.allowable_values(parameter) {
        Some(allowed) if !allowed.iter().any(|v| v == value) => Err(Error::invalid_argument(
            format!("{} '{}' is not one of {:?}", parameter, value, allowed),
        )),
        _ => Ok(()),
    }
}

fn target<'a>(name: &'static str, action: &'a ActionTarget) -> Result<&'a str> {
    if action.is_empty() {
        return Err(Error::ActionUnsupported(name));
    }
    Ok(action.target())
}

/// Fire-and-forget: POST `params` to the action target of `resource`.
pub async fn invoke<R, P>(
    resource: &R,
    name: &'static str,
    action: &ActionTarget,
    params: &P,
) -> Result<Response>
where
    R: Resource,
    P: Serialize + ?Sized,
{
    let uri = target(name, action)?;
    let client = resource.client()?;
    tracing::info!("Invoking {} on {}", name, resource.odata_id());
    client.post(uri, params).await
}

/// POST `params` and decode the response body as `T`.
pub async fn invoke_for<R, P, T>(
    resource: &R,
    name: &'static str,
    action: &ActionTarget,
    params: &P,
) -> Result<T>
where
    R: Resource,
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = invoke(resource, name, action, params).await?;
    if response.is_empty() {
        return Err(Error::decode(format!("{} returned an empty body", name)));
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| Error::decode(format!("{} response: {}", name, e)))
}

/// Fetch the `ActionInfo` descriptor advertised by `action`, if any.
pub async fn action_info(client: &Client, action: &ActionTarget) -> Result<Option<ActionInfo>> {
    match action.action_info() {
        Some(uri) => Ok(Some(ActionInfo::get(client, uri).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_require() {
        assert!(require("NewPassword", "s3cret").is_ok());
        let err = require("PasswordName", "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);
        assert!(err.to_string().contains("PasswordName is required"));
    }

    #[test]
    fn test_check_allowed() {
        let action: ActionTarget = serde_json::from_value(json!({
            "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
            "ResetType@Redfish.AllowableValues": ["On", "ForceOff"]
        }))
        .unwrap();

        assert!(check_allowed(&action, "ResetType", "On").is_ok());
        assert!(check_allowed(&action, "ResetType", "Nmi").is_err());
        // Unconstrained parameters pass.
        assert!(check_allowed(&action, "Other", "anything").is_ok());
    }

    #[test]
    fn test_missing_target_is_unsupported() {
        let err = target("ResetBios", &ActionTarget::default()).unwrap_err();
        assert!(matches!(err, Error::ActionUnsupported("ResetBios")));
    }
}
