//! Hyperlinks and action targets
//!
//! Redfish interleaves hyperlinks and data in the same JSON object. Links are
//! decoded into plain URI holders here; nothing is fetched until a follower
//! asks for it.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `{"@odata.id": "<uri>"}` hyperlink. An empty URI means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Link(String);

impl Link {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The URI, or `None` when the link is absent.
    pub fn as_option(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            Some(&self.0)
        }
    }
}

fn link_from_value<E: de::Error>(value: Value) -> Result<Link, E> {
    match value {
        Value::Null => Ok(Link::default()),
        Value::String(uri) => Ok(Link(uri)),
        Value::Object(map) => match map.get("@odata.id") {
            Some(Value::String(uri)) => Ok(Link(uri.clone())),
            Some(Value::Null) | None => Ok(Link::default()),
            Some(other) => Err(E::custom(format!("@odata.id must be a string, got {}", other))),
        },
        other => Err(E::custom(format!("expected a link object, got {}", other))),
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        link_from_value(Value::deserialize(deserializer)?)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("@odata.id", &self.0)?;
        map.end()
    }
}

impl From<&str> for Link {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

/// An array of hyperlinks, `[{"@odata.id": …}, …]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<String>);

impl Links {
    pub fn uris(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::default()),
            Value::Array(items) => {
                let mut uris = Vec::with_capacity(items.len());
                for item in items {
                    let link: Link = link_from_value(item)?;
                    // Empty entries carry no target; keep the list dense.
                    if !link.is_empty() {
                        uris.push(link.0);
                    }
                }
                Ok(Self(uris))
            }
            other => Err(de::Error::custom(format!(
                "expected an array of links, got {}",
                other
            ))),
        }
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|uri| Link(uri.clone())))
    }
}

impl FromIterator<String> for Links {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The POST endpoint of a named server action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTarget {
    target: String,
    action_info: String,
    allowable_values: BTreeMap<String, Vec<String>>,
}

impl ActionTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// URI of the `ActionInfo` resource describing the parameters, if any.
    pub fn action_info(&self) -> Option<&str> {
        if self.action_info.is_empty() {
            None
        } else {
            Some(&self.action_info)
        }
    }

    /// Inline `<Parameter>@Redfish.AllowableValues` for `parameter`.
    pub fn allowable_values(&self, parameter: &str) -> Option<&[String]> {
        self.allowable_values.get(parameter).map(Vec::as_slice)
    }
}

const ALLOWABLE_SUFFIX: &str = "@Redfish.AllowableValues";

impl<'de> Deserialize<'de> for ActionTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(de::Error::custom(format!(
                    "expected an action object, got {}",
                    other
                )))
            }
        };

        let mut action = Self::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                ("target", Value::String(target)) => action.target = target,
                ("@Redfish.ActionInfo", Value::String(info)) => action.action_info = info,
                (key, Value::Array(values)) if key.ends_with(ALLOWABLE_SUFFIX) => {
                    let parameter = key.trim_end_matches(ALLOWABLE_SUFFIX).to_string();
                    let values = values
                        .into_iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    action.allowable_values.insert(parameter, values);
                }
                _ => {}
            }
        }
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_from_object() {
        let link: Link = serde_json::from_value(json!({"@odata.id": "/redfish/v1/Systems"})).unwrap();
        assert_eq!(link.uri(), "/redfish/v1/Systems");
        assert_eq!(link.as_option(), Some("/redfish/v1/Systems"));
    }

    #[test]
    fn test_link_from_string_and_null() {
        let link: Link = serde_json::from_value(json!("/redfish/v1/Chassis/1")).unwrap();
        assert_eq!(link.uri(), "/redfish/v1/Chassis/1");

        let link: Link = serde_json::from_value(Value::Null).unwrap();
        assert!(link.is_empty());
        assert_eq!(link.as_option(), None);
    }

    #[test]
    fn test_link_rejects_numbers() {
        assert!(serde_json::from_value::<Link>(json!(12)).is_err());
        assert!(serde_json::from_value::<Link>(json!({"@odata.id": 12})).is_err());
    }

    #[test]
    fn test_link_serializes_as_object() {
        let value = serde_json::to_value(Link::new("/redfish/v1/Managers/1")).unwrap();
        assert_eq!(value, json!({"@odata.id": "/redfish/v1/Managers/1"}));
    }

    #[test]
    fn test_links_array() {
        let links: Links = serde_json::from_value(json!([
            {"@odata.id": "/redfish/v1/Chassis/1"},
            {},
            {"@odata.id": "/redfish/v1/Chassis/2"}
        ]))
        .unwrap();
        assert_eq!(links.uris(), ["/redfish/v1/Chassis/1", "/redfish/v1/Chassis/2"]);
    }

    #[test]
    fn test_action_target() {
        let action: ActionTarget = serde_json::from_value(json!({
            "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
            "@Redfish.ActionInfo": "/redfish/v1/Systems/1/ResetActionInfo",
            "ResetType@Redfish.AllowableValues": ["On", "ForceOff"]
        }))
        .unwrap();

        assert_eq!(
            action.target(),
            "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
        );
        assert_eq!(
            action.action_info(),
            Some("/redfish/v1/Systems/1/ResetActionInfo")
        );
        assert_eq!(
            action.allowable_values("ResetType").unwrap(),
            ["On".to_string(), "ForceOff".to_string()]
        );
        assert!(action.allowable_values("Other").is_none());
    }
}
