//! `@Message.ExtendedInfo` entries and the Redfish error payload

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::nullable;

/// One entry of a `@Message.ExtendedInfo` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub message_id: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub message_args: Vec<String>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub related_properties: Vec<String>,
}

/// Decoded `{"error": {...}}` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub extended_info: Vec<Message>,
}

const EXTENDED_INFO: &str = "@Message.ExtendedInfo";

fn messages(value: Option<&Value>) -> Vec<Message> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

impl ErrorBody {
    /// Parse an error body; `None` when it is not JSON at all.
    ///
    /// Some services put `@Message.ExtendedInfo` at the top level rather than
    /// under `error`; both are accepted.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let error = value.get("error");

        let text = |key: &str| {
            error
                .and_then(|e| e.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let mut extended_info = messages(error.and_then(|e| e.get(EXTENDED_INFO)));
        if extended_info.is_empty() {
            extended_info = messages(value.get(EXTENDED_INFO));
        }

        Some(Self {
            code: text("code"),
            message: text("message"),
            extended_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_body() {
        let body = br#"{"error": {
            "code": "Base.1.8.GeneralError",
            "message": "A general error has occurred.",
            "@Message.ExtendedInfo": [{
                "MessageId": "Base.1.8.PropertyValueNotInList",
                "Message": "The value Foo for the property IndicatorLED is not in the list of acceptable values.",
                "MessageArgs": ["Foo", "IndicatorLED"],
                "Severity": "Warning",
                "Resolution": "Choose a value from the enumeration list."
            }]
        }}"#;

        let error = ErrorBody::parse(body).unwrap();
        assert_eq!(error.code.as_deref(), Some("Base.1.8.GeneralError"));
        assert_eq!(error.extended_info.len(), 1);
        let info = &error.extended_info[0];
        assert_eq!(info.message_id, "Base.1.8.PropertyValueNotInList");
        assert_eq!(info.message_args, ["Foo", "IndicatorLED"]);
        assert_eq!(info.severity.as_deref(), Some("Warning"));
    }

    #[test]
    fn test_top_level_extended_info() {
        let body = br#"{"@Message.ExtendedInfo": [{"MessageId": "Base.1.0.Success", "Message": "ok"}]}"#;
        let error = ErrorBody::parse(body).unwrap();
        assert_eq!(error.code, None);
        assert_eq!(error.extended_info[0].message_id, "Base.1.0.Success");
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(ErrorBody::parse(b"<html>Bad Gateway</html>"), None);
    }
}
