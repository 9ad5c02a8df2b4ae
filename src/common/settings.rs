//! `@Redfish.Settings`: where pending changes to a resource are written

use serde::{Deserialize, Serialize};

use super::link::Link;
use super::message::Message;
use super::nullable;

/// When the service applies a pending settings change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplyTime {
    Immediate,
    OnReset,
    AtMaintenanceWindowStart,
    InMaintenanceWindowOnReset,
}

impl ApplyTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::OnReset => "OnReset",
            Self::AtMaintenanceWindowStart => "AtMaintenanceWindowStart",
            Self::InMaintenanceWindowOnReset => "InMaintenanceWindowOnReset",
        }
    }
}

/// Settings container attached to a writable resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(rename = "ETag", default, deserialize_with = "nullable::or_default")]
    pub etag: String,
    #[serde(default)]
    pub settings_object: Link,
    /// Unknown apply times are skipped rather than failing the decode.
    #[serde(default, deserialize_with = "known_apply_times")]
    pub supported_apply_times: Vec<ApplyTime>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub messages: Vec<Message>,
}

impl Settings {
    /// URI at which pending changes are PATCHed.
    pub fn uri(&self) -> Option<&str> {
        self.settings_object.as_option()
    }

    /// Whether `apply_time` is acceptable. An empty advertised list accepts
    /// anything, since the service did not constrain it.
    pub fn supports(&self, apply_time: ApplyTime) -> bool {
        self.supported_apply_times.is_empty() || self.supported_apply_times.contains(&apply_time)
    }
}

fn known_apply_times<'de, D>(deserializer: D) -> Result<Vec<ApplyTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_decode() {
        let settings: Settings = serde_json::from_value(json!({
            "@odata.type": "#Settings.v1_3_0.Settings",
            "ETag": "A89B031B62",
            "SettingsObject": {"@odata.id": "/redfish/v1/Systems/1/Bios/Settings"},
            "SupportedApplyTimes": ["OnReset", "AtMaintenanceWindowStart", "Whenever"],
            "Time": "2024-03-01T08:00:00Z"
        }))
        .unwrap();

        assert_eq!(settings.uri(), Some("/redfish/v1/Systems/1/Bios/Settings"));
        assert_eq!(settings.etag, "A89B031B62");
        assert_eq!(
            settings.supported_apply_times,
            vec![ApplyTime::OnReset, ApplyTime::AtMaintenanceWindowStart]
        );
        assert!(settings.supports(ApplyTime::OnReset));
        assert!(!settings.supports(ApplyTime::Immediate));
    }

    #[test]
    fn test_unconstrained_settings_accept_anything() {
        let settings = Settings::default();
        assert!(settings.supports(ApplyTime::Immediate));
        assert_eq!(settings.uri(), None);
    }
}
