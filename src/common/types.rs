//! Small records and enumerations shared by many schemas

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// `Health` / `HealthRollup`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    OK,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

/// `Status.State`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
    Qualified,
    Degraded,
    #[serde(other)]
    Unknown,
}

/// Common `Status` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default)]
    pub state: Option<State>,
    #[serde(default)]
    pub health: Option<Health>,
    #[serde(default)]
    pub health_rollup: Option<Health>,
}

/// Power state of a system, chassis or manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
    #[serde(other)]
    Unknown,
}

/// `IndicatorLED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorLed {
    Lit,
    Blinking,
    Off,
    #[serde(other)]
    Unknown,
}

/// `ResetType` parameter of the various `Reset` actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
    PowerCycle,
    Suspend,
    Pause,
    Resume,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "On",
            Self::ForceOff => "ForceOff",
            Self::GracefulShutdown => "GracefulShutdown",
            Self::GracefulRestart => "GracefulRestart",
            Self::ForceRestart => "ForceRestart",
            Self::Nmi => "Nmi",
            Self::ForceOn => "ForceOn",
            Self::PushPowerButton => "PushPowerButton",
            Self::PowerCycle => "PowerCycle",
            Self::Suspend => "Suspend",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
        }
    }
}

impl std::str::FromStr for ResetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown reset type: {}", s))
    }
}

/// Certificate issuer / subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Identifier {
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub organizational_unit: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `deserialize_with` helper: RFC 3339 timestamps, `None` when unparseable.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_decode_with_unknown_values() {
        let status: Status = serde_json::from_value(json!({
            "State": "Enabled",
            "Health": "Fabulous",
            "HealthRollup": "OK"
        }))
        .unwrap();

        assert_eq!(status.state, Some(State::Enabled));
        assert_eq!(status.health, Some(Health::Unknown));
        assert_eq!(status.health_rollup, Some(Health::OK));
    }

    #[test]
    fn test_reset_type_from_str() {
        assert_eq!("ForceRestart".parse::<ResetType>(), Ok(ResetType::ForceRestart));
        assert!("Explode".parse::<ResetType>().is_err());
        assert_eq!(ResetType::GracefulShutdown.as_str(), "GracefulShutdown");
    }

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, deserialize_with = "lenient_datetime")]
        at: Option<DateTime<FixedOffset>>,
    }

    #[test]
    fn test_lenient_datetime() {
        let s: Stamped = serde_json::from_value(json!({"at": "2024-05-01T10:00:00+02:00"})).unwrap();
        assert_eq!(s.at.unwrap().to_rfc3339(), "2024-05-01T10:00:00+02:00");

        let s: Stamped = serde_json::from_value(json!({"at": "yesterday"})).unwrap();
        assert!(s.at.is_none());

        let s: Stamped = serde_json::from_value(json!({"at": 17})).unwrap();
        assert!(s.at.is_none());
    }
}
