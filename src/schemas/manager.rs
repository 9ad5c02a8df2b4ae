//! Manager (the BMC itself)

use serde::{Deserialize, Serialize};

use super::{Chassis, ComputerSystem};
use crate::common::{nullable, ActionTarget, Entity, Links, PowerState, ResetType, Status};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State, Writable};

/// `ResetType` parameter of `Manager.ResetToDefaults`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetToDefaultsType {
    ResetAll,
    PreserveNetworkAndUsers,
    PreserveNetwork,
}

impl ResetToDefaultsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResetAll => "ResetAll",
            Self::PreserveNetworkAndUsers => "PreserveNetworkAndUsers",
            Self::PreserveNetwork => "PreserveNetwork",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ManagerLinks {
    #[serde(rename = "ManagerForServers", default)]
    manager_for_servers: Links,
    #[serde(rename = "ManagerForChassis", default)]
    manager_for_chassis: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ManagerActions {
    #[serde(rename = "#Manager.Reset", default)]
    reset: ActionTarget,
    #[serde(rename = "#Manager.ResetToDefaults", default)]
    reset_to_defaults: ActionTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
    #[serde(flatten)]
    pub entity: Entity,
    /// `BMC`, `EnclosureManager`, `ManagementController`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Kept as the service's string; some BMCs send non-RFC 3339 values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_local_offset: Option<String>,

    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: ManagerLinks,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: ManagerActions,

    #[serde(skip)]
    state: State,
}

impl Manager {
    pub async fn manager_for_servers(&self) -> Result<Collected<ComputerSystem>> {
        resource::members_from(self, &self.link_block.manager_for_servers).await
    }

    pub async fn manager_for_chassis(&self) -> Result<Collected<Chassis>> {
        resource::members_from(self, &self.link_block.manager_for_chassis).await
    }

    pub async fn reset(&self, reset_type: ResetType) -> Result<()> {
        dispatch::check_allowed(&self.action_block.reset, "ResetType", reset_type.as_str())?;
        let params = serde_json::json!({ "ResetType": reset_type });
        dispatch::invoke(self, "Reset", &self.action_block.reset, &params).await?;
        Ok(())
    }

    /// Reset the manager's configuration to factory defaults.
    pub async fn reset_to_defaults(&self, reset_type: ResetToDefaultsType) -> Result<()> {
        dispatch::check_allowed(
            &self.action_block.reset_to_defaults,
            "ResetType",
            reset_type.as_str(),
        )?;
        let params = serde_json::json!({ "ResetType": reset_type });
        dispatch::invoke(
            self,
            "ResetToDefaults",
            &self.action_block.reset_to_defaults,
            &params,
        )
        .await?;
        Ok(())
    }
}

impl Resource for Manager {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("ManagerForServers", LinkRef::Many(&self.link_block.manager_for_servers)),
            ("ManagerForChassis", LinkRef::Many(&self.link_block.manager_for_chassis)),
        ]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![
            ("Reset", &self.action_block.reset),
            ("ResetToDefaults", &self.action_block.reset_to_defaults),
        ]
    }
}

impl Writable for Manager {
    const WRITABLE: &'static [&'static str] = &["DateTime", "DateTimeLocalOffset"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const BODY: &str = r##"{
        "@odata.id": "/redfish/v1/Managers/BMC",
        "Id": "BMC",
        "ManagerType": "BMC",
        "FirmwareVersion": "1.00",
        "DateTime": "2015-03-13T04:14:33+06:00",
        "Links": {"ManagerForServers": [{"@odata.id": "/redfish/v1/Systems/437XR1138R2"}]},
        "Actions": {
            "#Manager.Reset": {
                "target": "/redfish/v1/Managers/BMC/Actions/Manager.Reset",
                "ResetType@Redfish.AllowableValues": ["ForceRestart", "GracefulRestart"]
            }
        }
    }"##;

    #[test]
    fn test_decode_manager() {
        let manager = Manager::decode(BODY.into(), None).unwrap();
        assert_eq!(manager.firmware_version.as_deref(), Some("1.00"));
        assert_eq!(manager.links()[0].1.uris(), ["/redfish/v1/Systems/437XR1138R2"]);
        assert!(manager.links()[1].1.is_empty());
    }

    #[tokio::test]
    async fn test_reset_to_defaults_not_advertised() {
        let manager = Manager::decode(BODY.into(), None).unwrap();
        let err = manager
            .reset_to_defaults(ResetToDefaultsType::ResetAll)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ActionUnsupported("ResetToDefaults")));
    }

    #[test]
    fn test_reset_to_defaults_serializes() {
        assert_eq!(
            serde_json::to_value(ResetToDefaultsType::PreserveNetwork).unwrap(),
            serde_json::json!("PreserveNetwork")
        );
    }
}
