//! Chassis

use serde::{Deserialize, Serialize};

use super::{ComputerSystem, Manager, NetworkAdapter};
use crate::common::{nullable, ActionTarget, Entity, IndicatorLed, Link, Links, PowerState, ResetType, Status};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State, Writable};

#[derive(Debug, Clone, Default, Deserialize)]
struct ChassisLinks {
    #[serde(rename = "ComputerSystems", default)]
    computer_systems: Links,
    #[serde(rename = "ManagedBy", default)]
    managed_by: Links,
    #[serde(rename = "ContainedBy", default)]
    contained_by: Link,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChassisActions {
    #[serde(rename = "#Chassis.Reset", default)]
    reset: ActionTarget,
}

/// A physical enclosure: rack, blade, sled or card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "SKU", default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(rename = "IndicatorLED", default, skip_serializing_if = "Option::is_none")]
    pub indicator_led: Option<IndicatorLed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(default, skip_serializing)]
    network_adapters: Link,
    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: ChassisLinks,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: ChassisActions,

    #[serde(skip)]
    state: State,
}

impl Chassis {
    pub async fn computer_systems(&self) -> Result<Collected<ComputerSystem>> {
        resource::members_from(self, &self.link_block.computer_systems).await
    }

    pub async fn managed_by(&self) -> Result<Collected<Manager>> {
        resource::members_from(self, &self.link_block.managed_by).await
    }

    pub async fn contained_by(&self) -> Result<Option<Chassis>> {
        resource::follow_from(self, &self.link_block.contained_by).await
    }

    pub async fn network_adapters(&self) -> Result<Collected<NetworkAdapter>> {
        resource::collection_from(self, &self.network_adapters).await
    }

    pub async fn reset(&self, reset_type: ResetType) -> Result<()> {
        dispatch::check_allowed(&self.action_block.reset, "ResetType", reset_type.as_str())?;
        let params = serde_json::json!({ "ResetType": reset_type });
        dispatch::invoke(self, "Reset", &self.action_block.reset, &params).await?;
        Ok(())
    }
}

impl Resource for Chassis {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("NetworkAdapters", LinkRef::One(&self.network_adapters)),
            ("ComputerSystems", LinkRef::Many(&self.link_block.computer_systems)),
            ("ManagedBy", LinkRef::Many(&self.link_block.managed_by)),
            ("ContainedBy", LinkRef::One(&self.link_block.contained_by)),
        ]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![("Reset", &self.action_block.reset)]
    }
}

impl Writable for Chassis {
    const WRITABLE: &'static [&'static str] = &["AssetTag", "IndicatorLED"];
}
