//! ComputerSystem

use serde::{Deserialize, Serialize};

use super::{Bios, Chassis, Manager, Processor};
use crate::common::{nullable, number, ActionTarget, Entity, IndicatorLed, Link, Links, PowerState, ResetType, Status};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State, Writable};

/// Boot source override settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    /// `Disabled`, `Once` or `Continuous`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_source_override_enabled: Option<String>,
    /// `None`, `Pxe`, `Hdd`, `Cd`, `BiosSetup`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_source_override_target: Option<String>,
    /// `Legacy` or `UEFI`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_source_override_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    #[serde(default, deserialize_with = "number::lenient_option")]
    pub count: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemorySummary {
    #[serde(
        rename = "TotalSystemMemoryGiB",
        default,
        deserialize_with = "number::lenient_option"
    )]
    pub total_system_memory_gib: Option<f64>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SystemLinks {
    #[serde(rename = "Chassis", default)]
    chassis: Links,
    #[serde(rename = "ManagedBy", default)]
    managed_by: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SystemActions {
    #[serde(rename = "#ComputerSystem.Reset", default)]
    reset: ActionTarget,
}

/// A server as the operating system sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
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
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
    #[serde(rename = "IndicatorLED", default, skip_serializing_if = "Option::is_none")]
    pub indicator_led: Option<IndicatorLed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<Boot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_summary: Option<ProcessorSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_summary: Option<MemorySummary>,

    #[serde(default, skip_serializing)]
    bios: Link,
    #[serde(default, skip_serializing)]
    processors: Link,
    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: SystemLinks,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: SystemActions,

    #[serde(skip)]
    state: State,
}

impl ComputerSystem {
    pub async fn bios(&self) -> Result<Option<Bios>> {
        resource::follow_from(self, &self.bios).await
    }

    pub async fn processors(&self) -> Result<Collected<Processor>> {
        resource::collection_from(self, &self.processors).await
    }

    pub async fn chassis(&self) -> Result<Collected<Chassis>> {
        resource::members_from(self, &self.link_block.chassis).await
    }

    pub async fn managed_by(&self) -> Result<Collected<Manager>> {
        resource::members_from(self, &self.link_block.managed_by).await
    }

    /// Reset the system. Checked against the advertised `ResetType` values.
    pub async fn reset(&self, reset_type: ResetType) -> Result<()> {
        dispatch::check_allowed(&self.action_block.reset, "ResetType", reset_type.as_str())?;
        let params = serde_json::json!({ "ResetType": reset_type });
        dispatch::invoke(self, "Reset", &self.action_block.reset, &params).await?;
        Ok(())
    }

    /// Reset types the service advertises inline, if any.
    pub fn supported_reset_types(&self) -> Option<&[String]> {
        self.action_block.reset.allowable_values("ResetType")
    }
}

impl Resource for ComputerSystem {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("Bios", LinkRef::One(&self.bios)),
            ("Processors", LinkRef::One(&self.processors)),
            ("Chassis", LinkRef::Many(&self.link_block.chassis)),
            ("ManagedBy", LinkRef::Many(&self.link_block.managed_by)),
        ]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![("Reset", &self.action_block.reset)]
    }
}

impl Writable for ComputerSystem {
    const WRITABLE: &'static [&'static str] = &["AssetTag", "HostName", "IndicatorLED", "Boot"];
}
