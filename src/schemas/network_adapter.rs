//! NetworkAdapter

use serde::{Deserialize, Serialize};

use crate::common::{nullable, number, ActionTarget, Entity, Status};
use crate::error::Result;
use crate::resource::{dispatch, Resource, State};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControllerCapabilities {
    #[serde(default, deserialize_with = "number::lenient_option")]
    pub network_port_count: Option<u32>,
    #[serde(default, deserialize_with = "number::lenient_option")]
    pub network_device_function_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Controller {
    #[serde(default)]
    pub firmware_package_version: Option<String>,
    #[serde(default)]
    pub controller_capabilities: Option<ControllerCapabilities>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AdapterActions {
    #[serde(rename = "#NetworkAdapter.ResetSettingsToDefault", default)]
    reset_settings_to_default: ActionTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAdapter {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(rename = "SKU", default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub controllers: Vec<Controller>,

    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: AdapterActions,

    #[serde(skip)]
    state: State,
}

impl NetworkAdapter {
    pub async fn reset_settings_to_default(&self) -> Result<()> {
        dispatch::invoke(
            self,
            "ResetSettingsToDefault",
            &self.action_block.reset_settings_to_default,
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }
}

impl Resource for NetworkAdapter {
    resource_accessors!();

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![(
            "ResetSettingsToDefault",
            &self.action_block.reset_settings_to_default,
        )]
    }
}
