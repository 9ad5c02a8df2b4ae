//! Processor

use serde::{Deserialize, Serialize};

use crate::common::{number, Entity, Status};
use crate::resource::{Resource, State};

/// A CPU socket. Read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Processor {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "MaxSpeedMHz", default, deserialize_with = "number::lenient")]
    pub max_speed_mhz: u32,
    #[serde(default, deserialize_with = "number::lenient")]
    pub total_cores: u32,
    #[serde(default, deserialize_with = "number::lenient")]
    pub total_threads: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip)]
    state: State,
}

impl Resource for Processor {
    resource_accessors!();
}
