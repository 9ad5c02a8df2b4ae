//! ActionInfo: the parameter descriptor of an action

use serde::{Deserialize, Serialize};

use crate::common::{nullable, Entity};
use crate::resource::{Resource, State};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub required: bool,
    /// `Boolean`, `Number`, `NumberArray`, `Object`, `ObjectArray`, `String`, `StringArray`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_data_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowable_values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionInfo {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub parameters: Vec<Parameter>,

    #[serde(skip)]
    state: State,
}

impl ActionInfo {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the parameters the service requires.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    pub fn allowable_values(&self, name: &str) -> Option<&[String]> {
        self.parameter(name)
            .map(|p| p.allowable_values.as_slice())
            .filter(|values| !values.is_empty())
    }
}

impl Resource for ActionInfo {
    resource_accessors!();
}
