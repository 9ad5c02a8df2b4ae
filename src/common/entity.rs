//! Identity fields carried by every Redfish resource

use serde::{Deserialize, Serialize};

use super::nullable;

/// `Id`, `Name`, `Description` and the OData annotations.
///
/// `@odata.id` is the canonical identity of a resource: two decoded resources
/// with the same `odata_id` name the same server-side object, even if their
/// representations differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "Id", default, deserialize_with = "nullable::or_default")]
    pub id: String,
    #[serde(rename = "Name", default, deserialize_with = "nullable::or_default")]
    pub name: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@odata.id", default, deserialize_with = "nullable::or_default")]
    pub odata_id: String,
    #[serde(
        rename = "@odata.type",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub odata_type: String,
    #[serde(
        rename = "@odata.context",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub odata_context: String,
    #[serde(
        rename = "@odata.etag",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub odata_etag: String,
}

impl Entity {
    /// Schema name without namespace or version, e.g. `Bios` for
    /// `#Bios.v1_0_6.Bios`.
    pub fn schema(&self) -> &str {
        self.odata_type
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .trim_start_matches('#')
    }
}
