//! Firmware update service and software inventory

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::common::types::lenient_datetime;
use crate::common::{nullable, number, ActionTarget, Entity, Link, Status};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State, Writable};
use crate::transport::Response;

/// Parameters of `UpdateService.SimpleUpdate`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleUpdate {
    #[serde(rename = "ImageURI")]
    pub image_uri: String,
    /// `HTTP`, `HTTPS`, `TFTP`, `SCP`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_protocol: Option<String>,
    /// Inventory URIs the image applies to. Empty lets the service decide.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl SimpleUpdate {
    pub fn new(image_uri: &str) -> Self {
        Self {
            image_uri: image_uri.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpdateActions {
    #[serde(rename = "#UpdateService.SimpleUpdate", default)]
    simple_update: ActionTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateService {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Where an image may be pushed directly with an HTTP POST.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_push_uri: Option<String>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_image_size_bytes: Option<u64>,

    #[serde(default, skip_serializing)]
    firmware_inventory: Link,
    #[serde(default, skip_serializing)]
    software_inventory: Link,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: UpdateActions,

    #[serde(skip)]
    state: State,
}

impl UpdateService {
    pub async fn firmware_inventory(&self) -> Result<Collected<SoftwareInventory>> {
        resource::collection_from(self, &self.firmware_inventory).await
    }

    pub async fn software_inventory(&self) -> Result<Collected<SoftwareInventory>> {
        resource::collection_from(self, &self.software_inventory).await
    }

    /// Ask the service to pull and apply an image. The returned response may
    /// carry a task monitor in `Location`.
    pub async fn simple_update(&self, update: &SimpleUpdate) -> Result<Response> {
        dispatch::require("ImageURI", &update.image_uri)?;
        if let Some(protocol) = &update.transfer_protocol {
            dispatch::check_allowed(&self.action_block.simple_update, "TransferProtocol", protocol)?;
        }
        dispatch::invoke(self, "SimpleUpdate", &self.action_block.simple_update, update).await
    }
}

impl Resource for UpdateService {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("FirmwareInventory", LinkRef::One(&self.firmware_inventory)),
            ("SoftwareInventory", LinkRef::One(&self.software_inventory)),
        ]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![("SimpleUpdate", &self.action_block.simple_update)]
    }
}

impl Writable for UpdateService {
    const WRITABLE: &'static [&'static str] = &["ServiceEnabled"];
}

/// One installed firmware or software component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoftwareInventory {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub updateable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_supported_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip)]
    state: State,
}

impl Resource for SoftwareInventory {
    resource_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const BODY: &str = r##"{
        "@odata.id": "/redfish/v1/UpdateService",
        "Id": "UpdateService",
        "ServiceEnabled": true,
        "HttpPushUri": "/redfish/v1/UpdateService/upload",
        "MaxImageSizeBytes": "33554432",
        "FirmwareInventory": {"@odata.id": "/redfish/v1/UpdateService/FirmwareInventory"},
        "Actions": {
            "#UpdateService.SimpleUpdate": {
                "target": "/redfish/v1/UpdateService/Actions/UpdateService.SimpleUpdate",
                "TransferProtocol@Redfish.AllowableValues": ["HTTP", "HTTPS"]
            }
        }
    }"##;

    #[test]
    fn test_decode_update_service() {
        let service = UpdateService::decode(BODY.into(), None).unwrap();
        assert_eq!(service.max_image_size_bytes, Some(33_554_432));
        assert_eq!(
            service.links()[0].1.uris(),
            ["/redfish/v1/UpdateService/FirmwareInventory"]
        );
        assert!(service.links()[1].1.is_empty());
    }

    #[test]
    fn test_simple_update_body() {
        let mut update = SimpleUpdate::new("https://images.example.com/bmc-2.1.bin");
        update.transfer_protocol = Some("HTTPS".to_string());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"ImageURI": "https://images.example.com/bmc-2.1.bin", "TransferProtocol": "HTTPS"})
        );
    }

    #[tokio::test]
    async fn test_simple_update_prevalidation() {
        let service = UpdateService::decode(BODY.into(), None).unwrap();

        let err = service.simple_update(&SimpleUpdate::new("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);

        let mut update = SimpleUpdate::new("tftp://10.0.0.1/image.bin");
        update.transfer_protocol = Some("TFTP".to_string());
        let err = service.simple_update(&update).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);
    }

    #[test]
    fn test_decode_inventory() {
        let body = r#"{"@odata.id":"/redfish/v1/UpdateService/FirmwareInventory/BMC",
            "Id":"BMC","Version":"1.45.455b66-rev4","Updateable":true,
            "ReleaseDate":"2023-02-28T00:00:00Z"}"#;
        let item = SoftwareInventory::decode(body.into(), None).unwrap();
        assert!(item.updateable);
        assert_eq!(item.version.as_deref(), Some("1.45.455b66-rev4"));
        assert!(item.release_date.is_some());
    }

    #[test]
    fn test_null_properties_decode_as_defaults() {
        let body = r#"{"@odata.id":"/redfish/v1/UpdateService/FirmwareInventory/BIOS",
            "Id":"BIOS","Version":null,"Updateable":null,"Actions":null}"#;
        let item = SoftwareInventory::decode(body.into(), None).unwrap();
        assert!(!item.updateable);
        assert!(item.version.is_none());

        let service = UpdateService::decode(
            r#"{"@odata.id":"/redfish/v1/UpdateService","Actions":null}"#.into(),
            None,
        )
        .unwrap();
        assert!(service.actions()[0].1.is_empty());
    }
}
