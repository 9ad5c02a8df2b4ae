//! BIOS attributes and the pending-settings object

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::{nullable, number, ActionTarget, ApplyTime, Entity, Settings};
use crate::error::{Error, Result};
use crate::resource::{dispatch, LinkRef, Resource, State, Writable};

#[derive(Debug, Clone, Default, Deserialize)]
struct BiosActions {
    #[serde(rename = "#Bios.ChangePassword", default)]
    change_password: ActionTarget,
    #[serde(rename = "#Bios.ResetBios", default)]
    reset_bios: ActionTarget,
}

/// BIOS configuration of a computer system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bios {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_registry: Option<String>,
    /// Vendor-defined attribute names to string, number or boolean values.
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub attributes: Map<String, Value>,
    #[serde(
        rename = "@Redfish.Settings",
        default,
        skip_serializing
    )]
    pub settings: Option<Settings>,

    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: BiosActions,

    #[serde(skip)]
    state: State,
}

impl Bios {
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Integer attribute; numeric strings are accepted.
    pub fn attribute_int(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(number::parse)
    }

    pub fn attribute_bool(&self, name: &str) -> Option<bool> {
        self.attributes.get(name).and_then(Value::as_bool)
    }

    /// The pending-settings resource, if the service advertises one.
    pub async fn pending(&self) -> Result<Option<Bios>> {
        match self.settings.as_ref().and_then(Settings::uri) {
            Some(uri) => Ok(Some(Bios::get(self.client()?, uri).await?)),
            None => Ok(None),
        }
    }

    /// Change a BIOS password. All three parameters are required.
    pub async fn change_password(
        &self,
        password_name: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        dispatch::require("PasswordName", password_name)?;
        dispatch::require("OldPassword", old_password)?;
        dispatch::require("NewPassword", new_password)?;

        let params = serde_json::json!({
            "PasswordName": password_name,
            "OldPassword": old_password,
            "NewPassword": new_password,
        });
        dispatch::invoke(self, "ChangePassword", &self.action_block.change_password, &params)
            .await?;
        Ok(())
    }

    /// Reset all attributes to their defaults. Usually takes effect on the
    /// next system reset.
    pub async fn reset_bios(&self) -> Result<()> {
        dispatch::invoke(
            self,
            "ResetBios",
            &self.action_block.reset_bios,
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    /// Write `attributes` to the settings object, asking the service to apply
    /// them at `apply_time`. The apply time must be one the service lists in
    /// `SupportedApplyTimes`; that is checked before any request is made.
    pub async fn update_attributes(
        &self,
        attributes: Map<String, Value>,
        apply_time: Option<ApplyTime>,
    ) -> Result<()> {
        if attributes.is_empty() {
            return Ok(());
        }

        let count = attributes.len();
        let mut body = Map::new();
        body.insert("Attributes".to_string(), Value::Object(attributes));

        if let Some(apply_time) = apply_time {
            let supported = self.settings.as_ref().map_or(true, |s| s.supports(apply_time));
            if !supported {
                return Err(Error::invalid_argument(format!(
                    "apply time {} is not supported by {}",
                    apply_time.as_str(),
                    self.odata_id()
                )));
            }
            body.insert(
                "@Redfish.SettingsApplyTime".to_string(),
                serde_json::json!({ "ApplyTime": apply_time.as_str() }),
            );
        }

        let etag = self
            .settings
            .as_ref()
            .map(|s| s.etag.as_str())
            .filter(|e| !e.is_empty());

        tracing::info!("Updating {} BIOS attributes on {}", count, self.patch_uri());
        self.client()?.patch(self.patch_uri(), &body, etag).await?;
        Ok(())
    }
}

impl Resource for Bios {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        match &self.settings {
            Some(settings) => vec![("SettingsObject", LinkRef::One(&settings.settings_object))],
            None => Vec::new(),
        }
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![
            ("ChangePassword", &self.action_block.change_password),
            ("ResetBios", &self.action_block.reset_bios),
        ]
    }
}

impl Writable for Bios {
    const WRITABLE: &'static [&'static str] = &["Attributes"];
    const KEYED: &'static [&'static str] = &["Attributes"];

    /// Changes go to the settings object when there is one.
    fn patch_uri(&self) -> &str {
        self.settings
            .as_ref()
            .and_then(Settings::uri)
            .unwrap_or_else(|| self.odata_id())
    }

    fn patch_etag(&self) -> Option<String> {
        match &self.settings {
            Some(settings) if settings.uri().is_some() => {
                Some(settings.etag.clone()).filter(|e| !e.is_empty())
            }
            _ => crate::resource::etag_of(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resource::changes;
    use crate::transport::{Client, ClientConfig};
    use serde_json::json;

    const BODY: &str = r##"{
        "@odata.id": "/redfish/v1/Systems/1/Bios",
        "@odata.type": "#Bios.v1_0_6.Bios",
        "Id": "BIOS",
        "Name": "BIOS Configuration Current Settings",
        "AttributeRegistry": "BiosAttributeRegistryP89.v1_0_0",
        "Attributes": {"AdminPhone": "", "BootMode": "Uefi", "ProcCoreDisable": "0", "UsbControl": true},
        "@Redfish.Settings": {
            "@odata.type": "#Settings.v1_3_0.Settings",
            "ETag": "9234ac83b9700123cc32",
            "SettingsObject": {"@odata.id": "/redfish/v1/Systems/1/Bios/Settings"},
            "SupportedApplyTimes": ["OnReset"]
        },
        "Actions": {
            "#Bios.ResetBios": {"target": "/redfish/v1/Systems/1/Bios/Actions/Bios.ResetBios"},
            "#Bios.ChangePassword": {"target": "/redfish/v1/Systems/1/Bios/Actions/Bios.ChangePassword"}
        }
    }"##;

    fn attached() -> Bios {
        // Port 9 is never contacted by these tests.
        let client = Client::new(ClientConfig::new("http://127.0.0.1:9").without_auth()).unwrap();
        Bios::decode(BODY.into(), Some(client)).unwrap()
    }

    #[test]
    fn test_decode_bios() {
        let bios = Bios::decode(BODY.into(), None).unwrap();
        assert_eq!(bios.attribute_str("BootMode"), Some("Uefi"));
        assert_eq!(bios.attribute_int("ProcCoreDisable"), Some(0));
        assert_eq!(bios.attribute_bool("UsbControl"), Some(true));
        assert_eq!(bios.patch_uri(), "/redfish/v1/Systems/1/Bios/Settings");
        assert_eq!(
            bios.actions()[0].1.target(),
            "/redfish/v1/Systems/1/Bios/Actions/Bios.ChangePassword"
        );
    }

    #[test]
    fn test_attribute_change_is_detected() {
        let mut bios = Bios::decode(BODY.into(), None).unwrap();
        bios.attributes.insert("BootMode".to_string(), json!("LegacyBios"));
        assert_eq!(
            Value::Object(changes(&bios).unwrap()),
            json!({"Attributes": {"BootMode": "LegacyBios"}})
        );
    }

    #[tokio::test]
    async fn test_change_password_rejects_empty_name_locally() {
        let bios = attached();
        let err = bios.change_password("", "old", "new").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);
    }

    #[tokio::test]
    async fn test_unsupported_apply_time_rejected_locally() {
        let bios = attached();
        let mut attributes = Map::new();
        attributes.insert("BootMode".to_string(), json!("LegacyBios"));
        let err = bios
            .update_attributes(attributes, Some(ApplyTime::Immediate))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);
    }

    #[tokio::test]
    async fn test_empty_attribute_update_is_a_no_op() {
        let bios = attached();
        assert!(bios.update_attributes(Map::new(), None).await.is_ok());
    }
}
