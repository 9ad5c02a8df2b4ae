//! The service root, `/redfish/v1/`

use serde::{Deserialize, Serialize};

use super::{
    AccountService, CertificateService, Chassis, ComputerSystem, Manager, Session,
    SessionService, UpdateService,
};
use crate::common::{nullable, Entity, Link};
use crate::error::Result;
use crate::resource::{self, Collected, LinkRef, Resource, State};

#[derive(Debug, Clone, Default, Deserialize)]
struct RootLinks {
    #[serde(rename = "Sessions", default)]
    sessions: Link,
}

/// Entry point of the resource graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub redfish_version: Option<String>,
    #[serde(rename = "UUID", default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default, skip_serializing)]
    systems: Link,
    #[serde(default, skip_serializing)]
    chassis: Link,
    #[serde(default, skip_serializing)]
    managers: Link,
    #[serde(default, skip_serializing)]
    account_service: Link,
    #[serde(default, skip_serializing)]
    session_service: Link,
    #[serde(default, skip_serializing)]
    certificate_service: Link,
    #[serde(default, skip_serializing)]
    update_service: Link,
    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: RootLinks,

    #[serde(skip)]
    state: State,
}

impl Resource for ServiceRoot {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("Systems", LinkRef::One(&self.systems)),
            ("Chassis", LinkRef::One(&self.chassis)),
            ("Managers", LinkRef::One(&self.managers)),
            ("AccountService", LinkRef::One(&self.account_service)),
            ("SessionService", LinkRef::One(&self.session_service)),
            ("CertificateService", LinkRef::One(&self.certificate_service)),
            ("UpdateService", LinkRef::One(&self.update_service)),
            ("Sessions", LinkRef::One(&self.link_block.sessions)),
        ]
    }
}

impl ServiceRoot {
    pub async fn systems(&self) -> Result<Collected<ComputerSystem>> {
        resource::collection_from(self, &self.systems).await
    }

    pub async fn chassis(&self) -> Result<Collected<Chassis>> {
        resource::collection_from(self, &self.chassis).await
    }

    pub async fn managers(&self) -> Result<Collected<Manager>> {
        resource::collection_from(self, &self.managers).await
    }

    pub async fn account_service(&self) -> Result<Option<AccountService>> {
        resource::follow_from(self, &self.account_service).await
    }

    pub async fn session_service(&self) -> Result<Option<SessionService>> {
        resource::follow_from(self, &self.session_service).await
    }

    pub async fn certificate_service(&self) -> Result<Option<CertificateService>> {
        resource::follow_from(self, &self.certificate_service).await
    }

    pub async fn update_service(&self) -> Result<Option<UpdateService>> {
        resource::follow_from(self, &self.update_service).await
    }

    /// Active sessions, from `Links.Sessions`.
    pub async fn sessions(&self) -> Result<Collected<Session>> {
        resource::collection_from(self, &self.link_block.sessions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r##"{
        "@odata.id": "/redfish/v1/",
        "@odata.type": "#ServiceRoot.v1_5_0.ServiceRoot",
        "Id": "RootService",
        "Name": "Root Service",
        "RedfishVersion": "1.6.0",
        "UUID": "92384634-2938-2342-8820-489239905423",
        "Systems": {"@odata.id": "/redfish/v1/Systems"},
        "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
        "AccountService": {"@odata.id": "/redfish/v1/AccountService"},
        "Links": {"Sessions": {"@odata.id": "/redfish/v1/SessionService/Sessions"}}
    }"##;

    #[test]
    fn test_decode_service_root() {
        let root = ServiceRoot::decode(BODY.into(), None).unwrap();
        assert_eq!(root.redfish_version.as_deref(), Some("1.6.0"));
        assert_eq!(root.entity.schema(), "ServiceRoot");

        let links = root.links();
        let uri = |name: &str| {
            links
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| l.uris())
                .unwrap()
        };
        assert_eq!(uri("Systems"), ["/redfish/v1/Systems"]);
        assert_eq!(uri("Sessions"), ["/redfish/v1/SessionService/Sessions"]);
        assert!(uri("Managers").is_empty());
    }

    #[tokio::test]
    async fn test_empty_link_follows_to_none_without_client() {
        let root = ServiceRoot::decode(BODY.into(), None).unwrap();
        // No UpdateService link: absent, not an error, even when detached.
        assert!(root.update_service().await.unwrap().is_none());
        assert!(root.managers().await.unwrap().is_empty());
    }
}
