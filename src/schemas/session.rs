//! SessionService and Session

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::common::types::lenient_datetime;
use crate::common::{number, Entity, Link, Status};
use crate::error::Result;
use crate::resource::{self, Collected, LinkRef, Resource, State, Writable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionService {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    /// Idle timeout in seconds.
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(default, skip_serializing)]
    sessions: Link,

    #[serde(skip)]
    state: State,
}

impl SessionService {
    pub async fn sessions(&self) -> Result<Collected<Session>> {
        resource::collection_from(self, &self.sessions).await
    }
}

impl Resource for SessionService {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![("Sessions", LinkRef::One(&self.sessions))]
    }
}

impl Writable for SessionService {
    const WRITABLE: &'static [&'static str] = &["ServiceEnabled", "SessionTimeout"];
}

/// An open session. The token is only ever returned in the login response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
    #[serde(rename = "ClientOriginIPAddress", default, skip_serializing_if = "Option::is_none")]
    pub client_origin_ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<FixedOffset>>,

    #[serde(skip)]
    state: State,
}

impl Session {
    /// Close this session on the service.
    pub async fn delete(&self) -> Result<()> {
        tracing::info!("Deleting session {}", self.odata_id());
        self.client()?.delete(self.odata_id()).await?;
        Ok(())
    }
}

impl Resource for Session {
    resource_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::changes;

    #[test]
    fn test_decode_session_service() {
        let body = r#"{"@odata.id":"/redfish/v1/SessionService","Id":"SessionService",
            "ServiceEnabled":true,"SessionTimeout":"600",
            "Sessions":{"@odata.id":"/redfish/v1/SessionService/Sessions"}}"#;
        let mut service = SessionService::decode(body.into(), None).unwrap();
        assert_eq!(service.session_timeout, Some(600));
        assert_eq!(service.links()[0].1.uris(), ["/redfish/v1/SessionService/Sessions"]);

        // Both sides decode "600" the same way, so nothing is pending.
        assert!(changes(&service).unwrap().is_empty());
        service.session_timeout = Some(300);
        assert_eq!(changes(&service).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_session() {
        let body = r#"{"@odata.id":"/redfish/v1/SessionService/Sessions/1234","Id":"1234",
            "UserName":"Administrator","ClientOriginIPAddress":"10.0.0.7",
            "CreatedTime":"2024-01-15T09:30:00Z"}"#;
        let session = Session::decode(body.into(), None).unwrap();
        assert_eq!(session.user_name.as_deref(), Some("Administrator"));
        assert_eq!(session.client_origin_ip_address.as_deref(), Some("10.0.0.7"));
        assert!(session.created_time.is_some());
    }
}
