//! Certificates and the certificate service

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::common::types::lenient_datetime;
use crate::common::{nullable, number, ActionTarget, Entity, Identifier, Link, Links};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State};

/// Response of `GenerateCSR`, `Renew` and `Rekey`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CsrResponse {
    #[serde(rename = "CSRString", default, deserialize_with = "nullable::or_default")]
    pub csr_string: String,
    /// Collection the signed certificate should be installed into.
    #[serde(rename = "CertificateCollection", default)]
    pub certificate_collection: Link,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CertificateActions {
    #[serde(rename = "#Certificate.Renew", default)]
    renew: ActionTarget,
    #[serde(rename = "#Certificate.Rekey", default)]
    rekey: ActionTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub certificate_string: String,
    /// `PEM`, `PEMchain` or `PKCS7`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Identifier>,
    #[serde(default, deserialize_with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub valid_not_before: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub valid_not_after: Option<DateTime<FixedOffset>>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub key_usage: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_hash_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_algorithm: Option<String>,

    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: CertificateActions,

    #[serde(skip)]
    state: State,
}

impl Certificate {
    /// Whether the certificate is past `ValidNotAfter` at `now`.
    pub fn is_expired_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.valid_not_after.is_some_and(|end| end < now)
    }

    /// Generate a new CSR for this certificate with the existing key pair.
    pub async fn renew(&self, challenge_password: Option<&str>) -> Result<CsrResponse> {
        let mut params = serde_json::Map::new();
        if let Some(password) = challenge_password {
            params.insert("ChallengePassword".to_string(), password.into());
        }
        dispatch::invoke_for(self, "Renew", &self.action_block.renew, &params).await
    }

    /// Generate a new key pair and a CSR for it.
    pub async fn rekey(
        &self,
        key_pair_algorithm: &str,
        key_bit_length: Option<u32>,
        key_curve_id: Option<&str>,
        challenge_password: Option<&str>,
    ) -> Result<CsrResponse> {
        dispatch::require("KeyPairAlgorithm", key_pair_algorithm)?;

        let mut params = serde_json::Map::new();
        params.insert("KeyPairAlgorithm".to_string(), key_pair_algorithm.into());
        if let Some(bits) = key_bit_length {
            params.insert("KeyBitLength".to_string(), bits.into());
        }
        if let Some(curve) = key_curve_id {
            params.insert("KeyCurveId".to_string(), curve.into());
        }
        if let Some(password) = challenge_password {
            params.insert("ChallengePassword".to_string(), password.into());
        }
        dispatch::invoke_for(self, "Rekey", &self.action_block.rekey, &params).await
    }
}

impl Resource for Certificate {
    resource_accessors!();

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![
            ("Renew", &self.action_block.renew),
            ("Rekey", &self.action_block.rekey),
        ]
    }
}

/// Parameters of `CertificateService.GenerateCSR`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsrRequest {
    pub certificate_collection: Link,
    pub common_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bit_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_curve_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_usage: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_password: Option<String>,
}

impl CsrRequest {
    pub fn new(certificate_collection: &str, common_name: &str) -> Self {
        Self {
            certificate_collection: Link::new(certificate_collection),
            common_name: common_name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CertificateServiceActions {
    #[serde(rename = "#CertificateService.GenerateCSR", default)]
    generate_csr: ActionTarget,
    #[serde(rename = "#CertificateService.ReplaceCertificate", default)]
    replace_certificate: ActionTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateService {
    #[serde(flatten)]
    pub entity: Entity,

    #[serde(default, skip_serializing)]
    certificate_locations: Link,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: CertificateServiceActions,

    #[serde(skip)]
    state: State,
}

impl CertificateService {
    pub async fn certificate_locations(&self) -> Result<Option<CertificateLocations>> {
        resource::follow_from(self, &self.certificate_locations).await
    }

    pub async fn generate_csr(&self, request: &CsrRequest) -> Result<CsrResponse> {
        dispatch::require("CertificateCollection", request.certificate_collection.uri())?;
        dispatch::require("CommonName", &request.common_name)?;
        dispatch::invoke_for(self, "GenerateCSR", &self.action_block.generate_csr, request).await
    }

    /// Replace the certificate at `certificate_uri` with `certificate_string`.
    pub async fn replace_certificate(
        &self,
        certificate_uri: &str,
        certificate_string: &str,
        certificate_type: &str,
    ) -> Result<()> {
        dispatch::require("CertificateUri", certificate_uri)?;
        dispatch::require("CertificateString", certificate_string)?;
        dispatch::require("CertificateType", certificate_type)?;
        dispatch::check_allowed(
            &self.action_block.replace_certificate,
            "CertificateType",
            certificate_type,
        )?;

        let params = serde_json::json!({
            "CertificateUri": Link::new(certificate_uri),
            "CertificateString": certificate_string,
            "CertificateType": certificate_type,
        });
        dispatch::invoke(
            self,
            "ReplaceCertificate",
            &self.action_block.replace_certificate,
            &params,
        )
        .await?;
        Ok(())
    }
}

impl Resource for CertificateService {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![("CertificateLocations", LinkRef::One(&self.certificate_locations))]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![
            ("GenerateCSR", &self.action_block.generate_csr),
            ("ReplaceCertificate", &self.action_block.replace_certificate),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocationLinks {
    #[serde(rename = "Certificates", default)]
    certificates: Links,
    #[serde(
        rename = "Certificates@odata.count",
        default,
        deserialize_with = "number::lenient_option"
    )]
    count: Option<u64>,
}

/// Every certificate installed anywhere in the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateLocations {
    #[serde(flatten)]
    pub entity: Entity,

    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: LocationLinks,

    #[serde(skip)]
    state: State,
}

impl CertificateLocations {
    pub fn reported_count(&self) -> Option<u64> {
        self.link_block.count
    }

    pub async fn certificates(&self) -> Result<Collected<Certificate>> {
        resource::members_from(self, &self.link_block.certificates).await
    }
}

impl Resource for CertificateLocations {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![("Certificates", LinkRef::Many(&self.link_block.certificates))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use serde_json::json;

    #[test]
    fn test_decode_certificate() {
        let body = r##"{
            "@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates/1",
            "Id": "1",
            "CertificateString": "-----BEGIN CERTIFICATE-----\n...",
            "CertificateType": "PEM",
            "Issuer": {"CommonName": "manager.example.com", "Country": "US"},
            "ValidNotBefore": "2023-01-01T00:00:00Z",
            "ValidNotAfter": "2024-01-01T00:00:00Z",
            "KeyUsage": ["KeyEncipherment", "ServerAuthentication"],
            "Actions": {
                "#Certificate.Renew": {"target": "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates/1/Actions/Certificate.Renew"}
            }
        }"##;
        let cert = Certificate::decode(body.into(), None).unwrap();
        assert_eq!(cert.certificate_type.as_deref(), Some("PEM"));
        assert_eq!(
            cert.issuer.as_ref().and_then(|i| i.common_name.as_deref()),
            Some("manager.example.com")
        );
        assert_eq!(cert.key_usage.len(), 2);

        let now = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z").unwrap();
        assert!(cert.is_expired_at(now));

        // Rekey is not advertised.
        assert!(cert.actions()[1].1.is_empty());
    }

    #[test]
    fn test_csr_request_serialization() {
        let mut request = CsrRequest::new(
            "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates",
            "manager.example.com",
        );
        request.country = Some("US".to_string());
        request.key_bit_length = Some(2048);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "CertificateCollection": {"@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates"},
                "CommonName": "manager.example.com",
                "Country": "US",
                "KeyBitLength": 2048
            })
        );
    }

    #[test]
    fn test_csr_response_decode() {
        let response: CsrResponse = serde_json::from_value(json!({
            "CSRString": "-----BEGIN CERTIFICATE REQUEST-----",
            "CertificateCollection": {"@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates"}
        }))
        .unwrap();
        assert!(response.csr_string.starts_with("-----BEGIN"));
        assert_eq!(
            response.certificate_collection.uri(),
            "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates"
        );
    }

    #[tokio::test]
    async fn test_generate_csr_requires_common_name() {
        let service = CertificateService::decode(
            r#"{"@odata.id":"/redfish/v1/CertificateService"}"#.into(),
            None,
        )
        .unwrap();
        let request = CsrRequest::new("/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates", "");
        let err = service.generate_csr(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientError);
    }

    #[tokio::test]
    async fn test_unadvertised_action_is_unsupported() {
        let service = CertificateService::decode(
            r#"{"@odata.id":"/redfish/v1/CertificateService"}"#.into(),
            None,
        )
        .unwrap();
        let request = CsrRequest::new("/redfish/v1/Managers/1/Certificates", "bmc");
        let err = service.generate_csr(&request).await.unwrap_err();
        assert!(matches!(err, Error::ActionUnsupported("GenerateCSR")));
    }

    #[test]
    fn test_certificate_locations() {
        let body = r#"{
            "@odata.id": "/redfish/v1/CertificateService/CertificateLocations",
            "Links": {
                "Certificates": [
                    {"@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates/1"},
                    {"@odata.id": "/redfish/v1/AccountService/LDAP/Certificates/1"}
                ],
                "Certificates@odata.count": 2
            }
        }"#;
        let locations = CertificateLocations::decode(body.into(), None).unwrap();
        assert_eq!(locations.reported_count(), Some(2));
        assert_eq!(locations.links()[0].1.uris().len(), 2);
    }

    #[test]
    fn test_null_certificate_properties() {
        let body = r#"{"@odata.id":"/redfish/v1/Managers/1/NetworkProtocol/HTTPS/Certificates/2",
            "Id":"2","CertificateString":null,"KeyUsage":null,"ValidNotAfter":null}"#;
        let cert = Certificate::decode(body.into(), None).unwrap();
        assert!(cert.certificate_string.is_empty());
        assert!(cert.key_usage.is_empty());
        assert!(cert.valid_not_after.is_none());
    }
}
