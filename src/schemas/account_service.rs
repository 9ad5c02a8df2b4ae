//! AccountService, ManagerAccount and Role

use serde::{Deserialize, Serialize};

use crate::common::{nullable, number, ActionTarget, Entity, Link, Status};
use crate::error::Result;
use crate::resource::{self, dispatch, Collected, LinkRef, Resource, State, Writable};

/// An external directory service (`LDAP`, `ActiveDirectory`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalAccountProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_provider_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AccountServiceLinks {
    #[serde(rename = "Accounts", default)]
    accounts: Link,
    #[serde(rename = "Roles", default)]
    roles: Link,
}

/// Local account policy and the account and role collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountService {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub auth_failure_logging_threshold: Option<u32>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_password_length: Option<u32>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_password_length: Option<u32>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_lockout_threshold: Option<u32>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_lockout_duration: Option<u32>,
    #[serde(
        default,
        deserialize_with = "number::lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_lockout_counter_reset_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_lockout_counter_reset_enabled: Option<bool>,
    /// `Enabled`, `Disabled`, `Fallback` or `LocalFirst`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_account_auth: Option<String>,
    #[serde(rename = "LDAP", default, skip_serializing_if = "Option::is_none")]
    pub ldap: Option<ExternalAccountProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory: Option<ExternalAccountProvider>,

    // Some services put these under `Links`, most at the top level.
    #[serde(default, skip_serializing)]
    accounts: Link,
    #[serde(default, skip_serializing)]
    roles: Link,
    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: AccountServiceLinks,

    #[serde(skip)]
    state: State,
}

impl AccountService {
    fn accounts_link(&self) -> &Link {
        if self.accounts.is_empty() {
            &self.link_block.accounts
        } else {
            &self.accounts
        }
    }

    fn roles_link(&self) -> &Link {
        if self.roles.is_empty() {
            &self.link_block.roles
        } else {
            &self.roles
        }
    }

    pub async fn accounts(&self) -> Result<Collected<ManagerAccount>> {
        resource::collection_from(self, self.accounts_link()).await
    }

    pub async fn roles(&self) -> Result<Collected<Role>> {
        resource::collection_from(self, self.roles_link()).await
    }
}

impl Resource for AccountService {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![
            ("Accounts", LinkRef::One(self.accounts_link())),
            ("Roles", LinkRef::One(self.roles_link())),
        ]
    }
}

impl Writable for AccountService {
    const WRITABLE: &'static [&'static str] = &[
        "AccountLockoutCounterResetAfter",
        "AccountLockoutCounterResetEnabled",
        "AccountLockoutDuration",
        "AccountLockoutThreshold",
        "AuthFailureLoggingThreshold",
        "LocalAccountAuth",
        "ServiceEnabled",
        "LDAP",
        "ActiveDirectory",
    ];
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AccountLinks {
    #[serde(rename = "Role", default)]
    role: Link,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AccountActions {
    #[serde(rename = "#ManagerAccount.ChangePassword", default)]
    change_password: ActionTarget,
}

/// A user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerAccount {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Write-only: services return `null`, so any value set here is sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_change_required: Option<bool>,
    #[serde(
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub account_types: Vec<String>,

    #[serde(rename = "Links", default, deserialize_with = "nullable::or_default", skip_serializing)]
    link_block: AccountLinks,
    #[serde(
        rename = "Actions",
        default,
        deserialize_with = "nullable::or_default",
        skip_serializing
    )]
    action_block: AccountActions,

    #[serde(skip)]
    state: State,
}

impl ManagerAccount {
    pub async fn role(&self) -> Result<Option<Role>> {
        resource::follow_from(self, &self.link_block.role).await
    }

    /// Change this account's password. `session_password` is the password of
    /// the account the current session belongs to.
    pub async fn change_password(&self, new_password: &str, session_password: &str) -> Result<()> {
        dispatch::require("NewPassword", new_password)?;
        dispatch::require("SessionAccountPassword", session_password)?;

        let params = serde_json::json!({
            "NewPassword": new_password,
            "SessionAccountPassword": session_password,
        });
        dispatch::invoke(
            self,
            "ChangePassword",
            &self.action_block.change_password,
            &params,
        )
        .await?;
        Ok(())
    }
}

impl Resource for ManagerAccount {
    resource_accessors!();

    fn links(&self) -> Vec<(&'static str, LinkRef<'_>)> {
        vec![("Role", LinkRef::One(&self.link_block.role))]
    }

    fn actions(&self) -> Vec<(&'static str, &ActionTarget)> {
        vec![("ChangePassword", &self.action_block.change_password)]
    }
}

impl Writable for ManagerAccount {
    const WRITABLE: &'static [&'static str] = &[
        "UserName",
        "Password",
        "RoleId",
        "Enabled",
        "Locked",
        "PasswordChangeRequired",
    ];
}

/// A named set of privileges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub is_predefined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_privileges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem_privileges: Option<Vec<String>>,

    #[serde(skip)]
    state: State,
}

impl Resource for Role {
    resource_accessors!();
}

impl Writable for Role {
    const WRITABLE: &'static [&'static str] = &["AssignedPrivileges", "OemPrivileges"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::changes;
    use serde_json::{json, Value};

    const S1: &str = r#"{"@odata.id":"/redfish/v1/AccountService","Id":"AccountService","Name":"Account Service","AuthFailureLoggingThreshold":3,"MinPasswordLength":8,"Links":{"Accounts":{"@odata.id":"/redfish/v1/AccountService/Accounts"},"Roles":{"@odata.id":"/redfish/v1/AccountService/Roles"}}}"#;

    #[test]
    fn test_decode_account_service() {
        let service = AccountService::decode(S1.into(), None).unwrap();
        assert_eq!(service.entity.id, "AccountService");
        assert_eq!(service.auth_failure_logging_threshold, Some(3));
        assert_eq!(service.min_password_length, Some(8));
        assert_eq!(service.accounts_link().uri(), "/redfish/v1/AccountService/Accounts");
        assert_eq!(service.roles_link().uri(), "/redfish/v1/AccountService/Roles");
    }

    #[test]
    fn test_top_level_links_preferred() {
        let body = r#"{"@odata.id":"/redfish/v1/AccountService",
            "Accounts":{"@odata.id":"/redfish/v1/AccountService/Accounts"},
            "Roles":{"@odata.id":"/redfish/v1/AccountService/Roles"}}"#;
        let service = AccountService::decode(body.into(), None).unwrap();
        assert_eq!(service.accounts_link().uri(), "/redfish/v1/AccountService/Accounts");
        assert_eq!(service.links().len(), 2);
    }

    #[test]
    fn test_links_not_serialized() {
        let service = AccountService::decode(S1.into(), None).unwrap();
        let value = serde_json::to_value(&service).unwrap();
        assert!(value.get("Links").is_none());
        assert!(value.get("Accounts").is_none());
    }

    #[test]
    fn test_changes_empty_then_single_field() {
        let mut service = AccountService::decode(S1.into(), None).unwrap();
        assert!(changes(&service).unwrap().is_empty());

        service.service_enabled = Some(false);
        service.min_password_length = Some(12); // read-only, never sent
        assert_eq!(
            Value::Object(changes(&service).unwrap()),
            json!({"ServiceEnabled": false})
        );
    }

    #[test]
    fn test_nested_ldap_change() {
        let body = r#"{"@odata.id":"/redfish/v1/AccountService",
            "LDAP":{"ServiceEnabled":false,"ServiceAddresses":["ldaps://ldap.example.com"]}}"#;
        let mut service = AccountService::decode(body.into(), None).unwrap();
        if let Some(ldap) = service.ldap.as_mut() {
            ldap.service_enabled = Some(true);
        }
        assert_eq!(
            Value::Object(changes(&service).unwrap()),
            json!({"LDAP": {"ServiceEnabled": true, "ServiceAddresses": ["ldaps://ldap.example.com"]}})
        );
    }

    #[test]
    fn test_password_is_write_only() {
        let body = r#"{"@odata.id":"/redfish/v1/AccountService/Accounts/3",
            "UserName":"operator","Password":null,"RoleId":"Operator",
            "Links":{"Role":{"@odata.id":"/redfish/v1/AccountService/Roles/Operator"}}}"#;
        let mut account = ManagerAccount::decode(body.into(), None).unwrap();
        assert!(changes(&account).unwrap().is_empty());

        account.password = Some("hunter22".to_string());
        assert_eq!(
            Value::Object(changes(&account).unwrap()),
            json!({"Password": "hunter22"})
        );
        assert_eq!(
            account.links()[0].1.uris(),
            ["/redfish/v1/AccountService/Roles/Operator"]
        );
    }

    #[tokio::test]
    async fn test_change_password_requires_both() {
        let body = r##"{"@odata.id":"/redfish/v1/AccountService/Accounts/3",
            "Actions":{"#ManagerAccount.ChangePassword":{"target":"/redfish/v1/AccountService/Accounts/3/Actions/ManagerAccount.ChangePassword"}}}"##;
        let account = ManagerAccount::decode(body.into(), None).unwrap();
        let err = account.change_password("new", "").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ClientError);
    }

    #[test]
    fn test_null_account_types_and_links() {
        let body = r#"{"@odata.id":"/redfish/v1/AccountService/Accounts/4",
            "UserName":"svc","AccountTypes":null,"Links":null,"Actions":null}"#;
        let account = ManagerAccount::decode(body.into(), None).unwrap();
        assert!(account.account_types.is_empty());
        assert_eq!(account.user_name.as_deref(), Some("svc"));

        let role = Role::decode(
            r#"{"@odata.id":"/redfish/v1/AccountService/Roles/Operator","IsPredefined":null}"#
                .into(),
            None,
        )
        .unwrap();
        assert!(!role.is_predefined);
    }
}
