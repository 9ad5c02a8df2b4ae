//! Typed Redfish resources
//!
//! Each schema is a plain record: public data fields, private link and action
//! slots filled during decode, follower methods named after the links, and
//! typed action methods. Shared behavior comes from
//! [`Resource`](crate::resource::Resource).

/// Expands to the three required `Resource` accessors for a struct with
/// `entity` and `state` fields.
macro_rules! resource_accessors {
    () => {
        fn entity(&self) -> &$crate::common::Entity {
            &self.entity
        }

        fn state(&self) -> &$crate::resource::State {
            &self.state
        }

        fn state_mut(&mut self) -> &mut $crate::resource::State {
            &mut self.state
        }
    };
}

pub mod account_service;
pub mod action_info;
pub mod bios;
pub mod certificate;
pub mod chassis;
pub mod manager;
pub mod network_adapter;
pub mod processor;
pub mod service_root;
pub mod session;
pub mod system;
pub mod update_service;

pub use account_service::{AccountService, ExternalAccountProvider, ManagerAccount, Role};
pub use action_info::{ActionInfo, Parameter};
pub use bios::Bios;
pub use certificate::{
    Certificate, CertificateLocations, CertificateService, CsrRequest, CsrResponse,
};
pub use chassis::Chassis;
pub use manager::{Manager, ResetToDefaultsType};
pub use network_adapter::NetworkAdapter;
pub use processor::Processor;
pub use service_root::ServiceRoot;
pub use session::{Session, SessionService};
pub use system::{Boot, ComputerSystem};
pub use update_service::{SimpleUpdate, SoftwareInventory, UpdateService};
