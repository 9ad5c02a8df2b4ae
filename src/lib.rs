//! Redfish client
//!
//! Navigate a Redfish service's resource graph, decode resources into typed
//! records, PATCH writable properties and invoke actions.
//!
//! ```ignore
//! use redfish::{Client, ClientConfig};
//!
//! let client = Client::connect(
//!     ClientConfig::new("https://bmc.example.com").with_session("admin", "secret"),
//! )
//! .await?;
//! let root = client.service_root().await?;
//! let systems = root.systems().await?.into_result()?;
//! client.logout().await?;
//! ```

pub mod cancel;
pub mod common;
pub mod error;
pub mod resource;
pub mod schemas;
pub mod transport;

pub use cancel::{CancelHandle, CancelToken};
pub use error::{CollectionFailures, Error, ErrorKind, HttpError, Result};
pub use resource::{Collected, Resource, Writable};
pub use transport::{AuthMethod, Client, ClientConfig, SessionState};
