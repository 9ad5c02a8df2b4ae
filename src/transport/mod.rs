//! Redfish service interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - basic credentials and the session-token lifecycle
//! - [`client`] - main client used by every resource
//! - [`http`] - HTTP verb surface, headers and error decoding
//!
//! # Example
//!
//! ```ignore
//! use redfish::{Client, ClientConfig};
//!
//! async fn example() -> redfish::Result<()> {
//!     let client = Client::connect(
//!         ClientConfig::new("https://bmc.example.com").with_session("admin", "secret"),
//!     )
//!     .await?;
//!     let root = client.service_root().await?;
//!     println!("{:?}", root.redfish_version);
//!     client.logout().await
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use auth::{AuthMethod, Session, SessionState, SESSIONS_URI};
pub use client::{Client, ClientConfig, DEFAULT_FAN_OUT, DEFAULT_TIMEOUT, SERVICE_ROOT};
pub use http::{RequestAuth, Response};
