//! Building blocks shared by every resource schema
//!
//! - [`link`] - hyperlinks, link arrays and action targets
//! - [`entity`] - identity and OData annotations
//! - [`number`] - numeric decoding that tolerates numeric strings
//! - [`nullable`] - `null` decoded as the default for plain fields
//! - [`message`] - `@Message.ExtendedInfo` and the error payload
//! - [`settings`] - the `@Redfish.Settings` container
//! - [`types`] - status, power, reset and identifier types

pub mod entity;
pub mod link;
pub mod message;
pub mod nullable;
pub mod number;
pub mod settings;
pub mod types;

pub use entity::Entity;
pub use link::{ActionTarget, Link, Links};
pub use message::{ErrorBody, Message};
pub use settings::{ApplyTime, Settings};
pub use types::{Health, Identifier, IndicatorLed, PowerState, ResetType, State, Status};
