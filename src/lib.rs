//! Azure IoT Hub service client for managing a hub's registry in rust
//!
//! The service client authenticates with a hub shared access policy and
//! manages device and module identities, twins and direct methods over the
//! hub's REST API. Registry queries are exposed as lazy [`Pageable`] streams
//! that follow the hub's continuation tokens, and every mutation accepts an
//! optional [`IfMatch`] precondition.
//!
//! ## Feature flags
//!
//! SDK client uses [feature
//! flags](https://doc.rust-lang.org/cargo/reference/features.html#the-features-section) to
//! configure capabilities of the client sdk. By default all features are enabled.
//!
//! Identity, twin and query operations are always available.
//!
//! - `direct-methods`: Enables invoking direct methods on devices and modules
//! - `management-models`: Enables the management plane models in [`management`]
//!
//! ### Disabling capabilities
//! If not all features are required, disable the default features and add only desired.
//!
//! ```toml
//! azure_iot_hub_service = { version = "0.1.0", features = [], default-features = false }
//! ```
//!
//! # Examples
//!
//! Disable every device reporting a low battery
//! ```no_run
//! use azure_iot_hub_service::{IoTHubServiceClient, models::QuerySpecification};
//! use futures::TryStreamExt;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Id {
//!     device_id: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IoTHubServiceClient::from_connection_string(
//!         "HostName=iothubname.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=TheAccessKey",
//!     )?;
//!
//!     let query = QuerySpecification::new(
//!         "select deviceId from devices where properties.reported.battery < 10",
//!     );
//!     let mut ids = client.query::<Id>(query).into_items();
//!
//!     while let Some(id) = ids.try_next().await? {
//!         let mut device = client.devices().get_identity(&id.device_id).await?.into_value();
//!         let etag = device.etag.clone();
//!         device.status = Some(azure_iot_hub_service::models::DeviceStatus::Disabled);
//!         client.devices().update_identity(&device, etag.map(Into::into)).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

#[macro_use]
extern crate log;

/// IoT SDK package version
pub const SDK_VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Bulk registry import mode selection
pub mod bulk;
/// The IoT Hub service client
pub mod client;
/// Builder for the service client
pub mod client_builder;
/// Device identity and twin operations
pub mod devices;
/// Errors
pub mod error;
pub(crate) mod http_transport;
/// Management plane models
#[cfg(feature = "management-models")]
pub mod management;
/// Registry data transfer types
pub mod models;
/// Module identity and twin operations
pub mod modules;
pub mod pager;
/// ETag preconditions
pub mod precondition;
pub mod query;
/// Response wrappers
pub mod response;
/// Shared access signature generation
pub mod token;
/// Transport types
pub mod transport;

pub use bulk::{select_import_mode, BulkOperation};
pub use client::IoTHubServiceClient;
pub use client_builder::{ClientOptions, IoTHubClientBuilder, IoTHubClientBuilderError};
pub use devices::DevicesClient;
pub use error::IoTHubError;
pub use modules::ModulesClient;
pub use pager::{BlockingPages, ContinuationToken, Page, Pageable};
pub use precondition::{ETag, IfMatch};
pub use response::{RawResponse, Response};
pub use token::{
    parse_connection_string, SasTokenSource, SharedAccessKeyTokenSource, TokenError, TokenSource,
};
pub use transport::{HttpRequest, HttpResponse, Transport};

/// Result of service client operations
pub type Result<T> = std::result::Result<T, IoTHubError>;
