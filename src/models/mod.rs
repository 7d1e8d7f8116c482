//! Request and response types of the IoT Hub service REST API
//!
//! Field names follow the service's camelCase JSON. Optional fields are left
//! out of requests when unset, unknown fields in responses are ignored and
//! unrecognised enum strings deserialize to an `Unknown` variant.

mod bulk;
mod device;
#[cfg(feature = "direct-methods")]
mod method;
mod module;
mod query;
mod twin;

pub use bulk::*;
pub use device::*;
#[cfg(feature = "direct-methods")]
pub use method::*;
pub use module::*;
pub use query::*;
pub use twin::*;
