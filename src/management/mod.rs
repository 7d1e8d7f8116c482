//! Models shared with Azure management plane APIs
//!
//! These mirror resource schemas that appear alongside hub management, such as
//! the network gateways a hub sits behind and the media and edge services fed
//! by its devices. They carry no client operations of their own.

/// Data Box Edge gateway models
pub mod edge_gateway;
/// Media Services encoding models
pub mod media;
/// Network resource models
pub mod network;
