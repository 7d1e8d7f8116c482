use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::precondition::ETag;

/// Whether a device or module may connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceStatus {
    ///
    Enabled,
    ///
    Disabled,
    /// Catch-all for values added to the service later
    #[serde(other)]
    Unknown,
}

/// Last known connectivity of a device or module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    ///
    Connected,
    ///
    Disconnected,
    /// Catch-all for values added to the service later
    #[serde(other)]
    Unknown,
}

/// How a device or module authenticates with the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationType {
    /// Symmetric key shared access signatures
    #[serde(rename = "sas")]
    Sas,
    /// X.509 certificate identified by thumbprint
    #[serde(rename = "selfSigned")]
    SelfSigned,
    /// X.509 certificate chained to a registered CA
    #[serde(rename = "certificateAuthority")]
    CertificateAuthority,
    /// Authenticates through its parent edge device
    #[serde(rename = "none")]
    None,
    /// Catch-all for values added to the service later
    #[serde(other)]
    Unknown,
}

/// Primary and secondary base64 keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricKey {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
}

/// Primary and secondary X.509 certificate thumbprints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Thumbprint {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_thumbprint: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_thumbprint: Option<String>,
}

/// Credentials of a device or module identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationMechanism {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symmetric_key: Option<SymmetricKey>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<X509Thumbprint>,
    ///
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,
}

/// Optional device capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    /// The device is an IoT Edge device
    #[serde(default)]
    pub iot_edge: bool,
}

/// A device registered in the identity registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Case-sensitive device id, at most 128 characters
    pub device_id: String,
    /// Distinguishes devices recreated with the same id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    /// Version of the identity, for conditional updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<ConnectionState>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    /// Free-form reason for the current status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state_updated_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updated_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_time: Option<DateTime<Utc>>,
    /// Cloud-to-device messages queued for the device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_to_device_message_count: Option<i32>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationMechanism>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<DeviceCapabilities>,
    /// Scope of the parent edge device, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_scope: Option<String>,
    /// Scopes of the upper level edge devices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_scopes: Vec<String>,
}

impl DeviceIdentity {
    /// A new identity with only the id set
    pub fn new(device_id: impl Into<String>) -> Self {
        DeviceIdentity {
            device_id: device_id.into(),
            ..Default::default()
        }
    }
}
