use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthenticationType, ConnectionState, DeviceCapabilities, DeviceStatus, X509Thumbprint};
use crate::precondition::ETag;

/// Desired and reported property documents of a twin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinProperties {
    /// Properties set by the solution back end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired: Option<Map<String, Value>>,
    /// Properties reported by the device or module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<Map<String, Value>>,
}

/// Twin of a device or module
///
/// Used both as the full document returned by the hub and as a patch, in
/// which case only the fields to change are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinData {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Set for module twins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Back end only metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<TwinProperties>,
    /// Version of the twin, for conditional updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
    /// Incremented on every twin update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    /// ETag of the device identity the twin belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_etag: Option<ETag>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_update_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<ConnectionState>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_to_device_message_count: Option<i32>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<X509Thumbprint>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<DeviceCapabilities>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_scope: Option<String>,
    ///
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_scopes: Vec<String>,
}

impl TwinData {
    /// Empty patch addressed to a device twin
    pub fn for_device(device_id: impl Into<String>) -> Self {
        TwinData {
            device_id: Some(device_id.into()),
            ..Default::default()
        }
    }

    /// Empty patch addressed to a module twin
    pub fn for_module(device_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        TwinData {
            device_id: Some(device_id.into()),
            module_id: Some(module_id.into()),
            ..Default::default()
        }
    }

    /// Set a desired property on the patch
    pub fn with_desired(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties
            .get_or_insert_with(TwinProperties::default)
            .desired
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }

    /// Set a tag on the patch
    pub fn with_tag(mut self, name: impl Into<String>, value: Value) -> Self {
        self.tags
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }

    pub(crate) fn require_device_id(&self) -> crate::Result<&str> {
        self.device_id
            .as_deref()
            .ok_or(crate::IoTHubError::MissingField("deviceId"))
    }

    pub(crate) fn require_module_id(&self) -> crate::Result<&str> {
        self.module_id
            .as_deref()
            .ok_or(crate::IoTHubError::MissingField("moduleId"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn twin_deserializes_query_result() {
        let json = json!({
            "deviceId": "thermostat-1",
            "etag": "AAAAAAAAAAI=",
            "deviceEtag": "MTU0NjQ0MzY0",
            "status": "enabled",
            "statusUpdateTime": "0001-01-01T00:00:00Z",
            "connectionState": "Disconnected",
            "lastActivityTime": "0001-01-01T00:00:00Z",
            "cloudToDeviceMessageCount": 0,
            "authenticationType": "sas",
            "x509Thumbprint": { "primaryThumbprint": null, "secondaryThumbprint": null },
            "version": 4,
            "tags": { "building": "43" },
            "properties": {
                "desired": { "targetTemperature": 21.5, "$version": 2 },
                "reported": { "currentTemperature": 20.1, "$version": 3 }
            }
        });

        let twin: TwinData = serde_json::from_value(json).unwrap();
        assert_eq!(twin.device_id.as_deref(), Some("thermostat-1"));
        assert_eq!(twin.version, Some(4));
        assert_eq!(twin.authentication_type, Some(AuthenticationType::Sas));
        let properties = twin.properties.unwrap();
        assert_eq!(properties.desired.unwrap()["targetTemperature"], json!(21.5));
        assert_eq!(properties.reported.unwrap()["$version"], json!(3));
        assert_eq!(twin.tags.unwrap()["building"], json!("43"));
    }

    #[test]
    fn patch_builder_serializes_only_changes() {
        let patch = TwinData::for_device("thermostat-1")
            .with_desired("targetTemperature", json!(22))
            .with_tag("floor", json!(3));

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "deviceId": "thermostat-1",
                "tags": { "floor": 3 },
                "properties": { "desired": { "targetTemperature": 22 } }
            })
        );
    }

    #[test]
    fn addressing_requires_ids() {
        let patch = TwinData::default();
        assert!(matches!(
            patch.require_device_id(),
            Err(crate::IoTHubError::MissingField("deviceId"))
        ));
        let patch = TwinData::for_module("edge-1", "filter");
        assert_eq!(patch.require_module_id().unwrap(), "filter");
    }
}
