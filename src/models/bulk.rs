use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthenticationMechanism, DeviceCapabilities};
use crate::precondition::ETag;

/// Operation applied to one entry of a bulk registry request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// Create the device, failing if it exists
    Create,
    /// Update the device unconditionally
    Update,
    /// Update the device only if its ETag matches
    #[serde(rename = "updateIfMatchETag")]
    UpdateIfMatchETag,
    /// Delete the device unconditionally
    Delete,
    /// Delete the device only if its ETag matches
    #[serde(rename = "deleteIfMatchETag")]
    DeleteIfMatchETag,
    /// Update the twin unconditionally
    UpdateTwin,
    /// Update the twin only if its twin ETag matches
    #[serde(rename = "updateTwinIfMatchETag")]
    UpdateTwinIfMatchETag,
}

impl ImportMode {
    /// Whether the hub checks an ETag before applying this mode
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            ImportMode::UpdateIfMatchETag
                | ImportMode::DeleteIfMatchETag
                | ImportMode::UpdateTwinIfMatchETag
        )
    }
}

/// Status of a device in a bulk registry request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportImportDeviceStatus {
    ///
    Enabled,
    ///
    Disabled,
}

/// Desired and reported properties carried by a bulk request entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyContainer {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired: Option<Map<String, Value>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<Map<String, Value>>,
}

/// One entry of a bulk registry request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImportDevice {
    /// Device id
    pub id: String,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// ETag of the identity, checked by the `*IfMatchETag` identity modes
    #[serde(rename = "eTag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
    ///
    pub import_mode: ImportMode,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExportImportDeviceStatus>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationMechanism>,
    /// ETag of the twin, checked by [`ImportMode::UpdateTwinIfMatchETag`]
    #[serde(rename = "twinETag", skip_serializing_if = "Option::is_none")]
    pub twin_etag: Option<ETag>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyContainer>,
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

impl ExportImportDevice {
    /// Entry for `id` with only the import mode set
    pub fn new(id: impl Into<String>, import_mode: ImportMode) -> Self {
        ExportImportDevice {
            id: id.into(),
            module_id: None,
            etag: None,
            import_mode,
            status: None,
            status_reason: None,
            authentication: None,
            twin_etag: None,
            tags: None,
            properties: None,
            capabilities: None,
            device_scope: None,
            parent_scopes: Vec::new(),
        }
    }
}

/// Per-device failure reported by a bulk registry request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistryOperationError {
    ///
    pub device_id: String,
    /// Numeric error code, e.g. `412006` for an ETag mismatch
    #[serde(default)]
    pub error_code: Option<Value>,
    ///
    #[serde(default)]
    pub error_status: Option<String>,
    ///
    #[serde(default)]
    pub module_id: Option<String>,
    ///
    #[serde(default)]
    pub operation: Option<String>,
}

/// Per-device warning reported by a bulk registry request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistryOperationWarning {
    ///
    pub device_id: String,
    ///
    #[serde(default)]
    pub warning_code: Option<String>,
    ///
    #[serde(default)]
    pub warning_status: Option<String>,
}

/// Outcome of a bulk registry request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRegistryOperationResult {
    /// Whether every entry was applied
    pub is_successful: bool,
    ///
    #[serde(default)]
    pub errors: Vec<DeviceRegistryOperationError>,
    ///
    #[serde(default)]
    pub warnings: Vec<DeviceRegistryOperationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_modes_use_service_spelling() {
        let cases = vec![
            (ImportMode::Create, "create"),
            (ImportMode::Update, "update"),
            (ImportMode::UpdateIfMatchETag, "updateIfMatchETag"),
            (ImportMode::Delete, "delete"),
            (ImportMode::DeleteIfMatchETag, "deleteIfMatchETag"),
            (ImportMode::UpdateTwin, "updateTwin"),
            (ImportMode::UpdateTwinIfMatchETag, "updateTwinIfMatchETag"),
        ];

        for (mode, wire) in cases {
            assert_eq!(serde_json::to_value(mode).unwrap(), json!(wire));
        }
    }

    #[test]
    fn entry_renames_etag_fields() {
        let mut entry = ExportImportDevice::new("dev-1", ImportMode::UpdateTwinIfMatchETag);
        entry.etag = Some(ETag::new("e1"));
        entry.twin_etag = Some(ETag::new("t1"));

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "id": "dev-1",
                "eTag": "e1",
                "importMode": "updateTwinIfMatchETag",
                "twinETag": "t1"
            })
        );
    }

    #[test]
    fn partial_failure_result_deserializes() {
        let json = json!({
            "isSuccessful": false,
            "errors": [{
                "deviceId": "dev-2",
                "errorCode": 412006,
                "errorStatus": "ETag mismatch",
                "operation": "update"
            }],
            "warnings": []
        });

        let result: BulkRegistryOperationResult = serde_json::from_value(json).unwrap();
        assert!(!result.is_successful);
        assert_eq!(result.errors[0].device_id, "dev-2");
        assert_eq!(result.errors[0].error_code, Some(json!(412006)));
        assert!(result.warnings.is_empty());
    }
}
