use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthenticationMechanism, ConnectionState};
use crate::precondition::ETag;

/// A module registered on a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIdentity {
    /// Case-sensitive module id
    pub module_id: String,
    /// Id of the device the module belongs to
    pub device_id: String,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
    /// Who manages the module, e.g. `IotEdge` for edge agent deployed modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<ConnectionState>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state_updated_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_time: Option<DateTime<Utc>>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_to_device_message_count: Option<i32>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationMechanism>,
}

impl ModuleIdentity {
    /// A new module identity with only the ids set
    pub fn new(device_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        ModuleIdentity {
            device_id: device_id.into(),
            module_id: module_id.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_list_deserializes() {
        let json = r#"[
            {"moduleId": "$edgeAgent", "deviceId": "edge-1", "managedBy": "IotEdge", "etag": "NA=="},
            {"moduleId": "filter", "deviceId": "edge-1", "connectionState": "Connected"}
        ]"#;

        let modules: Vec<ModuleIdentity> = serde_json::from_str(json).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].managed_by.as_deref(), Some("IotEdge"));
        assert_eq!(modules[1].connection_state, Some(ConnectionState::Connected));
    }

    #[test]
    fn new_module_serializes_ids() {
        let json = serde_json::to_value(&ModuleIdentity::new("edge-1", "filter")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"moduleId": "filter", "deviceId": "edge-1"})
        );
    }
}
