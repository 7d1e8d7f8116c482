use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direct method invocation sent to a device or module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudToDeviceMethodRequest {
    /// Name of the method registered by the device
    pub method_name: String,
    /// JSON payload, up to 128 KB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Seconds to wait for the device to answer once connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_timeout_in_seconds: Option<u32>,
    /// Seconds to wait for a disconnected device to come online
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_in_seconds: Option<u32>,
}

impl CloudToDeviceMethodRequest {
    /// Invocation of `method_name` without payload
    pub fn new(method_name: impl Into<String>) -> Self {
        CloudToDeviceMethodRequest {
            method_name: method_name.into(),
            payload: None,
            response_timeout_in_seconds: None,
            connect_timeout_in_seconds: None,
        }
    }

    /// Attach a JSON payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Wait at most `seconds` for the device to respond
    pub fn with_response_timeout(mut self, seconds: u32) -> Self {
        self.response_timeout_in_seconds = Some(seconds);
        self
    }
}

/// Result of a direct method invocation, as returned by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudToDeviceMethodResponse {
    /// Status code chosen by the device
    pub status: i32,
    /// JSON payload returned by the device, up to 128 KB
    #[serde(default)]
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_timeouts() {
        let request = CloudToDeviceMethodRequest::new("reboot")
            .with_payload(json!({"delay": 5}))
            .with_response_timeout(30);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "methodName": "reboot",
                "payload": {"delay": 5},
                "responseTimeoutInSeconds": 30
            })
        );
    }

    #[test]
    fn response_without_payload_defaults_to_null() {
        let response: CloudToDeviceMethodResponse =
            serde_json::from_value(json!({"status": 200})).unwrap();
        assert_eq!(response.status, 200);
        assert!(response.payload.is_null());
    }
}
