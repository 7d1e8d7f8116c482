use serde::{Deserialize, Serialize};

/// Query over the twins, jobs or other collections of a hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpecification {
    /// IoT Hub query language expression, e.g. `SELECT * FROM devices WHERE status = 'enabled'`
    pub query: String,
}

impl QuerySpecification {
    ///
    pub fn new(query: impl Into<String>) -> Self {
        QuerySpecification {
            query: query.into(),
        }
    }

    /// All device twins
    pub fn all_devices() -> Self {
        Self::new("select * from devices")
    }

    /// All module twins of all devices
    pub fn all_modules() -> Self {
        Self::new("select * from devices.modules")
    }
}
