#[macro_use]
extern crate log;

use azure_iot_hub_service::models::{DeviceIdentity, TwinData};
use azure_iot_hub_service::IoTHubServiceClient;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct HubConfig {
    connection_string: String,
    #[serde(default = "default_prefix")]
    device_prefix: String,
    #[serde(default = "default_count")]
    device_count: usize,
}

fn default_prefix() -> String {
    "bulk-demo".to_string()
}

fn default_count() -> usize {
    5
}

impl HubConfig {
    fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut cfg = config::Config::default();
        cfg.merge(config::File::with_name("demos/config").required(false))?;
        cfg.merge(config::Environment::with_prefix("IOTHUB"))?;
        cfg.try_into()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = HubConfig::from_env()?;
    let client = IoTHubServiceClient::from_connection_string(&config.connection_string)?;
    let devices = client.devices();

    let new_devices: Vec<_> = (0..config.device_count)
        .map(|i| {
            let id = format!("{}-{}", config.device_prefix, i);
            let twin = TwinData::for_device(&id).with_tag("demo", json!(true));
            (DeviceIdentity::new(id), twin)
        })
        .collect();

    let created = devices.create_identities_with_twin(&new_devices).await?;
    info!("Created {} devices: {:?}", new_devices.len(), created.value());

    // Fetch the registered identities so every entry carries its ETag
    let mut registered: Vec<DeviceIdentity> = Vec::with_capacity(new_devices.len());
    for (device, _) in &new_devices {
        registered.push(devices.get_identity(&device.device_id).await?.into_value());
    }

    for device in registered.iter_mut() {
        device.status_reason = Some("bulk demo".to_string());
    }
    let updated = devices.update_identities(&registered, false).await?;
    for error in &updated.value().errors {
        warn!("{} not updated: {:?}", error.device_id, error.error_status);
    }

    let deleted = devices.delete_identities(&registered, true).await?;
    info!("Deleted devices, success: {}", deleted.value().is_successful);

    Ok(())
}
