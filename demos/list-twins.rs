#[macro_use]
extern crate log;

use azure_iot_hub_service::IoTHubServiceClient;
use futures::TryStreamExt;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HubConfig {
    connection_string: String,
    #[serde(default)]
    page_size: Option<u32>,
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

    info!("Listing device twins on {}", client.hostname());

    let mut pages = client.devices().get_twins();
    if let Some(size) = config.page_size {
        pages = pages.with_page_size_hint(size);
    }

    let mut count = 0;
    while let Some(page) = pages.try_next().await? {
        for twin in page.items() {
            info!(
                "{} status={:?} etag={:?}",
                twin.device_id.as_deref().unwrap_or("<unknown>"),
                twin.status,
                twin.etag
            );
        }
        count += page.items().len();
        debug!("Page done, more to come: {}", !page.is_last());
    }

    info!("{} twins", count);

    Ok(())
}
