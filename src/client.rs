use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::client_builder::{
    IoTHubClientBuilder, IoTHubClientBuilderError, IoTHubClientBuilderUninitializedHubDetails,
};
use crate::devices::DevicesClient;
use crate::models::QuerySpecification;
use crate::modules::ModulesClient;
use crate::pager::Pageable;
use crate::query::query_pager;
use crate::transport::Transport;

/// Client for managing an IoT hub's registry with service credentials
#[derive(Debug, Clone)]
pub struct IoTHubServiceClient {
    hostname: String,
    transport: Arc<dyn Transport>,
}

impl IoTHubServiceClient {
    pub(crate) fn new(hostname: String, transport: Arc<dyn Transport>) -> Self {
        IoTHubServiceClient {
            hostname,
            transport,
        }
    }

    /// Get a builder for the service client
    pub fn builder() -> IoTHubClientBuilder<IoTHubClientBuilderUninitializedHubDetails> {
        IoTHubClientBuilder::default()
    }

    /// Create a client from a service connection string with default options
    ///
    /// # Example
    /// ```no_run
    /// use azure_iot_hub_service::IoTHubServiceClient;
    ///
    /// let client = IoTHubServiceClient::from_connection_string(
    ///     "HostName=iothubname.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=TheAccessKey",
    /// )
    /// .unwrap();
    /// ```
    pub fn from_connection_string(
        connection_string: impl AsRef<str>,
    ) -> Result<Self, IoTHubClientBuilderError> {
        Self::builder().connection_string(connection_string)?.build()
    }

    /// Hostname of the hub, e.g. `myhub.azure-devices.net`
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Operations on device identities and device twins
    pub fn devices(&self) -> DevicesClient {
        DevicesClient::new(self.transport.clone())
    }

    /// Operations on module identities and module twins
    pub fn modules(&self) -> ModulesClient {
        ModulesClient::new(self.transport.clone())
    }

    /// Run a registry query, deserializing each result as `T`
    ///
    /// # Example
    /// ```no_run
    /// use azure_iot_hub_service::{models::QuerySpecification, IoTHubServiceClient};
    /// use futures::TryStreamExt;
    ///
    /// # async fn run(client: IoTHubServiceClient) -> azure_iot_hub_service::Result<()> {
    /// let query = QuerySpecification::new("select deviceId from devices where status = 'disabled'");
    /// let ids: Vec<serde_json::Value> = client.query(query).into_items().try_collect().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn query<T>(&self, query: QuerySpecification) -> Pageable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        query_pager(self.transport.clone(), query)
    }
}
