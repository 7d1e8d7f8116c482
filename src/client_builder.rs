use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::http_transport::HttpTransport;
use crate::token::{
    parse_connection_string, Credential, SasTokenSource, SharedAccessKeyTokenSource, TokenError,
    TokenSource,
};
use crate::transport::Transport;
use crate::IoTHubServiceClient;

/// API version sent with every request unless overridden
pub const DEFAULT_API_VERSION: &str = "2020-03-13";

/// Error related to building the client
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IoTHubClientBuilderError {
    /// Uninitialized field
    #[error("{0} must be initialized")]
    UninitializedField(&'static str),
    /// Custom validation error
    #[error("{0} failed to validate")]
    ValidationError(&'static str),
    /// Error initializing the hub client
    #[error("An error occurred intializing the IoT Hub service client {0}")]
    ClientError(String),
    /// The credentials could not be parsed
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Settings applied to every request made by the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Value of the `api-version` query parameter, [`DEFAULT_API_VERSION`] by default
    pub api_version: String,
    /// Upper bound on a single request including reading the body, 100 seconds by default
    pub request_timeout: Duration,
    /// Lifetime of each signed token, one hour by default
    pub token_lifetime: Duration,
    /// Base URL replacing `https://{hostname}`
    pub endpoint: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(100),
            token_lifetime: Duration::from_secs(60 * 60),
            endpoint: None,
        }
    }
}

/// The client builder has no initialized fields and requires the hub hostname
#[derive(Debug)]
pub struct IoTHubClientBuilderUninitializedHubDetails;
/// The client builder has hub details and can have the token source initialized
#[derive(Debug)]
pub struct IoTHubClientBuilderInitializedHubDetails;
/// The client builder has all fields required to be built
#[derive(Debug)]
pub struct IoTHubClientBuilderInitializedTokenSource;

/// Builder object for the IoT Hub service client
#[derive(Debug)]
pub struct IoTHubClientBuilder<T> {
    iothub_hostname: Option<String>,
    token_source: Option<Arc<dyn TokenSource + Send + Sync>>,
    transport: Option<Arc<dyn Transport>>,
    options: ClientOptions,
    _phantom: PhantomData<T>,
}

impl Default for IoTHubClientBuilder<IoTHubClientBuilderUninitializedHubDetails> {
    fn default() -> IoTHubClientBuilder<IoTHubClientBuilderUninitializedHubDetails> {
        Self {
            iothub_hostname: None,
            token_source: None,
            transport: None,
            options: ClientOptions::default(),
            _phantom: Default::default(),
        }
    }
}

impl<T> IoTHubClientBuilder<T> {
    fn into_state<S>(self) -> IoTHubClientBuilder<S> {
        IoTHubClientBuilder {
            iothub_hostname: self.iothub_hostname,
            token_source: self.token_source,
            transport: self.transport,
            options: self.options,
            _phantom: Default::default(),
        }
    }

    /// Replace all client options
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Send requests to `endpoint` instead of `https://{hostname}`
    pub fn endpoint<E: ToString>(mut self, endpoint: E) -> Self {
        self.options.endpoint = Some(endpoint.to_string());
        self
    }

    /// Use a custom transport instead of the default HTTPS one
    ///
    /// Authorization, endpoint and timeouts become the transport's concern.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl IoTHubClientBuilder<IoTHubClientBuilderInitializedTokenSource> {
    /// Build the IoT hub service client
    pub fn build(self) -> Result<IoTHubServiceClient, IoTHubClientBuilderError> {
        let iothub_hostname = match self.iothub_hostname {
            Some(hostname) => hostname,
            None => {
                return Err(IoTHubClientBuilderError::UninitializedField(
                    "iothub_hostname",
                ))
            }
        };

        if let Some(transport) = self.transport {
            return Ok(IoTHubServiceClient::new(iothub_hostname, transport));
        }

        let token_source = match self.token_source {
            Some(token_source) => token_source,
            None => {
                return Err(IoTHubClientBuilderError::ValidationError(
                    "One of `shared_access_key`, `sas_token` or `token_source` must be provided",
                ))
            }
        };

        if self.options.request_timeout == Duration::from_secs(0) {
            return Err(IoTHubClientBuilderError::ValidationError("request_timeout"));
        }

        let endpoint = self
            .options
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}", iothub_hostname));
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(IoTHubClientBuilderError::ClientError(format!(
                "endpoint {} must be an http(s) url",
                endpoint
            )));
        }

        debug!("Creating service client for {} at {}", iothub_hostname, endpoint);

        let transport = HttpTransport::new(&endpoint, &self.options, token_source);

        Ok(IoTHubServiceClient::new(iothub_hostname, Arc::new(transport)))
    }
}

impl IoTHubClientBuilder<IoTHubClientBuilderUninitializedHubDetails> {
    /// Set the IoT hub hostname, e.g. `myhub.azure-devices.net`
    pub fn hostname<T>(self, iothub_hostname: T) -> IoTHubClientBuilder<IoTHubClientBuilderInitializedHubDetails>
    where
        T: ToString,
    {
        IoTHubClientBuilder {
            iothub_hostname: Some(iothub_hostname.to_string()),
            ..self.into_state()
        }
    }

    /// Set the hostname and credentials from a service connection string
    pub fn connection_string<T>(
        self,
        connection_string: T,
    ) -> Result<IoTHubClientBuilder<IoTHubClientBuilderInitializedTokenSource>, TokenError>
    where
        T: AsRef<str>,
    {
        let (hostname, credential) = parse_connection_string(connection_string)?;
        let token_source: Arc<dyn TokenSource + Send + Sync> = match credential {
            Credential::SharedAccessKey { key_name, key } => Arc::new(
                SharedAccessKeyTokenSource::new(&hostname, &key_name, &key)?,
            ),
            Credential::SharedAccessSignature(sas) => Arc::new(SasTokenSource::new(sas)),
        };

        Ok(IoTHubClientBuilder {
            iothub_hostname: Some(hostname),
            token_source: Some(token_source),
            ..self.into_state()
        })
    }
}

impl IoTHubClientBuilder<IoTHubClientBuilderInitializedHubDetails> {
    /// Sign tokens with a shared access policy key
    pub fn shared_access_key<N, K>(
        self,
        key_name: N,
        key: K,
    ) -> Result<IoTHubClientBuilder<IoTHubClientBuilderInitializedTokenSource>, TokenError>
    where
        N: AsRef<str>,
        K: AsRef<str>,
    {
        let hostname = self.iothub_hostname.as_deref().unwrap_or_default();
        let token_source =
            SharedAccessKeyTokenSource::new(hostname, key_name.as_ref(), key.as_ref())?;
        Ok(self.token_source(token_source))
    }

    /// Authenticate with a pre-generated shared access signature
    pub fn sas_token<T: Into<String>>(
        self,
        sas: T,
    ) -> IoTHubClientBuilder<IoTHubClientBuilderInitializedTokenSource> {
        self.token_source(SasTokenSource::new(sas))
    }

    /// Authenticate with a custom token source
    pub fn token_source<TS>(
        self,
        token_source: TS,
    ) -> IoTHubClientBuilder<IoTHubClientBuilderInitializedTokenSource>
    where
        TS: TokenSource + Send + Sync + 'static,
    {
        IoTHubClientBuilder {
            token_source: Some(Arc::new(token_source)),
            ..self.into_state()
        }
    }
}
