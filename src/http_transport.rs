use async_trait::async_trait;
use chrono::Utc;
use hyper::{client::HttpConnector, header, Body, Client, Request};
use hyper_tls::HttpsConnector;
use std::sync::Arc;
use std::time::Duration;

use crate::client_builder::ClientOptions;
use crate::error::IoTHubError;
use crate::token::TokenSource;
use crate::transport::{HttpRequest, HttpResponse, Transport};

fn user_agent() -> String {
    format!("azure-iot-hub-service-rs/{}", crate::SDK_VERSION)
}

/// Transport sending requests to the hub over HTTPS with hyper
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    endpoint: String,
    api_version: String,
    request_timeout: Duration,
    token_lifetime: chrono::Duration,
    token_source: Arc<dyn TokenSource + Send + Sync>,
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HttpTransport {
    pub(crate) fn new(
        endpoint: &str,
        options: &ClientOptions,
        token_source: Arc<dyn TokenSource + Send + Sync>,
    ) -> Self {
        let https = HttpsConnector::new();
        let client = Client::builder().build::<_, hyper::Body>(https);
        HttpTransport {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: options.api_version.clone(),
            request_timeout: options.request_timeout,
            token_lifetime: chrono::Duration::seconds(options.token_lifetime.as_secs() as i64),
            token_source,
            client,
        }
    }

    fn uri(&self, path: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.endpoint, path, self.api_version
        )
    }

    async fn exchange(&self, req: Request<Body>) -> crate::Result<HttpResponse> {
        let res = self.client.request(req).await?;
        let (parts, body) = res.into_parts();
        let body = hyper::body::to_bytes(body).await?;
        Ok(HttpResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> crate::Result<HttpResponse> {
        let sas = self.token_source.get(&(Utc::now() + self.token_lifetime))?;
        let uri = self.uri(&request.path);

        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(&uri)
            .header(header::AUTHORIZATION, sas)
            .header(header::USER_AGENT, user_agent())
            .header(header::ACCEPT, "application/json");
        if request.body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json; charset=utf-8");
        }
        let mut req = builder.body(request.body.map(Body::from).unwrap_or_else(Body::empty))?;
        req.headers_mut().extend(request.headers);

        debug!("{} {}", request.method, uri);

        let res = tokio::time::timeout(self.request_timeout, self.exchange(req))
            .await
            .map_err(|_| IoTHubError::Timeout(self.request_timeout))??;

        debug!("Response: {}", res.status);

        Ok(res)
    }
}
