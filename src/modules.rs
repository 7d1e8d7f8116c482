use hyper::{Method, StatusCode};
use std::sync::Arc;

#[cfg(feature = "direct-methods")]
use crate::models::{CloudToDeviceMethodRequest, CloudToDeviceMethodResponse};
use crate::models::{ModuleIdentity, QuerySpecification, TwinData};
use crate::pager::Pageable;
use crate::precondition::IfMatch;
use crate::query::query_pager;
use crate::response::{RawResponse, Response};
use crate::transport::{path_segment, send_empty, send_json, HttpRequest, Transport};

/// Module identities and module twins in the hub registry
#[derive(Debug, Clone)]
pub struct ModulesClient {
    transport: Arc<dyn Transport>,
}

impl ModulesClient {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        ModulesClient { transport }
    }

    /// Register a new module on an existing device
    pub async fn create_identity(
        &self,
        module: &ModuleIdentity,
    ) -> crate::Result<Response<ModuleIdentity>> {
        let request = HttpRequest::new(
            Method::PUT,
            identity_path(&module.device_id, &module.module_id),
        )
        .json(module)?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    ///
    pub async fn get_identity(
        &self,
        device_id: &str,
        module_id: &str,
    ) -> crate::Result<Response<ModuleIdentity>> {
        let request = HttpRequest::new(Method::GET, identity_path(device_id, module_id));
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// All modules registered on a device
    pub async fn get_identities(
        &self,
        device_id: &str,
    ) -> crate::Result<Response<Vec<ModuleIdentity>>> {
        let path = format!("devices/{}/modules", path_segment(device_id));
        send_json(
            self.transport.as_ref(),
            HttpRequest::new(Method::GET, path),
            &[StatusCode::OK],
        )
        .await
    }

    /// Replace a module identity, optionally only while `if_match` holds
    pub async fn update_identity(
        &self,
        module: &ModuleIdentity,
        if_match: Option<IfMatch>,
    ) -> crate::Result<Response<ModuleIdentity>> {
        let request = HttpRequest::new(
            Method::PUT,
            identity_path(&module.device_id, &module.module_id),
        )
        .json(module)?
        .if_match(if_match.as_ref())?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    ///
    pub async fn delete_identity(
        &self,
        device_id: &str,
        module_id: &str,
        if_match: Option<IfMatch>,
    ) -> crate::Result<RawResponse> {
        let request = HttpRequest::new(Method::DELETE, identity_path(device_id, module_id))
            .if_match(if_match.as_ref())?;
        send_empty(
            self.transport.as_ref(),
            request,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    ///
    pub async fn get_twin(
        &self,
        device_id: &str,
        module_id: &str,
    ) -> crate::Result<Response<TwinData>> {
        let request = HttpRequest::new(Method::GET, twin_path(device_id, module_id));
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Twins of every module in the hub, one page at a time
    pub fn get_twins(&self) -> Pageable<TwinData> {
        query_pager(self.transport.clone(), QuerySpecification::all_modules())
    }

    /// Patch tags and desired properties of a module twin
    ///
    /// The twin must carry both its device and module id.
    pub async fn update_twin(
        &self,
        twin: &TwinData,
        if_match: Option<IfMatch>,
    ) -> crate::Result<Response<TwinData>> {
        let path = twin_path(twin.require_device_id()?, twin.require_module_id()?);
        let request = HttpRequest::new(Method::PATCH, path)
            .json(twin)?
            .if_match(if_match.as_ref())?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Invoke a direct method on a connected module
    #[cfg(feature = "direct-methods")]
    pub async fn invoke_method(
        &self,
        device_id: &str,
        module_id: &str,
        method: &CloudToDeviceMethodRequest,
    ) -> crate::Result<Response<CloudToDeviceMethodResponse>> {
        let path = format!("{}/methods", twin_path(device_id, module_id));
        let request = HttpRequest::new(Method::POST, path).json(method)?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }
}

fn identity_path(device_id: &str, module_id: &str) -> String {
    format!(
        "devices/{}/modules/{}",
        path_segment(device_id),
        path_segment(module_id)
    )
}

fn twin_path(device_id: &str, module_id: &str) -> String {
    format!(
        "twins/{}/modules/{}",
        path_segment(device_id),
        path_segment(module_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoTHubError;
    use crate::precondition::ETag;
    use crate::transport::testing::ScriptedTransport;
    use futures::TryStreamExt;
    use hyper::header::IF_MATCH;
    use serde_json::json;

    fn client(transport: &Arc<ScriptedTransport>) -> ModulesClient {
        ModulesClient::new(transport.clone())
    }

    #[tokio::test]
    async fn module_paths_nest_under_device() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .respond(
                    StatusCode::OK,
                    json!({"deviceId": "edge-1", "moduleId": "$edgeHub"}),
                )
                .respond(
                    StatusCode::OK,
                    json!([{"deviceId": "edge-1", "moduleId": "$edgeHub"}]),
                ),
        );
        let modules = client(&transport);

        modules
            .create_identity(&ModuleIdentity::new("edge-1", "$edgeHub"))
            .await
            .unwrap();
        let listed = modules.get_identities("edge-1").await.unwrap();

        assert_eq!(listed.value().len(), 1);
        let requests = transport.requests();
        assert_eq!(requests[0].path, "devices/edge-1/modules/$edgeHub");
        assert_eq!(requests[1].path, "devices/edge-1/modules");
    }

    #[tokio::test]
    async fn update_identity_conflict_is_precondition_failed() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            StatusCode::PRECONDITION_FAILED,
            json!({"Message": "ErrorCode:PreconditionFailed"}),
        ));
        let mut module = ModuleIdentity::new("dev", "filter");
        module.etag = Some(ETag::new("MQ=="));

        let err = client(&transport)
            .update_identity(&module, module.etag.clone().map(IfMatch::from))
            .await
            .unwrap_err();

        assert!(err.is_precondition_failed());
        assert_eq!(transport.requests()[0].headers.get(IF_MATCH).unwrap(), "\"MQ==\"");
    }

    #[tokio::test]
    async fn delete_identity_without_precondition() {
        let transport = Arc::new(
            ScriptedTransport::default().respond(StatusCode::NO_CONTENT, json!(null)),
        );

        client(&transport).delete_identity("dev", "filter", None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::DELETE);
        assert!(requests[0].headers.get(IF_MATCH).is_none());
    }

    #[tokio::test]
    async fn update_twin_needs_module_id() {
        let transport = Arc::new(ScriptedTransport::default());

        let err = client(&transport)
            .update_twin(&TwinData::for_device("dev"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, IoTHubError::MissingField("moduleId")));
    }

    #[tokio::test]
    async fn update_twin_patches_module_twin() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            StatusCode::OK,
            json!({"deviceId": "dev", "moduleId": "filter", "etag": "AAAAAAAAAAM="}),
        ));
        let twin = TwinData::for_module("dev", "filter").with_desired("threshold", json!(42));

        client(&transport).update_twin(&twin, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[0].path, "twins/dev/modules/filter");
        assert_eq!(
            transport.request_body(0)["properties"]["desired"]["threshold"],
            json!(42)
        );
    }

    #[tokio::test]
    async fn get_twins_queries_module_collection() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            StatusCode::OK,
            json!([{"deviceId": "dev", "moduleId": "filter"}]),
        ));

        let pages: Vec<_> = client(&transport).get_twins().try_collect().await.unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_last());
        assert_eq!(
            transport.request_body(0)["query"],
            json!("select * from devices.modules")
        );
    }

    #[cfg(feature = "direct-methods")]
    #[tokio::test]
    async fn invoke_method_targets_module_twin() {
        let transport = Arc::new(
            ScriptedTransport::default().respond(StatusCode::OK, json!({"status": 404})),
        );

        let response = client(&transport)
            .invoke_method("dev", "filter", &CloudToDeviceMethodRequest::new("missing"))
            .await
            .unwrap();

        assert_eq!(response.value().status, 404);
        assert_eq!(
            transport.requests()[0].path,
            "twins/dev/modules/filter/methods"
        );
    }
}
