use hyper::{Method, StatusCode};
use std::sync::Arc;

use crate::bulk;
use crate::error::IoTHubError;
#[cfg(feature = "direct-methods")]
use crate::models::{CloudToDeviceMethodRequest, CloudToDeviceMethodResponse};
use crate::models::{
    BulkRegistryOperationResult, DeviceIdentity, ExportImportDevice, QuerySpecification, TwinData,
};
use crate::pager::Pageable;
use crate::precondition::IfMatch;
use crate::query::query_pager;
use crate::response::{RawResponse, Response};
use crate::transport::{
    check_status, path_segment, send_empty, send_json, HttpRequest, Transport,
};

const BULK_PATH: &str = "devices";

/// Device identities and twins in the hub registry
#[derive(Debug, Clone)]
pub struct DevicesClient {
    transport: Arc<dyn Transport>,
}

impl DevicesClient {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        DevicesClient { transport }
    }

    /// Register a new device identity
    ///
    /// Fails with a `409` API error if the device already exists.
    pub async fn create_identity(
        &self,
        device: &DeviceIdentity,
    ) -> crate::Result<Response<DeviceIdentity>> {
        let request =
            HttpRequest::new(Method::PUT, identity_path(&device.device_id)).json(device)?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Fetch a device identity
    pub async fn get_identity(&self, device_id: &str) -> crate::Result<Response<DeviceIdentity>> {
        let request = HttpRequest::new(Method::GET, identity_path(device_id));
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Replace a device identity
    ///
    /// With `if_match` the hub rejects the update with
    /// [`IoTHubError::PreconditionFailed`] when the stored ETag differs.
    pub async fn update_identity(
        &self,
        device: &DeviceIdentity,
        if_match: Option<IfMatch>,
    ) -> crate::Result<Response<DeviceIdentity>> {
        let request = HttpRequest::new(Method::PUT, identity_path(&device.device_id))
            .json(device)?
            .if_match(if_match.as_ref())?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Remove a device identity
    pub async fn delete_identity(
        &self,
        device_id: &str,
        if_match: Option<IfMatch>,
    ) -> crate::Result<RawResponse> {
        let request =
            HttpRequest::new(Method::DELETE, identity_path(device_id)).if_match(if_match.as_ref())?;
        send_empty(
            self.transport.as_ref(),
            request,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    /// Register several devices in one request
    pub async fn create_identities(
        &self,
        devices: &[DeviceIdentity],
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        self.bulk(&bulk::create_entries(devices)).await
    }

    /// Register several devices along with the initial state of their twins
    pub async fn create_identities_with_twin(
        &self,
        devices: &[(DeviceIdentity, TwinData)],
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        self.bulk(&bulk::create_with_twin_entries(devices)).await
    }

    /// Replace several device identities
    ///
    /// Unless `force` is set, identities carrying an ETag are only updated
    /// when it still matches.
    pub async fn update_identities(
        &self,
        devices: &[DeviceIdentity],
        force: bool,
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        self.bulk(&bulk::update_entries(devices, force)).await
    }

    /// Remove several device identities
    ///
    /// Unless `force` is set, identities carrying an ETag are only removed
    /// when it still matches.
    pub async fn delete_identities(
        &self,
        devices: &[DeviceIdentity],
        force: bool,
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        self.bulk(&bulk::delete_entries(devices, force)).await
    }

    /// Twins of every device in the hub, one page at a time
    pub fn get_twins(&self) -> Pageable<TwinData> {
        query_pager(self.transport.clone(), QuerySpecification::all_devices())
    }

    ///
    pub async fn get_twin(&self, device_id: &str) -> crate::Result<Response<TwinData>> {
        let request = HttpRequest::new(Method::GET, twin_path(device_id));
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Patch tags and desired properties of a device twin
    pub async fn update_twin(
        &self,
        twin: &TwinData,
        if_match: Option<IfMatch>,
    ) -> crate::Result<Response<TwinData>> {
        let request = HttpRequest::new(Method::PATCH, twin_path(twin.require_device_id()?))
            .json(twin)?
            .if_match(if_match.as_ref())?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    /// Patch several device twins in one request
    pub async fn update_twins(
        &self,
        twins: &[TwinData],
        force: bool,
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        self.bulk(&bulk::update_twin_entries(twins, force)?).await
    }

    /// Invoke a direct method on a connected device
    #[cfg(feature = "direct-methods")]
    pub async fn invoke_method(
        &self,
        device_id: &str,
        method: &CloudToDeviceMethodRequest,
    ) -> crate::Result<Response<CloudToDeviceMethodResponse>> {
        let path = format!("{}/methods", twin_path(device_id));
        let request = HttpRequest::new(Method::POST, path).json(method)?;
        send_json(self.transport.as_ref(), request, &[StatusCode::OK]).await
    }

    async fn bulk(
        &self,
        entries: &[ExportImportDevice],
    ) -> crate::Result<Response<BulkRegistryOperationResult>> {
        debug!("Bulk registry operation on {} devices", entries.len());

        let request = HttpRequest::new(Method::POST, BULK_PATH).json(entries)?;
        let response = check_status(
            self.transport.send(request).await?,
            &[StatusCode::OK, StatusCode::BAD_REQUEST],
        )?;

        // A 400 only carries a result when the hub validated the batch
        let result: BulkRegistryOperationResult = match serde_json::from_slice(&response.body) {
            Ok(result) => result,
            Err(_) if response.status == StatusCode::BAD_REQUEST => {
                return Err(IoTHubError::Api {
                    status: response.status,
                    body: response.body_text(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if !result.is_successful {
            warn!(
                "Bulk registry operation failed for {} devices",
                result.errors.len()
            );
        }

        Ok(Response::new(result, response.raw()))
    }
}

fn identity_path(device_id: &str) -> String {
    format!("devices/{}", path_segment(device_id))
}

fn twin_path(device_id: &str) -> String {
    format!("twins/{}", path_segment(device_id))
}
