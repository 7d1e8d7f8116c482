//! Bulk registry operations
//!
//! Bulk calls send a list of [`ExportImportDevice`] entries in one request.
//! The import mode of each entry is chosen by [`select_import_mode`] from the
//! requested operation, the caller's `force` flag and the ETag carried by the
//! entry.

use crate::models::{
    DeviceIdentity, DeviceStatus, ExportImportDevice, ExportImportDeviceStatus, ImportMode,
    PropertyContainer, TwinData,
};
use crate::precondition::ETag;

/// Mutation requested for a batch of devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    /// Register new identities
    Create,
    /// Replace existing identities
    Update,
    /// Remove identities
    Delete,
    /// Patch twins
    UpdateTwin,
}

/// Choose the import mode of a bulk entry
///
/// `force` selects the unconditional mode. Without `force`, the conditional
/// `*IfMatchETag` mode is used when the entry carries a non-empty ETag. When it
/// carries none there is nothing to match against and the unconditional mode
/// is used, with a warning.
pub fn select_import_mode(operation: BulkOperation, force: bool, etag: Option<&ETag>) -> ImportMode {
    let (unconditional, conditional) = match operation {
        BulkOperation::Create => return ImportMode::Create,
        BulkOperation::Update => (ImportMode::Update, ImportMode::UpdateIfMatchETag),
        BulkOperation::Delete => (ImportMode::Delete, ImportMode::DeleteIfMatchETag),
        BulkOperation::UpdateTwin => (ImportMode::UpdateTwin, ImportMode::UpdateTwinIfMatchETag),
    };

    if force {
        return unconditional;
    }

    match etag {
        Some(etag) if !etag.is_empty() => conditional,
        _ => {
            warn!(
                "No ETag for non-forced {:?}, applying {:?} unconditionally",
                operation, unconditional
            );
            unconditional
        }
    }
}

/// Anything but an explicit `disabled` registers the device as enabled
fn export_status(status: Option<DeviceStatus>) -> ExportImportDeviceStatus {
    match status {
        Some(DeviceStatus::Disabled) => ExportImportDeviceStatus::Disabled,
        _ => ExportImportDeviceStatus::Enabled,
    }
}

fn identity_entry(device: &DeviceIdentity, import_mode: ImportMode) -> ExportImportDevice {
    let mut entry = ExportImportDevice::new(device.device_id.clone(), import_mode);
    entry.authentication = device.authentication.clone();
    entry.capabilities = device.capabilities;
    entry.device_scope = device.device_scope.clone();
    entry.parent_scopes = device.parent_scopes.clone();
    entry.status = Some(export_status(device.status));
    entry.status_reason = device.status_reason.clone();
    entry
}

fn twin_properties(twin: &TwinData) -> PropertyContainer {
    let properties = twin.properties.as_ref();
    PropertyContainer {
        desired: properties.and_then(|p| p.desired.clone()),
        reported: properties.and_then(|p| p.reported.clone()),
    }
}

pub(crate) fn create_entries(devices: &[DeviceIdentity]) -> Vec<ExportImportDevice> {
    devices
        .iter()
        .map(|device| identity_entry(device, ImportMode::Create))
        .collect()
}

pub(crate) fn create_with_twin_entries(
    devices: &[(DeviceIdentity, TwinData)],
) -> Vec<ExportImportDevice> {
    devices
        .iter()
        .map(|(device, twin)| {
            let mut entry = identity_entry(device, ImportMode::Create);
            entry.tags = twin.tags.clone();
            entry.properties = Some(twin_properties(twin));
            entry
        })
        .collect()
}

pub(crate) fn update_entries(devices: &[DeviceIdentity], force: bool) -> Vec<ExportImportDevice> {
    devices
        .iter()
        .map(|device| {
            let mode = select_import_mode(BulkOperation::Update, force, device.etag.as_ref());
            let mut entry = identity_entry(device, mode);
            entry.etag = device.etag.clone();
            entry
        })
        .collect()
}

pub(crate) fn delete_entries(devices: &[DeviceIdentity], force: bool) -> Vec<ExportImportDevice> {
    devices
        .iter()
        .map(|device| {
            let mode = select_import_mode(BulkOperation::Delete, force, device.etag.as_ref());
            let mut entry = ExportImportDevice::new(device.device_id.clone(), mode);
            entry.etag = device.etag.clone();
            entry
        })
        .collect()
}

pub(crate) fn update_twin_entries(
    twins: &[TwinData],
    force: bool,
) -> crate::Result<Vec<ExportImportDevice>> {
    twins
        .iter()
        .map(|twin| {
            let mode = select_import_mode(BulkOperation::UpdateTwin, force, twin.etag.as_ref());
            let mut entry = ExportImportDevice::new(twin.require_device_id()?, mode);
            entry.tags = twin.tags.clone();
            entry.properties = Some(twin_properties(twin));
            entry.twin_etag = twin.etag.clone();
            Ok(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_OPERATIONS: [BulkOperation; 4] = [
        BulkOperation::Create,
        BulkOperation::Update,
        BulkOperation::Delete,
        BulkOperation::UpdateTwin,
    ];

    #[test]
    fn force_is_always_unconditional() {
        let etag = ETag::new("AAAAAAAAAAE=");
        for operation in ALL_OPERATIONS.iter().copied() {
            for etag in [None, Some(&etag)].iter().copied() {
                let mode = select_import_mode(operation, true, etag);
                assert!(!mode.is_conditional(), "{:?} with {:?}", operation, etag);
            }
        }
    }

    #[test]
    fn etag_without_force_is_conditional() {
        let etag = ETag::new("AAAAAAAAAAE=");
        let cases = vec![
            (BulkOperation::Update, ImportMode::UpdateIfMatchETag),
            (BulkOperation::Delete, ImportMode::DeleteIfMatchETag),
            (BulkOperation::UpdateTwin, ImportMode::UpdateTwinIfMatchETag),
        ];

        for (operation, expected) in cases {
            assert_eq!(select_import_mode(operation, false, Some(&etag)), expected);
        }
    }

    #[test]
    fn missing_or_empty_etag_falls_back_to_unconditional() {
        let empty = ETag::new("");
        let cases = vec![
            (BulkOperation::Update, ImportMode::Update),
            (BulkOperation::Delete, ImportMode::Delete),
            (BulkOperation::UpdateTwin, ImportMode::UpdateTwin),
        ];

        for (operation, expected) in cases {
            assert_eq!(select_import_mode(operation, false, None), expected);
            assert_eq!(select_import_mode(operation, false, Some(&empty)), expected);
        }
    }

    #[test]
    fn create_ignores_force_and_etag() {
        let etag = ETag::new("x");
        assert_eq!(select_import_mode(BulkOperation::Create, false, Some(&etag)), ImportMode::Create);
        assert_eq!(select_import_mode(BulkOperation::Create, true, None), ImportMode::Create);
    }

    #[test]
    fn identity_status_maps_to_export_status() {
        let mut disabled = DeviceIdentity::new("a");
        disabled.status = Some(DeviceStatus::Disabled);
        let mut unknown = DeviceIdentity::new("b");
        unknown.status = Some(DeviceStatus::Unknown);
        let unset = DeviceIdentity::new("c");

        let entries = create_entries(&[disabled, unknown, unset]);
        let statuses: Vec<_> = entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                Some(ExportImportDeviceStatus::Disabled),
                Some(ExportImportDeviceStatus::Enabled),
                Some(ExportImportDeviceStatus::Enabled),
            ]
        );
    }

    #[test]
    fn delete_entries_carry_only_id_and_etag() {
        let mut device = DeviceIdentity::new("dev-1");
        device.etag = Some(ETag::new("e1"));
        device.status_reason = Some("retired".to_string());

        let entries = delete_entries(&[device], false);
        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            json!([{ "id": "dev-1", "eTag": "e1", "importMode": "deleteIfMatchETag" }])
        );
    }

    #[test]
    fn create_with_twin_copies_tags_and_properties() {
        let device = DeviceIdentity::new("dev-1");
        let twin = TwinData::for_device("dev-1")
            .with_tag("site", json!("north"))
            .with_desired("interval", json!(30));

        let entries = create_with_twin_entries(&[(device, twin)]);
        assert_eq!(entries[0].import_mode, ImportMode::Create);
        assert_eq!(entries[0].tags.as_ref().unwrap()["site"], json!("north"));
        assert_eq!(
            entries[0].properties.as_ref().unwrap().desired.as_ref().unwrap()["interval"],
            json!(30)
        );
    }

    #[test]
    fn twin_entries_use_twin_etag() {
        let mut twin = TwinData::for_device("dev-1").with_desired("mode", json!("eco"));
        twin.etag = Some(ETag::new("t9"));

        let entries = update_twin_entries(&[twin], false).unwrap();
        assert_eq!(entries[0].import_mode, ImportMode::UpdateTwinIfMatchETag);
        assert_eq!(entries[0].twin_etag, Some(ETag::new("t9")));
        assert!(entries[0].etag.is_none());
    }

    #[test]
    fn twin_entries_require_device_id() {
        assert!(update_twin_entries(&[TwinData::default()], true).is_err());
    }
}
