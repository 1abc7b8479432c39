//! GATT request router
//!
//! Answers remote reads and writes against the HID peripheral's attribute
//! tree. Requests are dispatched on the attribute's UUID; Report
//! characteristics, which share a UUID, are told apart by their handle and
//! `ReportKind`.

use super::constants::*;
use super::status::GattStatus;
use super::tree::AttributeTree;
use super::types::hid_information;
use crate::config::DeviceIdentity;
use crate::hid::HidProfile;
use log::{debug, info, trace, warn};

/// Answer to a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: GattStatus,
    pub value: Option<Vec<u8>>,
}

impl Response {
    pub fn success(value: Vec<u8>) -> Self {
        Self {
            status: GattStatus::Success,
            value: Some(value),
        }
    }

    pub fn error(status: GattStatus) -> Self {
        Self { status, value: None }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Payload starting at `offset`; empty once the offset reaches the end.
fn slice_from(value: &[u8], offset: u16) -> Vec<u8> {
    value.get(offset as usize..).map(<[u8]>::to_vec).unwrap_or_default()
}

/// Borrows the engine's state for the duration of one request
pub struct GattRouter<'a> {
    tree: &'a mut AttributeTree,
    profile: &'a mut dyn HidProfile,
    identity: &'a DeviceIdentity,
}

impl<'a> GattRouter<'a> {
    pub fn new(tree: &'a mut AttributeTree, profile: &'a mut dyn HidProfile, identity: &'a DeviceIdentity) -> Self {
        Self {
            tree,
            profile,
            identity,
        }
    }

    pub fn read_characteristic(&self, handle: u16, offset: u16) -> Response {
        let Some(characteristic) = self.tree.characteristic(handle) else {
            warn!("Read of unknown characteristic 0x{:04x}", handle);
            return Response::error(GattStatus::ReadNotPermitted);
        };

        let uuid = characteristic.uuid;
        let value = if uuid == CHARACTERISTIC_HID_INFORMATION {
            hid_information()
        } else if uuid == CHARACTERISTIC_REPORT_MAP {
            self.profile.report_descriptor().to_vec()
        } else if uuid == CHARACTERISTIC_MANUFACTURER_NAME {
            self.identity.manufacturer.as_bytes().to_vec()
        } else if uuid == CHARACTERISTIC_MODEL_NUMBER {
            self.identity.device_name.as_bytes().to_vec()
        } else if uuid == CHARACTERISTIC_SERIAL_NUMBER {
            self.identity.serial_number.as_bytes().to_vec()
        } else if uuid == CHARACTERISTIC_BATTERY_LEVEL {
            characteristic.value.clone().unwrap_or_else(|| vec![100])
        } else if uuid == CHARACTERISTIC_PROTOCOL_MODE {
            characteristic
                .value
                .clone()
                .unwrap_or_else(|| vec![PROTOCOL_MODE_REPORT])
        } else if uuid == CHARACTERISTIC_REPORT {
            characteristic.value.clone().unwrap_or_default()
        } else {
            warn!("Read of characteristic {} not permitted", uuid);
            return Response::error(GattStatus::ReadNotPermitted);
        };

        trace!("Read 0x{:04x} at offset {}: {}", handle, offset, hex::encode(&value));
        Response::success(slice_from(&value, offset))
    }

    pub fn read_descriptor(&self, handle: u16, offset: u16) -> Response {
        let Some(descriptor) = self.tree.descriptor(handle) else {
            warn!("Read of unknown descriptor 0x{:04x}", handle);
            return Response::error(GattStatus::ReadNotPermitted);
        };

        let value = if descriptor.uuid == DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION {
            descriptor.value.clone().unwrap_or_else(|| CCCD_DISABLED.to_vec())
        } else if descriptor.uuid == DESCRIPTOR_REPORT_REFERENCE {
            let kind = self
                .tree
                .characteristic(descriptor.characteristic_handle)
                .filter(|c| c.uuid == CHARACTERISTIC_REPORT)
                .and_then(|c| c.report_kind);
            match kind {
                Some(kind) => kind.report_reference(self.profile.report_id()).to_vec(),
                None => {
                    warn!("Report Reference 0x{:04x} is not on a Report characteristic", handle);
                    return Response::error(GattStatus::Other(GATT_FAILURE));
                }
            }
        } else {
            warn!("Read of descriptor {} not permitted", descriptor.uuid);
            return Response::error(GattStatus::ReadNotPermitted);
        };

        Response::success(slice_from(&value, offset))
    }

    pub fn write_characteristic(&mut self, handle: u16, value: &[u8]) -> Response {
        let Some(characteristic) = self.tree.characteristic_mut(handle) else {
            warn!("Write to unknown characteristic 0x{:04x}", handle);
            return Response::error(GattStatus::WriteNotPermitted);
        };

        let uuid = characteristic.uuid;
        if uuid == CHARACTERISTIC_REPORT {
            debug!("{:?} report written: {}", characteristic.report_kind, hex::encode(value));
            characteristic.value = Some(value.to_vec());
            self.profile.handle_output_report(value);
        } else if uuid == CHARACTERISTIC_PROTOCOL_MODE {
            if value.is_empty() {
                return Response::error(GattStatus::InvalidAttributeValueLength);
            }
            match value[0] {
                PROTOCOL_MODE_BOOT => info!("Host selected boot protocol mode"),
                PROTOCOL_MODE_REPORT => info!("Host selected report protocol mode"),
                other => warn!("Unknown protocol mode 0x{:02x}", other),
            }
            characteristic.value = Some(value.to_vec());
        } else if uuid == CHARACTERISTIC_HID_CONTROL_POINT {
            match value.first() {
                Some(&CONTROL_POINT_SUSPEND) => info!("Host suspended"),
                Some(&CONTROL_POINT_EXIT_SUSPEND) => info!("Host exited suspend"),
                Some(other) => warn!("Unknown HID control point command 0x{:02x}", other),
                None => return Response::error(GattStatus::InvalidAttributeValueLength),
            }
        } else {
            warn!("Write to characteristic {} not permitted", uuid);
            return Response::error(GattStatus::WriteNotPermitted);
        }

        Response::success(value.to_vec())
    }

    pub fn write_descriptor(&mut self, handle: u16, value: &[u8]) -> Response {
        let Some(descriptor) = self.tree.descriptor_mut(handle) else {
            warn!("Write to unknown descriptor 0x{:04x}", handle);
            return Response::error(GattStatus::WriteNotPermitted);
        };

        if descriptor.uuid != DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION {
            warn!("Write to descriptor {} not permitted", descriptor.uuid);
            return Response::error(GattStatus::WriteNotPermitted);
        }
        if value != CCCD_NOTIFICATIONS_ENABLED && value != CCCD_DISABLED {
            warn!("Rejecting CCCD value {}", hex::encode(value));
            return Response::error(GattStatus::InvalidAttributeValueLength);
        }

        debug!(
            "Notifications {} on 0x{:04x}",
            if value == CCCD_NOTIFICATIONS_ENABLED { "enabled" } else { "disabled" },
            descriptor.characteristic_handle
        );
        descriptor.value = Some(value.to_vec());
        Response::success(value.to_vec())
    }
}
