//! Attribute tree of a HID peripheral
//!
//! Builds the three services a HID-over-GATT device exposes, in registration
//! order: Device Information, Battery and HID.

use super::constants::*;
use super::tree::{AttributeTree, TreeError};
use super::types::{AttPermissions, CharacteristicProperties as Props, ReportKind};
use crate::hid::HidProfile;

/// Handles of the attributes the engine touches after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceHandles {
    pub device_information: u16,
    pub battery: u16,
    pub hid: u16,
    pub battery_level: u16,
    pub battery_level_cccd: u16,
    pub protocol_mode: u16,
    pub control_point: u16,
    pub input_report: Option<u16>,
    pub input_report_cccd: Option<u16>,
    pub output_report: Option<u16>,
    pub feature_report: Option<u16>,
}

impl ServiceHandles {
    /// Service declaration handles in registration order.
    pub fn registration_order(&self) -> [u16; 3] {
        [self.device_information, self.battery, self.hid]
    }
}

/// Builds the attribute tree for `profile`.
pub fn build_tree(profile: &dyn HidProfile, battery_level: u8) -> Result<(AttributeTree, ServiceHandles), TreeError> {
    let mut tree = AttributeTree::new();
    let mut handles = ServiceHandles::default();

    handles.device_information = tree.add_service(SERVICE_DEVICE_INFORMATION, true)?;
    for uuid in [
        CHARACTERISTIC_MANUFACTURER_NAME,
        CHARACTERISTIC_MODEL_NUMBER,
        CHARACTERISTIC_SERIAL_NUMBER,
    ] {
        tree.add_characteristic(handles.device_information, uuid, Props::READ, AttPermissions::read_only(), None)?;
    }

    handles.battery = tree.add_service(SERVICE_BATTERY, true)?;
    handles.battery_level = tree.add_characteristic(
        handles.battery,
        CHARACTERISTIC_BATTERY_LEVEL,
        Props::READ | Props::NOTIFY,
        AttPermissions::read_only(),
        Some(vec![battery_level.min(100)]),
    )?;
    handles.battery_level_cccd = tree.add_cccd(handles.battery_level)?;

    handles.hid = tree.add_service(SERVICE_HID, true)?;
    tree.add_characteristic(
        handles.hid,
        CHARACTERISTIC_HID_INFORMATION,
        Props::READ,
        AttPermissions::read_only(),
        None,
    )?;
    tree.add_characteristic(handles.hid, CHARACTERISTIC_REPORT_MAP, Props::READ, AttPermissions::read_only(), None)?;
    handles.protocol_mode = tree.add_characteristic(
        handles.hid,
        CHARACTERISTIC_PROTOCOL_MODE,
        Props::READ | Props::WRITE_WITHOUT_RESPONSE,
        AttPermissions::read_write(),
        Some(vec![PROTOCOL_MODE_REPORT]),
    )?;
    handles.control_point = tree.add_characteristic(
        handles.hid,
        CHARACTERISTIC_HID_CONTROL_POINT,
        Props::WRITE_WITHOUT_RESPONSE,
        AttPermissions::write_only(),
        None,
    )?;

    for kind in profile.reports().kinds() {
        let report = tree.add_report(handles.hid, kind)?;
        if kind == ReportKind::Input {
            handles.input_report_cccd = Some(tree.add_cccd(report)?);
        }
        // Served from the characteristic's ReportKind on read
        tree.add_descriptor(report, DESCRIPTOR_REPORT_REFERENCE, AttPermissions::read_only(), None)?;
        match kind {
            ReportKind::Input => handles.input_report = Some(report),
            ReportKind::Output => handles.output_report = Some(report),
            ReportKind::Feature => handles.feature_report = Some(report),
        }
    }

    Ok((tree, handles))
}
