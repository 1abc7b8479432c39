//! Unit tests for the attribute tree and request router

use super::constants::*;
use super::*;
use crate::config::DeviceIdentity;
use crate::hid::{HidProfile, KeyboardProfile, LedState, MouseProfile};

fn keyboard_tree() -> (AttributeTree, ServiceHandles, KeyboardProfile) {
    let profile = KeyboardProfile::new();
    let (tree, handles) = build_tree(&profile, 87).unwrap();
    (tree, handles, profile)
}

fn handle_of(tree: &AttributeTree, uuid: crate::uuid::Uuid) -> u16 {
    tree.find_characteristic(uuid).unwrap().value_handle
}

fn report_reference(tree: &AttributeTree, report: u16) -> u16 {
    tree.find_descriptor(report, DESCRIPTOR_REPORT_REFERENCE).unwrap().handle
}

#[test]
fn test_tree_layout() {
    let (tree, handles, _) = keyboard_tree();

    let uuids: Vec<_> = tree.services().map(|s| s.uuid).collect();
    assert_eq!(uuids, vec![SERVICE_DEVICE_INFORMATION, SERVICE_BATTERY, SERVICE_HID]);
    assert_eq!(
        handles.registration_order().to_vec(),
        tree.services().map(|s| s.handle).collect::<Vec<_>>()
    );

    let hid: Vec<_> = tree.characteristics_of(handles.hid).map(|c| c.uuid).collect();
    assert_eq!(
        hid,
        vec![
            CHARACTERISTIC_HID_INFORMATION,
            CHARACTERISTIC_REPORT_MAP,
            CHARACTERISTIC_PROTOCOL_MODE,
            CHARACTERISTIC_HID_CONTROL_POINT,
            CHARACTERISTIC_REPORT,
            CHARACTERISTIC_REPORT,
        ]
    );

    let input = handles.input_report.unwrap();
    let output = handles.output_report.unwrap();
    assert_ne!(input, output);
    assert!(handles.feature_report.is_none());
    assert_eq!(tree.characteristic(input).unwrap().report_kind, Some(ReportKind::Input));
    assert_eq!(tree.characteristic(output).unwrap().report_kind, Some(ReportKind::Output));

    let input_descriptors: Vec<_> = tree.descriptors_of(input).map(|d| d.uuid).collect();
    assert_eq!(
        input_descriptors,
        vec![DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION, DESCRIPTOR_REPORT_REFERENCE]
    );
    assert!(tree.find_descriptor(output, DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION).is_none());

    let hid_service = tree.service(handles.hid).unwrap();
    assert_eq!(hid_service.end_handle as usize, tree.handle_count());
}

#[test]
fn test_mouse_has_single_report() {
    let profile = MouseProfile::new();
    let (tree, handles) = build_tree(&profile, 100).unwrap();
    assert!(handles.input_report.is_some());
    assert!(handles.output_report.is_none());
    let reports = tree
        .characteristics_of(handles.hid)
        .filter(|c| c.uuid == CHARACTERISTIC_REPORT)
        .count();
    assert_eq!(reports, 1);
}

#[test]
fn test_cccd_requires_notify() {
    let mut tree = AttributeTree::new();
    let service = tree.add_service(SERVICE_HID, true).unwrap();
    let map = tree
        .add_characteristic(service, CHARACTERISTIC_REPORT_MAP, CharacteristicProperties::READ, AttPermissions::read_only(), None)
        .unwrap();
    assert_eq!(tree.add_cccd(map), Err(TreeError::NotNotifiable(map)));
    assert_eq!(tree.add_cccd(0x0F00), Err(TreeError::CharacteristicNotFound(0x0F00)));
    assert_eq!(
        tree.add_characteristic(0x0F00, CHARACTERISTIC_REPORT, CharacteristicProperties::READ, AttPermissions::read_only(), None),
        Err(TreeError::ServiceNotFound(0x0F00))
    );
}

#[test]
fn test_static_reads() {
    let (mut tree, _, mut profile) = keyboard_tree();
    let identity = DeviceIdentity {
        manufacturer: "Acme".into(),
        device_name: "Typist".into(),
        serial_number: "42".into(),
    };
    let info = handle_of(&tree, CHARACTERISTIC_HID_INFORMATION);
    let map = handle_of(&tree, CHARACTERISTIC_REPORT_MAP);
    let manufacturer = handle_of(&tree, CHARACTERISTIC_MANUFACTURER_NAME);
    let model = handle_of(&tree, CHARACTERISTIC_MODEL_NUMBER);
    let serial = handle_of(&tree, CHARACTERISTIC_SERIAL_NUMBER);
    let battery = handle_of(&tree, CHARACTERISTIC_BATTERY_LEVEL);
    let expected_map = profile.report_descriptor().to_vec();

    let router = GattRouter::new(&mut tree, &mut profile, &identity);
    assert_eq!(router.read_characteristic(info, 0), Response::success(vec![0x11, 0x01, 0x00, 0x03]));
    assert_eq!(router.read_characteristic(map, 0), Response::success(expected_map.clone()));
    assert_eq!(router.read_characteristic(map, 4), Response::success(expected_map[4..].to_vec()));
    assert_eq!(router.read_characteristic(manufacturer, 0), Response::success(b"Acme".to_vec()));
    assert_eq!(router.read_characteristic(model, 0), Response::success(b"Typist".to_vec()));
    assert_eq!(router.read_characteristic(serial, 0), Response::success(b"42".to_vec()));
    assert_eq!(router.read_characteristic(battery, 0), Response::success(vec![87]));
}

#[test]
fn test_read_offset_past_end_is_empty_success() {
    let (mut tree, _, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let info = handle_of(&tree, CHARACTERISTIC_HID_INFORMATION);
    let router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.read_characteristic(info, 4), Response::success(Vec::new()));
    assert_eq!(router.read_characteristic(info, 200), Response::success(Vec::new()));
    assert_eq!(router.read_characteristic(info, 3), Response::success(vec![0x03]));
}

#[test]
fn test_unknown_handles() {
    let (mut tree, handles, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let mut router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.read_characteristic(0x0F00, 0), Response::error(GattStatus::ReadNotPermitted));
    assert_eq!(router.read_descriptor(0x0F00, 0), Response::error(GattStatus::ReadNotPermitted));
    assert_eq!(router.write_characteristic(0x0F00, &[1]), Response::error(GattStatus::WriteNotPermitted));
    assert_eq!(router.write_descriptor(0x0F00, &[1, 0]), Response::error(GattStatus::WriteNotPermitted));

    // Control point is write-only
    assert_eq!(
        router.read_characteristic(handles.control_point, 0),
        Response::error(GattStatus::ReadNotPermitted)
    );
    // Battery level is read-only
    assert_eq!(
        router.write_characteristic(handles.battery_level, &[5]),
        Response::error(GattStatus::WriteNotPermitted)
    );
}

#[test]
fn test_report_reference_uses_report_kind() {
    let (mut tree, handles, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let input_ref = report_reference(&tree, handles.input_report.unwrap());
    let output_ref = report_reference(&tree, handles.output_report.unwrap());
    assert_eq!(tree.descriptor(input_ref).unwrap().value, None);
    assert_eq!(tree.descriptor(output_ref).unwrap().value, None);
    let router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.read_descriptor(input_ref, 0), Response::success(vec![0x01, 0x01]));
    assert_eq!(router.read_descriptor(output_ref, 0), Response::success(vec![0x01, 0x02]));
    assert_eq!(router.read_descriptor(output_ref, 1), Response::success(vec![0x02]));
}

#[test]
fn test_report_reference_off_report_fails() {
    let mut tree = AttributeTree::new();
    let service = tree.add_service(SERVICE_BATTERY, true).unwrap();
    let level = tree
        .add_characteristic(service, CHARACTERISTIC_BATTERY_LEVEL, CharacteristicProperties::READ, AttPermissions::read_only(), None)
        .unwrap();
    let descriptor = tree
        .add_descriptor(level, DESCRIPTOR_REPORT_REFERENCE, AttPermissions::read_only(), None)
        .unwrap();
    let unknown = tree
        .add_descriptor(level, crate::uuid::Uuid::from_u16(0x2901), AttPermissions::read_only(), None)
        .unwrap();

    let mut profile = MouseProfile::new();
    let identity = DeviceIdentity::default();
    let router = GattRouter::new(&mut tree, &mut profile, &identity);
    assert_eq!(router.read_descriptor(descriptor, 0), Response::error(GattStatus::Other(GATT_FAILURE)));
    assert_eq!(router.read_descriptor(unknown, 0), Response::error(GattStatus::ReadNotPermitted));
}

#[test]
fn test_cccd_write_and_read() {
    let (mut tree, handles, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let cccd = handles.input_report_cccd.unwrap();
    let mut router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.read_descriptor(cccd, 0), Response::success(vec![0, 0]));
    assert_eq!(router.write_descriptor(cccd, &[0x01, 0x00]), Response::success(vec![0x01, 0x00]));
    assert_eq!(router.read_descriptor(cccd, 0), Response::success(vec![0x01, 0x00]));

    for bad in [&[0x02, 0x00][..], &[0x01][..], &[][..], &[0x01, 0x00, 0x00][..]] {
        assert_eq!(
            router.write_descriptor(cccd, bad),
            Response::error(GattStatus::InvalidAttributeValueLength)
        );
    }
    assert_eq!(router.write_descriptor(cccd, &[0x00, 0x00]), Response::success(vec![0, 0]));
    drop(router);
    assert!(!CccdValue::from_bytes(tree.descriptor(cccd).unwrap().value.as_deref().unwrap()).notifications_enabled());

    let reference = report_reference(&tree, handles.input_report.unwrap());
    let mut router = GattRouter::new(&mut tree, &mut profile, &identity);
    assert_eq!(
        router.write_descriptor(reference, &[0x01, 0x00]),
        Response::error(GattStatus::WriteNotPermitted)
    );
}

#[test]
fn test_output_report_reaches_profile() {
    let (mut tree, handles, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let output = handles.output_report.unwrap();
    let mut router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.write_characteristic(output, &[0x01, 0x02]), Response::success(vec![0x01, 0x02]));
    assert_eq!(router.read_characteristic(output, 0), Response::success(vec![0x01, 0x02]));
    // Input report has nothing cached yet
    assert_eq!(
        router.read_characteristic(handles.input_report.unwrap(), 0),
        Response::success(Vec::new())
    );
    drop(router);
    assert_eq!(profile.leds(), LedState::CAPS_LOCK);
}

#[test]
fn test_protocol_mode_and_control_point() {
    let (mut tree, handles, mut profile) = keyboard_tree();
    let identity = DeviceIdentity::default();
    let mut router = GattRouter::new(&mut tree, &mut profile, &identity);

    assert_eq!(router.read_characteristic(handles.protocol_mode, 0), Response::success(vec![0x01]));
    assert_eq!(
        router.write_characteristic(handles.protocol_mode, &[]),
        Response::error(GattStatus::InvalidAttributeValueLength)
    );
    assert_eq!(router.write_characteristic(handles.protocol_mode, &[0x00]), Response::success(vec![0x00]));
    assert_eq!(router.read_characteristic(handles.protocol_mode, 0), Response::success(vec![0x00]));

    assert_eq!(router.write_characteristic(handles.control_point, &[0x00]), Response::success(vec![0x00]));
    assert_eq!(router.write_characteristic(handles.control_point, &[0x01]), Response::success(vec![0x01]));
    assert_eq!(
        router.write_characteristic(handles.control_point, &[]),
        Response::error(GattStatus::InvalidAttributeValueLength)
    );
}
