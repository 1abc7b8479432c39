//! GATT and HID-over-GATT constants

use crate::uuid::Uuid;

// Services
pub const SERVICE_DEVICE_INFORMATION: Uuid = Uuid::from_u16(0x180A);
pub const SERVICE_BATTERY: Uuid = Uuid::from_u16(0x180F);
pub const SERVICE_HID: Uuid = Uuid::from_u16(0x1812);

// Device Information characteristics
pub const CHARACTERISTIC_MANUFACTURER_NAME: Uuid = Uuid::from_u16(0x2A29);
pub const CHARACTERISTIC_MODEL_NUMBER: Uuid = Uuid::from_u16(0x2A24);
pub const CHARACTERISTIC_SERIAL_NUMBER: Uuid = Uuid::from_u16(0x2A25);

// Battery characteristics
pub const CHARACTERISTIC_BATTERY_LEVEL: Uuid = Uuid::from_u16(0x2A19);

// HID characteristics
pub const CHARACTERISTIC_HID_INFORMATION: Uuid = Uuid::from_u16(0x2A4A);
pub const CHARACTERISTIC_REPORT_MAP: Uuid = Uuid::from_u16(0x2A4B);
pub const CHARACTERISTIC_HID_CONTROL_POINT: Uuid = Uuid::from_u16(0x2A4C);
pub const CHARACTERISTIC_REPORT: Uuid = Uuid::from_u16(0x2A4D);
pub const CHARACTERISTIC_PROTOCOL_MODE: Uuid = Uuid::from_u16(0x2A4E);

// Descriptors
pub const DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION: Uuid = Uuid::from_u16(0x2902);
pub const DESCRIPTOR_REPORT_REFERENCE: Uuid = Uuid::from_u16(0x2908);

// ATT status codes
pub const GATT_SUCCESS: u8 = 0x00;
pub const GATT_INVALID_HANDLE: u8 = 0x01;
pub const GATT_READ_NOT_PERMITTED: u8 = 0x02;
pub const GATT_WRITE_NOT_PERMITTED: u8 = 0x03;
pub const GATT_INVALID_PDU: u8 = 0x04;
pub const GATT_INSUFFICIENT_AUTHENTICATION: u8 = 0x05;
pub const GATT_REQUEST_NOT_SUPPORTED: u8 = 0x06;
pub const GATT_INVALID_OFFSET: u8 = 0x07;
pub const GATT_INSUFFICIENT_AUTHORIZATION: u8 = 0x08;
pub const GATT_INVALID_ATTRIBUTE_VALUE_LENGTH: u8 = 0x0D;
pub const GATT_UNLIKELY: u8 = 0x0E;
pub const GATT_INSUFFICIENT_ENCRYPTION: u8 = 0x0F;

/// Generic failure status reported by stacks for connection-level errors.
pub const GATT_FAILURE: u8 = 0x85;

// CCCD values
pub const CCCD_NOTIFICATIONS_ENABLED: [u8; 2] = [0x01, 0x00];
pub const CCCD_INDICATIONS_ENABLED: [u8; 2] = [0x02, 0x00];
pub const CCCD_DISABLED: [u8; 2] = [0x00, 0x00];

// Protocol mode values
pub const PROTOCOL_MODE_BOOT: u8 = 0x00;
pub const PROTOCOL_MODE_REPORT: u8 = 0x01;

// HID control point commands
pub const CONTROL_POINT_SUSPEND: u8 = 0x00;
pub const CONTROL_POINT_EXIT_SUSPEND: u8 = 0x01;

/// HID information: bcdHID 1.11, country code 0, RemoteWake | NormallyConnectable.
pub const HID_INFORMATION_BCD_HID: u16 = 0x0111;
pub const HID_INFORMATION_COUNTRY_CODE: u8 = 0x00;
pub const HID_INFORMATION_FLAGS: u8 = 0x03;
