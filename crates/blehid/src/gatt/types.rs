//! Common types for the GATT attribute tree

use super::constants::*;
use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

bitflags! {
    /// Characteristic properties as defined in the Bluetooth specification
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharacteristicProperties: u8 {
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        const EXTENDED_PROPERTIES = 0x80;
    }
}

impl CharacteristicProperties {
    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(&self) -> bool {
        self.intersects(Self::WRITE | Self::WRITE_WITHOUT_RESPONSE)
    }

    pub fn can_notify(&self) -> bool {
        self.contains(Self::NOTIFY)
    }

    pub fn can_indicate(&self) -> bool {
        self.contains(Self::INDICATE)
    }
}

bitflags! {
    /// Attribute access permissions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttPermissions: u16 {
        const READ = 0x0001;
        const WRITE = 0x0002;
        const READ_ENCRYPTED = 0x0004;
        const WRITE_ENCRYPTED = 0x0008;
        const READ_AUTHENTICATED = 0x0010;
        const WRITE_AUTHENTICATED = 0x0020;
    }
}

impl AttPermissions {
    pub fn read_only() -> Self {
        Self::READ
    }

    pub fn write_only() -> Self {
        Self::WRITE
    }

    pub fn read_write() -> Self {
        Self::READ | Self::WRITE
    }
}

/// HID report type carried by a Report characteristic.
///
/// The discriminants are the values used in the Report Reference descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReportKind {
    Input = 0x01,
    Output = 0x02,
    Feature = 0x03,
}

impl ReportKind {
    /// Properties a Report characteristic of this kind is declared with.
    pub fn properties(&self) -> CharacteristicProperties {
        match self {
            ReportKind::Input => CharacteristicProperties::READ | CharacteristicProperties::NOTIFY,
            ReportKind::Output => {
                CharacteristicProperties::READ
                    | CharacteristicProperties::WRITE
                    | CharacteristicProperties::WRITE_WITHOUT_RESPONSE
            }
            ReportKind::Feature => CharacteristicProperties::READ | CharacteristicProperties::WRITE,
        }
    }

    pub fn permissions(&self) -> AttPermissions {
        match self {
            ReportKind::Input => AttPermissions::read_only(),
            ReportKind::Output | ReportKind::Feature => AttPermissions::read_write(),
        }
    }

    /// Report Reference descriptor value: `[report id, report type]`.
    pub fn report_reference(&self, report_id: u8) -> [u8; 2] {
        [report_id, *self as u8]
    }
}

/// Decoded Client Characteristic Configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CccdValue(pub u16);

impl CccdValue {
    /// Decodes a cached descriptor value; anything not two bytes long reads as disabled.
    pub fn from_bytes(value: &[u8]) -> Self {
        if value.len() == 2 {
            CccdValue(LittleEndian::read_u16(value))
        } else {
            CccdValue(0)
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.0 & 0x0001 != 0
    }

    pub fn indications_enabled(&self) -> bool {
        self.0 & 0x0002 != 0
    }
}

/// Encodes the HID Information characteristic value.
pub fn hid_information() -> Vec<u8> {
    let mut value = Vec::with_capacity(4);
    // Writes into a Vec cannot fail.
    let _ = value.write_u16::<LittleEndian>(HID_INFORMATION_BCD_HID);
    value.push(HID_INFORMATION_COUNTRY_CODE);
    value.push(HID_INFORMATION_FLAGS);
    value
}
