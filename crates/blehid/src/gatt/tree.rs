//! GATT attribute tree
//!
//! Services, characteristics and descriptors with their handles, as handed
//! to the stack for registration. Cached values (CCCD state, protocol mode,
//! report values) live on the nodes themselves. Characteristics are keyed by
//! value handle, so several characteristics may share a UUID.

use super::constants::*;
use super::types::{AttPermissions, CharacteristicProperties, ReportKind};
use crate::uuid::Uuid;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("No service with handle 0x{0:04x}")]
    ServiceNotFound(u16),

    #[error("No characteristic with value handle 0x{0:04x}")]
    CharacteristicNotFound(u16),

    #[error("No descriptor with handle 0x{0:04x}")]
    DescriptorNotFound(u16),

    #[error("Characteristic 0x{0:04x} neither notifies nor indicates")]
    NotNotifiable(u16),

    #[error("Attribute handles exhausted")]
    HandlesExhausted,
}

/// A service with its characteristics
#[derive(Debug, Clone)]
pub struct GattService {
    /// Service declaration handle
    pub handle: u16,
    pub uuid: Uuid,
    pub is_primary: bool,
    /// Value handles of the service's characteristics, in declaration order
    pub characteristics: Vec<u16>,
    /// Last handle belonging to the service
    pub end_handle: u16,
}

/// A characteristic with its cached value
#[derive(Debug, Clone)]
pub struct GattCharacteristic {
    pub declaration_handle: u16,
    pub value_handle: u16,
    pub service_handle: u16,
    pub uuid: Uuid,
    pub properties: CharacteristicProperties,
    pub permissions: AttPermissions,
    /// Set for HID Report characteristics
    pub report_kind: Option<ReportKind>,
    /// Handles of the characteristic's descriptors
    pub descriptors: Vec<u16>,
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct GattDescriptor {
    pub handle: u16,
    pub characteristic_handle: u16,
    pub uuid: Uuid,
    pub permissions: AttPermissions,
    pub value: Option<Vec<u8>>,
}

/// Attribute tree of the local GATT server
#[derive(Debug)]
pub struct AttributeTree {
    services: BTreeMap<u16, GattService>,
    characteristics: BTreeMap<u16, GattCharacteristic>,
    descriptors: BTreeMap<u16, GattDescriptor>,
    next_handle: u16,
}

impl Default for AttributeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeTree {
    pub fn new() -> Self {
        Self {
            services: BTreeMap::new(),
            characteristics: BTreeMap::new(),
            descriptors: BTreeMap::new(),
            next_handle: 1,
        }
    }

    fn allocate(&mut self) -> Result<u16, TreeError> {
        let handle = self.next_handle;
        if handle == 0 {
            return Err(TreeError::HandlesExhausted);
        }
        // Wraps to 0 after 0xFFFF, which marks exhaustion.
        self.next_handle = handle.wrapping_add(1);
        Ok(handle)
    }

    /// Add a service, returning its declaration handle.
    pub fn add_service(&mut self, uuid: Uuid, is_primary: bool) -> Result<u16, TreeError> {
        let handle = self.allocate()?;
        self.services.insert(
            handle,
            GattService {
                handle,
                uuid,
                is_primary,
                characteristics: Vec::new(),
                end_handle: handle,
            },
        );
        Ok(handle)
    }

    /// Add a characteristic to a service, returning its value handle.
    pub fn add_characteristic(
        &mut self,
        service_handle: u16,
        uuid: Uuid,
        properties: CharacteristicProperties,
        permissions: AttPermissions,
        initial_value: Option<Vec<u8>>,
    ) -> Result<u16, TreeError> {
        self.insert_characteristic(service_handle, uuid, properties, permissions, None, initial_value)
    }

    /// Add a HID Report characteristic of the given kind, returning its value handle.
    pub fn add_report(&mut self, service_handle: u16, kind: ReportKind) -> Result<u16, TreeError> {
        self.insert_characteristic(
            service_handle,
            CHARACTERISTIC_REPORT,
            kind.properties(),
            kind.permissions(),
            Some(kind),
            None,
        )
    }

    fn insert_characteristic(
        &mut self,
        service_handle: u16,
        uuid: Uuid,
        properties: CharacteristicProperties,
        permissions: AttPermissions,
        report_kind: Option<ReportKind>,
        initial_value: Option<Vec<u8>>,
    ) -> Result<u16, TreeError> {
        if !self.services.contains_key(&service_handle) {
            return Err(TreeError::ServiceNotFound(service_handle));
        }
        let declaration_handle = self.allocate()?;
        let value_handle = self.allocate()?;

        self.characteristics.insert(
            value_handle,
            GattCharacteristic {
                declaration_handle,
                value_handle,
                service_handle,
                uuid,
                properties,
                permissions,
                report_kind,
                descriptors: Vec::new(),
                value: initial_value,
            },
        );
        if let Some(service) = self.services.get_mut(&service_handle) {
            service.characteristics.push(value_handle);
            service.end_handle = value_handle;
        }
        Ok(value_handle)
    }

    /// Add a descriptor to a characteristic, returning its handle.
    pub fn add_descriptor(
        &mut self,
        characteristic_handle: u16,
        uuid: Uuid,
        permissions: AttPermissions,
        initial_value: Option<Vec<u8>>,
    ) -> Result<u16, TreeError> {
        let service_handle = self
            .characteristics
            .get(&characteristic_handle)
            .map(|c| c.service_handle)
            .ok_or(TreeError::CharacteristicNotFound(characteristic_handle))?;
        let handle = self.allocate()?;

        self.descriptors.insert(
            handle,
            GattDescriptor {
                handle,
                characteristic_handle,
                uuid,
                permissions,
                value: initial_value,
            },
        );
        if let Some(characteristic) = self.characteristics.get_mut(&characteristic_handle) {
            characteristic.descriptors.push(handle);
        }
        if let Some(service) = self.services.get_mut(&service_handle) {
            service.end_handle = handle;
        }
        Ok(handle)
    }

    /// Add a Client Characteristic Configuration descriptor.
    ///
    /// The characteristic must support notifications or indications.
    pub fn add_cccd(&mut self, characteristic_handle: u16) -> Result<u16, TreeError> {
        let characteristic = self
            .characteristics
            .get(&characteristic_handle)
            .ok_or(TreeError::CharacteristicNotFound(characteristic_handle))?;
        if !characteristic.properties.can_notify() && !characteristic.properties.can_indicate() {
            return Err(TreeError::NotNotifiable(characteristic_handle));
        }
        self.add_descriptor(
            characteristic_handle,
            DESCRIPTOR_CLIENT_CHARACTERISTIC_CONFIGURATION,
            AttPermissions::read_write(),
            None,
        )
    }

    pub fn service(&self, handle: u16) -> Option<&GattService> {
        self.services.get(&handle)
    }

    pub fn services(&self) -> impl Iterator<Item = &GattService> {
        self.services.values()
    }

    pub fn characteristic(&self, value_handle: u16) -> Option<&GattCharacteristic> {
        self.characteristics.get(&value_handle)
    }

    pub fn characteristic_mut(&mut self, value_handle: u16) -> Option<&mut GattCharacteristic> {
        self.characteristics.get_mut(&value_handle)
    }

    /// Characteristics of a service in declaration order.
    pub fn characteristics_of(&self, service_handle: u16) -> impl Iterator<Item = &GattCharacteristic> {
        self.services
            .get(&service_handle)
            .into_iter()
            .flat_map(|s| s.characteristics.iter())
            .filter_map(|h| self.characteristics.get(h))
    }

    pub fn descriptor(&self, handle: u16) -> Option<&GattDescriptor> {
        self.descriptors.get(&handle)
    }

    pub fn descriptor_mut(&mut self, handle: u16) -> Option<&mut GattDescriptor> {
        self.descriptors.get_mut(&handle)
    }

    /// Descriptors of a characteristic in declaration order.
    pub fn descriptors_of(&self, characteristic_handle: u16) -> impl Iterator<Item = &GattDescriptor> {
        self.characteristics
            .get(&characteristic_handle)
            .into_iter()
            .flat_map(|c| c.descriptors.iter())
            .filter_map(|h| self.descriptors.get(h))
    }

    /// First characteristic with the given UUID.
    pub fn find_characteristic(&self, uuid: Uuid) -> Option<&GattCharacteristic> {
        self.characteristics.values().find(|c| c.uuid == uuid)
    }

    /// Report characteristic of the given kind.
    pub fn find_report(&self, kind: ReportKind) -> Option<&GattCharacteristic> {
        self.characteristics.values().find(|c| c.report_kind == Some(kind))
    }

    /// Descriptor with the given UUID on a characteristic.
    pub fn find_descriptor(&self, characteristic_handle: u16, uuid: Uuid) -> Option<&GattDescriptor> {
        self.descriptors_of(characteristic_handle).find(|d| d.uuid == uuid)
    }

    pub fn set_characteristic_value(&mut self, value_handle: u16, value: Vec<u8>) -> Result<(), TreeError> {
        let characteristic = self
            .characteristics
            .get_mut(&value_handle)
            .ok_or(TreeError::CharacteristicNotFound(value_handle))?;
        characteristic.value = Some(value);
        Ok(())
    }

    pub fn set_descriptor_value(&mut self, handle: u16, value: Vec<u8>) -> Result<(), TreeError> {
        let descriptor = self
            .descriptors
            .get_mut(&handle)
            .ok_or(TreeError::DescriptorNotFound(handle))?;
        descriptor.value = Some(value);
        Ok(())
    }

    /// Number of attribute handles in use.
    pub fn handle_count(&self) -> usize {
        self.services.len() + self.characteristics.len() * 2 + self.descriptors.len()
    }
}
