//! Bluetooth stack abstraction
//!
//! The engine never talks to a radio directly. Everything it needs from the
//! platform's Bluetooth stack goes through [`PeripheralStack`]; asynchronous
//! results (service registration, advertising start, connection changes,
//! inbound requests) come back as [`Event`](crate::event::Event)s posted to the
//! engine's channel.

use crate::address::BdAddr;
use crate::advertising::AdvertisingData;
use crate::config::AdvertisingParameters;
use crate::error::StackError;
use crate::gatt::{AttributeTree, GattStatus};

pub type StackResult<T> = std::result::Result<T, StackError>;

/// Local adapter availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Absent,
    Disabled,
    Enabled,
}

/// Bonding state of a remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondState {
    None,
    Bonding,
    Bonded,
}

/// Operations the peripheral engine needs from a Bluetooth stack
pub trait PeripheralStack: Send {
    fn adapter_state(&self) -> AdapterState;

    /// Whether the adapter can advertise as a peripheral.
    fn has_advertiser(&self) -> bool;

    fn adapter_name(&self) -> StackResult<Option<String>>;

    fn set_adapter_name(&mut self, name: &str) -> StackResult<()>;

    fn open_gatt_server(&mut self) -> StackResult<()>;

    fn close_gatt_server(&mut self) -> StackResult<()>;

    /// Submits one service of `tree` for registration.
    ///
    /// Completion is reported with `Event::ServiceAdded`.
    fn add_service(&mut self, tree: &AttributeTree, service_handle: u16) -> StackResult<()>;

    /// Requests advertising. Completion is reported with `Event::AdvertiseStarted`
    /// or `Event::AdvertiseFailed`.
    fn start_advertising(
        &mut self,
        params: &AdvertisingParameters,
        data: &AdvertisingData,
        scan_response: &AdvertisingData,
    ) -> StackResult<()>;

    fn stop_advertising(&mut self) -> StackResult<()>;

    fn send_response(
        &mut self,
        device: &BdAddr,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: Option<&[u8]>,
    ) -> StackResult<()>;

    /// Sends a notification (or an indication when `confirm` is set).
    fn notify_characteristic_changed(
        &mut self,
        device: &BdAddr,
        handle: u16,
        value: &[u8],
        confirm: bool,
    ) -> StackResult<()>;

    fn bond_state(&self, device: &BdAddr) -> BondState;

    fn create_bond(&mut self, device: &BdAddr) -> StackResult<()>;

    fn disconnect(&mut self, device: &BdAddr) -> StackResult<()>;
}
