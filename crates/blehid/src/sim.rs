//! In-process Bluetooth stack simulator
//!
//! Implements [`PeripheralStack`] without a radio. Every call is recorded so
//! tests can assert on what the engine asked for. When wired to the engine's
//! event channel it also plays the stack's side of the asynchronous
//! handshakes: service registrations and advertising starts are acknowledged,
//! notifications are confirmed and disconnects are reported back.

use crate::address::BdAddr;
use crate::advertising::AdvertisingData;
use crate::config::AdvertisingParameters;
use crate::connection::ConnectionState;
use crate::error::StackError;
use crate::event::{Event, EventSender};
use crate::gatt::constants::{GATT_FAILURE, GATT_SUCCESS};
use crate::gatt::{AttributeTree, GattStatus};
use crate::stack::{AdapterState, BondState, PeripheralStack, StackResult};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Sender;

/// A call the engine made on the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackCall {
    SetAdapterName(String),
    OpenGattServer,
    CloseGattServer,
    AddService(u16),
    StartAdvertising(AdvertisingData),
    StopAdvertising,
    SendResponse {
        device: BdAddr,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: Option<Vec<u8>>,
    },
    Notify(Notification),
    CreateBond(BdAddr),
    Disconnect(BdAddr),
}

/// A notification delivered to a simulated host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub device: BdAddr,
    pub handle: u16,
    pub value: Vec<u8>,
    pub confirm: bool,
}

/// Recording stand-in for a platform Bluetooth stack
#[derive(Debug)]
pub struct SimulatedStack {
    adapter: AdapterState,
    advertiser: bool,
    name: Option<String>,
    server_open: bool,
    advertising: bool,
    calls: Vec<StackCall>,
    bonds: HashMap<BdAddr, BondState>,
    events: Option<EventSender>,
    sink: Option<Sender<Notification>>,
    fail_rename: Option<StackError>,
    fail_advertising: Option<StackError>,
    fail_add_service: Option<StackError>,
    fail_stop_advertising: Option<StackError>,
    fail_close: Option<StackError>,
    fail_response: Option<StackError>,
    fail_bond: Option<StackError>,
    unreachable: HashSet<BdAddr>,
}

impl Default for SimulatedStack {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedStack {
    /// An enabled adapter with an advertiser and no name.
    pub fn new() -> Self {
        Self {
            adapter: AdapterState::Enabled,
            advertiser: true,
            name: None,
            server_open: false,
            advertising: false,
            calls: Vec::new(),
            bonds: HashMap::new(),
            events: None,
            sink: None,
            fail_rename: None,
            fail_advertising: None,
            fail_add_service: None,
            fail_stop_advertising: None,
            fail_close: None,
            fail_response: None,
            fail_bond: None,
            unreachable: HashSet::new(),
        }
    }

    /// Acknowledge asynchronous requests by posting events to the engine.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Forward every delivered notification to `sink`.
    pub fn with_notification_sink(mut self, sink: Sender<Notification>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn set_adapter_state(&mut self, state: AdapterState) {
        self.adapter = state;
    }

    pub fn set_advertiser(&mut self, available: bool) {
        self.advertiser = available;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_bond_state(&mut self, device: BdAddr, state: BondState) {
        self.bonds.insert(device, state);
    }

    pub fn fail_rename(&mut self, error: StackError) {
        self.fail_rename = Some(error);
    }

    pub fn fail_advertising(&mut self, error: StackError) {
        self.fail_advertising = Some(error);
    }

    pub fn fail_add_service(&mut self, error: StackError) {
        self.fail_add_service = Some(error);
    }

    pub fn fail_stop_advertising(&mut self, error: StackError) {
        self.fail_stop_advertising = Some(error);
    }

    pub fn fail_close(&mut self, error: StackError) {
        self.fail_close = Some(error);
    }

    pub fn fail_response(&mut self, error: StackError) {
        self.fail_response = Some(error);
    }

    pub fn fail_bond(&mut self, error: StackError) {
        self.fail_bond = Some(error);
    }

    /// Notifications to `device` fail from now on.
    pub fn make_unreachable(&mut self, device: BdAddr) {
        self.unreachable.insert(device);
    }

    pub fn is_server_open(&self) -> bool {
        self.server_open
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising
    }

    pub fn calls(&self) -> &[StackCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Notifications delivered so far, in order.
    pub fn notifications(&self) -> Vec<&Notification> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StackCall::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&StackCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn post(&self, event: Event) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                trace!("Simulated event dropped, engine gone");
            }
        }
    }
}

impl PeripheralStack for SimulatedStack {
    fn adapter_state(&self) -> AdapterState {
        self.adapter
    }

    fn has_advertiser(&self) -> bool {
        self.advertiser
    }

    fn adapter_name(&self) -> StackResult<Option<String>> {
        Ok(self.name.clone())
    }

    fn set_adapter_name(&mut self, name: &str) -> StackResult<()> {
        self.calls.push(StackCall::SetAdapterName(name.to_string()));
        if let Some(e) = self.fail_rename.clone() {
            return Err(e);
        }
        self.name = Some(name.to_string());
        Ok(())
    }

    fn open_gatt_server(&mut self) -> StackResult<()> {
        self.calls.push(StackCall::OpenGattServer);
        self.server_open = true;
        Ok(())
    }

    fn close_gatt_server(&mut self) -> StackResult<()> {
        self.calls.push(StackCall::CloseGattServer);
        if let Some(e) = self.fail_close.clone() {
            return Err(e);
        }
        if !self.server_open {
            return Err(StackError::Rejected("GATT server not open".into()));
        }
        self.server_open = false;
        Ok(())
    }

    fn add_service(&mut self, tree: &AttributeTree, service_handle: u16) -> StackResult<()> {
        self.calls.push(StackCall::AddService(service_handle));
        if let Some(e) = self.fail_add_service.clone() {
            return Err(e);
        }
        let service = tree
            .service(service_handle)
            .ok_or_else(|| StackError::Rejected(format!("unknown service 0x{:04x}", service_handle)))?;
        debug!("Simulated registration of service {}", service.uuid);
        self.post(Event::ServiceAdded {
            status: GATT_SUCCESS,
            service: service.uuid,
        });
        Ok(())
    }

    fn start_advertising(
        &mut self,
        _params: &AdvertisingParameters,
        data: &AdvertisingData,
        _scan_response: &AdvertisingData,
    ) -> StackResult<()> {
        self.calls.push(StackCall::StartAdvertising(data.clone()));
        if let Some(e) = self.fail_advertising.clone() {
            return Err(e);
        }
        self.advertising = true;
        self.post(Event::AdvertiseStarted);
        Ok(())
    }

    fn stop_advertising(&mut self) -> StackResult<()> {
        self.calls.push(StackCall::StopAdvertising);
        if let Some(e) = self.fail_stop_advertising.clone() {
            return Err(e);
        }
        self.advertising = false;
        Ok(())
    }

    fn send_response(
        &mut self,
        device: &BdAddr,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: Option<&[u8]>,
    ) -> StackResult<()> {
        self.calls.push(StackCall::SendResponse {
            device: *device,
            request_id,
            status,
            offset,
            value: value.map(<[u8]>::to_vec),
        });
        match self.fail_response.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn notify_characteristic_changed(
        &mut self,
        device: &BdAddr,
        handle: u16,
        value: &[u8],
        confirm: bool,
    ) -> StackResult<()> {
        let notification = Notification {
            device: *device,
            handle,
            value: value.to_vec(),
            confirm,
        };
        self.calls.push(StackCall::Notify(notification.clone()));
        if self.unreachable.contains(device) {
            self.post(Event::NotificationSent {
                device: *device,
                status: GATT_FAILURE,
            });
            return Err(StackError::Rejected(format!("{} unreachable", device)));
        }
        if let Some(sink) = &self.sink {
            let _ = sink.send(notification);
        }
        self.post(Event::NotificationSent {
            device: *device,
            status: GATT_SUCCESS,
        });
        Ok(())
    }

    fn bond_state(&self, device: &BdAddr) -> BondState {
        self.bonds.get(device).copied().unwrap_or(BondState::None)
    }

    fn create_bond(&mut self, device: &BdAddr) -> StackResult<()> {
        self.calls.push(StackCall::CreateBond(*device));
        if let Some(e) = self.fail_bond.clone() {
            return Err(e);
        }
        self.bonds.insert(*device, BondState::Bonding);
        Ok(())
    }

    fn disconnect(&mut self, device: &BdAddr) -> StackResult<()> {
        self.calls.push(StackCall::Disconnect(*device));
        self.post(Event::ConnectionStateChanged {
            device: *device,
            status: GATT_SUCCESS,
            state: ConnectionState::Disconnected,
        });
        Ok(())
    }
}
