//! Peripheral engine
//!
//! Owns the stack, the profile and every piece of mutable peripheral state.
//! All of it is touched from one thread only: the one running the dispatch
//! loop over the engine's event channel.

use super::handle::PeripheralHandle;
use crate::address::BdAddr;
use crate::advertising::{AdvertisingController, AdvertisingState};
use crate::config::{DeviceIdentity, PeripheralConfig};
use crate::connection::{
    ConnectionCallback, ConnectionRegistry, ConnectionState, ConnectionStateChange, Transition,
};
use crate::error::{Error, Result, StackError};
use crate::event::{Command, Event, EventSender, ReadRequest, WriteRequest};
use crate::gatt::constants::{GATT_FAILURE, GATT_SUCCESS};
use crate::gatt::{build_tree, AttributeTree, CccdValue, GattRouter, GattStatus, Response, ServiceHandles};
use crate::hid::HidProfile;
use crate::report::{input_report_queue, InputReportQueue, InputReportSender, ReportTimer};
use crate::sequencer::{ServiceSequencer, Step};
use crate::stack::{AdapterState, BondState, PeripheralStack};
use log::{debug, error, info, trace, warn};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

/// Logs a failed stack call. Permission denials turn the operation into a no-op.
fn log_stack_error(operation: &str, e: &StackError) {
    match e {
        StackError::PermissionDenied(permission) => {
            warn!("{} skipped, permission {} denied", operation, permission)
        }
        other => warn!("{} failed: {}", operation, other),
    }
}

/// HID-over-GATT peripheral engine
pub struct PeripheralEngine<S: PeripheralStack, P: HidProfile> {
    config: PeripheralConfig,
    stack: S,
    profile: P,
    events: EventSender,
    report_sender: InputReportSender,
    reports: InputReportQueue,
    tree: Option<AttributeTree>,
    handles: Option<ServiceHandles>,
    server_open: bool,
    sequencer: ServiceSequencer,
    advertising: AdvertisingController,
    registry: ConnectionRegistry,
    timer: ReportTimer,
    connection_callback: Option<ConnectionCallback>,
}

impl<S: PeripheralStack, P: HidProfile> PeripheralEngine<S, P> {
    /// Creates an engine. `events` must be the sending side of the channel
    /// later passed to [`run`](Self::run).
    pub fn new(config: PeripheralConfig, stack: S, profile: P, events: EventSender) -> Self {
        let (report_sender, reports) = input_report_queue();
        Self {
            config,
            stack,
            profile,
            events,
            report_sender,
            reports,
            tree: None,
            handles: None,
            server_open: false,
            sequencer: ServiceSequencer::new(),
            advertising: AdvertisingController::new(),
            registry: ConnectionRegistry::new(),
            timer: ReportTimer::new(),
            connection_callback: None,
        }
    }

    /// Registers the callback receiving connection state changes.
    pub fn set_connection_callback(&mut self, callback: ConnectionCallback) {
        self.connection_callback = Some(callback);
    }

    /// A handle for posting commands and reports from other threads.
    pub fn handle(&self) -> PeripheralHandle {
        PeripheralHandle::new(self.events.clone(), self.report_sender.clone())
    }

    pub fn report_sender(&self) -> InputReportSender {
        self.report_sender.clone()
    }

    /// Adapter present and able to advertise.
    pub fn is_peripheral_supported(&self) -> bool {
        self.stack.adapter_state() != AdapterState::Absent && self.stack.has_advertiser()
    }

    pub fn is_bluetooth_enabled(&self) -> bool {
        self.stack.adapter_state() == AdapterState::Enabled
    }

    /// Opens the GATT server and begins registering services. Advertising
    /// starts once the last service is acknowledged.
    ///
    /// A server that is already open is stopped first.
    pub fn start(&mut self) -> Result<()> {
        if self.server_open {
            info!("Peripheral already running, restarting");
            self.stop();
        }

        match self.stack.adapter_state() {
            AdapterState::Absent => return Err(Error::AdapterUnavailable),
            AdapterState::Disabled => return Err(Error::AdapterDisabled),
            AdapterState::Enabled => {}
        }
        if !self.stack.has_advertiser() {
            return Err(Error::AdvertiserUnavailable);
        }

        let (tree, handles) = build_tree(&self.profile, self.config.battery_level)?;
        if let Err(e) = self.stack.open_gatt_server() {
            log_stack_error("Opening GATT server", &e);
            return Err(e.into());
        }
        self.server_open = true;
        info!(
            "GATT server open for {} profile with {} attributes",
            self.profile.name(),
            tree.handle_count()
        );

        let order = handles.registration_order();
        let tree = self.tree.insert(tree);
        self.handles = Some(handles);
        for service in order {
            if self.sequencer.enqueue(&mut self.stack, tree, service) == Step::Aborted {
                warn!("Service registration aborted");
                break;
            }
        }
        Ok(())
    }

    /// Tears the peripheral down. Each step is attempted even if an earlier
    /// one failed; stopping twice is harmless.
    pub fn stop(&mut self) {
        self.advertising.stop(&mut self.stack);

        if self.server_open {
            if let Err(e) = self.stack.close_gatt_server() {
                log_stack_error("Closing GATT server", &e);
            }
            self.server_open = false;
        }
        self.tree = None;
        self.handles = None;

        self.sequencer.clear();
        self.timer.cancel();
        self.advertising.restore_name(&mut self.stack);
        info!("Peripheral stopped");
    }

    /// Handles one event. Returns `false` once the engine has shut down.
    pub fn handle_event(&mut self, event: Event) -> bool {
        trace!("Event: {:?}", event);
        match event {
            Event::Command(command) => self.handle_command(command),
            Event::ConnectionStateChanged { device, status, state } => {
                self.on_connection_state_changed(device, status, state)
            }
            Event::CharacteristicRead(request) => self.on_read(request, false),
            Event::DescriptorRead(request) => self.on_read(request, true),
            Event::CharacteristicWrite(request) => self.on_write(request, false),
            Event::DescriptorWrite(request) => self.on_write(request, true),
            Event::ServiceAdded { status, service } => self.on_service_added(status, service),
            Event::AdvertiseStarted => self.on_advertise_started(),
            Event::AdvertiseFailed(code) => {
                let reason = self.advertising.on_start_failure(&mut self.stack, code);
                self.timer.cancel();
                error!("{}", Error::Advertise(reason));
            }
            Event::NotificationSent { device, status } => {
                if status == GATT_SUCCESS {
                    trace!("Notification delivered to {}", device);
                } else {
                    warn!("Notification to {} failed with status 0x{:02x}", device, status);
                }
            }
            Event::MtuChanged { device, mtu } => {
                if self.registry.set_mtu(&device, mtu) {
                    debug!("MTU for {} is now {}", device, mtu);
                } else {
                    debug!("MTU change for unknown device {}", device);
                }
            }
            Event::TimerTick { generation } => {
                if self.timer.is_current(generation) {
                    self.on_tick();
                } else {
                    trace!("Dropping tick from stale timer {}", generation);
                }
            }
            Event::Shutdown => {
                self.stop();
                return false;
            }
        }
        true
    }

    /// Handles every event already waiting on `rx` without blocking.
    ///
    /// Returns `false` if the engine shut down or the channel closed.
    pub fn dispatch_pending(&mut self, rx: &Receiver<Event>) -> bool {
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if !self.handle_event(event) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Runs the dispatch loop until `Event::Shutdown` arrives or every sender is gone.
    pub fn run(&mut self, rx: &Receiver<Event>) {
        info!("Peripheral engine running");
        while let Ok(event) = rx.recv() {
            if !self.handle_event(event) {
                break;
            }
        }
        info!("Peripheral engine exited");
    }

    /// Runs the engine on its own thread. The thread hands the engine back
    /// when the loop ends.
    pub fn spawn(mut self, rx: Receiver<Event>) -> (PeripheralHandle, thread::JoinHandle<Self>)
    where
        S: 'static,
        P: 'static,
    {
        let handle = self.handle();
        let thread = thread::spawn(move || {
            self.run(&rx);
            self
        });
        (handle, thread)
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => {
                if let Err(e) = self.start() {
                    error!("Failed to start peripheral: {}", e);
                    self.notify_connection_change(ConnectionStateChange {
                        device: None,
                        status: GATT_FAILURE,
                        state: ConnectionState::Disconnected,
                    });
                }
            }
            Command::Stop => self.stop(),
            Command::DisconnectAll => self.disconnect_all(),
            Command::SetBatteryLevel(level) => self.set_battery_level(level),
            Command::SetIdentity(identity) => self.set_identity(identity),
        }
    }

    /// Asks the stack to drop every connected host. The registry changes
    /// when the disconnections are reported.
    pub fn disconnect_all(&mut self) {
        for device in self.registry.devices() {
            if let Err(e) = self.stack.disconnect(&device) {
                log_stack_error("Disconnect", &e);
            }
        }
    }

    /// Updates the battery level, notifying subscribed hosts.
    pub fn set_battery_level(&mut self, level: u8) {
        let level = level.min(100);
        self.config.battery_level = level;

        let (Some(tree), Some(handles)) = (self.tree.as_mut(), self.handles.as_ref()) else {
            return;
        };
        if tree.set_characteristic_value(handles.battery_level, vec![level]).is_err() {
            return;
        }
        let subscribed = tree
            .descriptor(handles.battery_level_cccd)
            .and_then(|d| d.value.as_deref())
            .map(CccdValue::from_bytes)
            .unwrap_or_default()
            .notifications_enabled();
        if !subscribed {
            return;
        }
        for device in self.registry.devices() {
            if let Err(e) = self
                .stack
                .notify_characteristic_changed(&device, handles.battery_level, &[level], false)
            {
                log_stack_error("Battery notification", &e);
            }
        }
    }

    /// Replaces the Device Information strings and the advertised name.
    pub fn set_identity(&mut self, identity: DeviceIdentity) {
        info!("Device identity set to {:?}", identity.device_name);
        self.config.identity = identity;
    }

    fn notify_connection_change(&self, change: ConnectionStateChange) {
        if let Some(callback) = &self.connection_callback {
            callback(&change);
        }
    }

    fn on_connection_state_changed(&mut self, device: BdAddr, status: u8, state: ConnectionState) {
        match self.registry.apply(device, status, state) {
            Transition::Connected { .. } => {
                self.advertising.on_connected(&mut self.stack);
                if self.stack.bond_state(&device) == BondState::None {
                    debug!("Requesting bond with {}", device);
                    if let Err(e) = self.stack.create_bond(&device) {
                        log_stack_error("Bond request", &e);
                    }
                }
            }
            Transition::Disconnected { last: true } => {
                if self.server_open {
                    info!("Last host disconnected, advertising again");
                    self.start_advertising();
                }
            }
            Transition::Disconnected { last: false } => {
                debug!("{} hosts still connected", self.registry.len());
            }
            Transition::ConnectFailed | Transition::Unchanged => {}
        }

        self.notify_connection_change(ConnectionStateChange {
            device: Some(device),
            status,
            state,
        });
    }

    fn on_service_added(&mut self, status: u8, service: crate::uuid::Uuid) {
        debug!("Service {} acknowledged with status 0x{:02x}", service, status);
        let Some(tree) = self.tree.as_ref() else {
            warn!("Service acknowledgment with no GATT server, ignoring");
            return;
        };
        match self.sequencer.acknowledge(&mut self.stack, tree, status) {
            Step::Complete => {
                info!("All services registered");
                self.start_advertising();
            }
            Step::Aborted => warn!("Service registration aborted"),
            Step::Submitted(_) | Step::Waiting | Step::Ignored => {}
        }
    }

    fn start_advertising(&mut self) {
        let name = self.config.identity.device_name.clone();
        if let Err(e) = self.advertising.start(&mut self.stack, &self.config.advertising, &name) {
            error!("Could not advertise: {}", e);
            self.timer.cancel();
        }
    }

    fn on_advertise_started(&mut self) {
        if !self.server_open {
            debug!("Advertising started after stop, ignoring");
            return;
        }
        info!("Advertising started");
        let interval: Duration = self
            .config
            .report_interval
            .unwrap_or_else(|| self.profile.report_interval());
        self.timer.start(interval, self.events.clone());
    }

    fn on_read(&mut self, request: ReadRequest, descriptor: bool) {
        let response = match self.tree.as_mut() {
            Some(tree) => {
                let router = GattRouter::new(tree, &mut self.profile, &self.config.identity);
                if descriptor {
                    router.read_descriptor(request.handle, request.offset)
                } else {
                    router.read_characteristic(request.handle, request.offset)
                }
            }
            None => Response::error(GattStatus::ReadNotPermitted),
        };
        self.respond(&request.device, request.request_id, request.offset, response);
    }

    fn on_write(&mut self, request: WriteRequest, descriptor: bool) {
        if request.prepared {
            debug!("Prepared write to 0x{:04x} handled as a plain write", request.handle);
        }
        let response = match self.tree.as_mut() {
            Some(tree) => {
                let mut router = GattRouter::new(tree, &mut self.profile, &self.config.identity);
                if descriptor {
                    router.write_descriptor(request.handle, &request.value)
                } else {
                    router.write_characteristic(request.handle, &request.value)
                }
            }
            None => Response::error(GattStatus::WriteNotPermitted),
        };
        if request.response_needed {
            self.respond(&request.device, request.request_id, request.offset, response);
        } else if !response.is_success() {
            debug!("Write to 0x{:04x} failed: {:?}", request.handle, response.status);
        }
    }

    fn respond(&mut self, device: &BdAddr, request_id: u32, offset: u16, response: Response) {
        if let Err(e) = self
            .stack
            .send_response(device, request_id, response.status, offset, response.value.as_deref())
        {
            log_stack_error("GATT response", &e);
        }
    }

    fn on_tick(&mut self) {
        let Some(report) = self.reports.poll() else {
            return;
        };
        let (Some(tree), Some(handles)) = (self.tree.as_mut(), self.handles.as_ref()) else {
            debug!("No GATT server, dropping report {}", hex::encode(&report));
            return;
        };
        let Some(input) = handles.input_report else {
            debug!("Profile has no input report, dropping {}", hex::encode(&report));
            return;
        };
        if tree.set_characteristic_value(input, report.clone()).is_err() {
            return;
        }

        if self.config.require_subscription {
            let subscribed = handles
                .input_report_cccd
                .and_then(|h| tree.descriptor(h))
                .and_then(|d| d.value.as_deref())
                .map(CccdValue::from_bytes)
                .unwrap_or_default()
                .notifications_enabled();
            if !subscribed {
                debug!("Host not subscribed, dropping report {}", hex::encode(&report));
                return;
            }
        }

        for device in self.registry.devices() {
            match self.stack.notify_characteristic_changed(&device, input, &report, false) {
                Ok(()) => trace!("Report {} sent to {}", hex::encode(&report), device),
                Err(e) => log_stack_error("Input report notification", &e),
            }
        }
    }

    pub fn config(&self) -> &PeripheralConfig {
        &self.config
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn tree(&self) -> Option<&AttributeTree> {
        self.tree.as_ref()
    }

    pub fn handles(&self) -> Option<&ServiceHandles> {
        self.handles.as_ref()
    }

    pub fn is_server_open(&self) -> bool {
        self.server_open
    }

    pub fn advertising_state(&self) -> AdvertisingState {
        self.advertising.state()
    }

    pub fn is_report_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Generation carried by the running report timer's ticks.
    pub fn timer_generation(&self) -> Option<u64> {
        self.timer.generation()
    }
}
