//! Connection registry
//!
//! Tracks which hosts are currently connected. A device is registered exactly
//! when its most recent state transition was a successful connect.

use crate::address::BdAddr;
use crate::gatt::constants::GATT_SUCCESS;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Default ATT MTU until the host negotiates a larger one.
pub const DEFAULT_MTU: u16 = 23;

/// Link state reported by the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Connection state change reported upward to the embedding application.
///
/// `device` is `None` for failures that are not tied to a host, such as the
/// adapter being unavailable at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStateChange {
    pub device: Option<BdAddr>,
    pub status: u8,
    pub state: ConnectionState,
}

/// Callback receiving every connection state change
pub type ConnectionCallback = Box<dyn Fn(&ConnectionStateChange) + Send + 'static>;

/// A connected host
#[derive(Debug, Clone)]
pub struct ConnectedDevice {
    pub address: BdAddr,
    pub mtu: u16,
    pub connected_at: Instant,
}

/// What a state transition did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The device was registered. `first` is set when the registry was empty before.
    Connected { first: bool },
    /// A connect attempt failed; the device is no longer registered.
    ConnectFailed,
    /// The device was removed. `last` is set when no devices remain.
    Disconnected { last: bool },
    /// Intermediate states and disconnects of unknown devices leave the registry alone.
    Unchanged,
}

/// Registry of connected hosts
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    devices: HashMap<BdAddr, ConnectedDevice>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a state transition reported by the stack.
    pub fn apply(&mut self, device: BdAddr, status: u8, state: ConnectionState) -> Transition {
        match state {
            ConnectionState::Connected if status == GATT_SUCCESS => {
                let first = self.devices.is_empty();
                let previous = self.devices.insert(
                    device,
                    ConnectedDevice {
                        address: device,
                        mtu: DEFAULT_MTU,
                        connected_at: Instant::now(),
                    },
                );
                if previous.is_some() {
                    debug!("Device {} reconnected without a disconnect", device);
                }
                info!("Device {} connected ({} total)", device, self.devices.len());
                Transition::Connected { first }
            }
            ConnectionState::Connected => {
                warn!("Connection to {} failed with status 0x{:02x}", device, status);
                self.devices.remove(&device);
                Transition::ConnectFailed
            }
            ConnectionState::Disconnected => {
                if self.devices.remove(&device).is_none() {
                    debug!("Disconnect from unregistered device {}", device);
                    return Transition::Unchanged;
                }
                info!("Device {} disconnected (status 0x{:02x})", device, status);
                Transition::Disconnected {
                    last: self.devices.is_empty(),
                }
            }
            ConnectionState::Connecting | ConnectionState::Disconnecting => {
                debug!("Device {} is {:?}", device, state);
                Transition::Unchanged
            }
        }
    }

    /// Records a negotiated MTU. Returns `false` for unknown devices.
    pub fn set_mtu(&mut self, device: &BdAddr, mtu: u16) -> bool {
        match self.devices.get_mut(device) {
            Some(entry) => {
                entry.mtu = mtu;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, device: &BdAddr) -> Option<&ConnectedDevice> {
        self.devices.get(device)
    }

    pub fn contains(&self, device: &BdAddr) -> bool {
        self.devices.contains_key(device)
    }

    /// Addresses of all connected hosts.
    pub fn devices(&self) -> Vec<BdAddr> {
        self.devices.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
