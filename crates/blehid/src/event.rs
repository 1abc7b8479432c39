//! Events consumed by the peripheral engine
//!
//! Stack callbacks, timer ticks and application commands all arrive on one
//! channel and are handled in order by a single dispatch loop.

use crate::address::BdAddr;
use crate::config::DeviceIdentity;
use crate::connection::ConnectionState;
use crate::error::{Error, Result};
use crate::uuid::Uuid;
use std::sync::mpsc::{self, Receiver, Sender};

/// Remote read of a characteristic or descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub device: BdAddr,
    pub request_id: u32,
    pub offset: u16,
    pub handle: u16,
}

/// Remote write to a characteristic or descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub device: BdAddr,
    pub request_id: u32,
    pub handle: u16,
    pub prepared: bool,
    pub response_needed: bool,
    pub offset: u16,
    pub value: Vec<u8>,
}

/// Requests from the embedding application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    DisconnectAll,
    SetBatteryLevel(u8),
    SetIdentity(DeviceIdentity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    ConnectionStateChanged {
        device: BdAddr,
        status: u8,
        state: ConnectionState,
    },
    CharacteristicRead(ReadRequest),
    DescriptorRead(ReadRequest),
    CharacteristicWrite(WriteRequest),
    DescriptorWrite(WriteRequest),
    /// Acknowledgment of the service registration in flight
    ServiceAdded { status: u8, service: Uuid },
    AdvertiseStarted,
    AdvertiseFailed(u8),
    NotificationSent { device: BdAddr, status: u8 },
    MtuChanged { device: BdAddr, mtu: u16 },
    TimerTick { generation: u64 },
    /// Ends the dispatch loop
    Shutdown,
}

/// Sending side of the engine's event channel
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) -> Result<()> {
        self.tx.send(event).map_err(|_| Error::EngineClosed)
    }
}

/// Creates the engine's event channel.
pub fn event_channel() -> (EventSender, Receiver<Event>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, rx)
}
