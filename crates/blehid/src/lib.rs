//! blehid - A Bluetooth LE HID-over-GATT peripheral engine
//!
//! This library makes a Bluetooth stack present itself as a keyboard or a
//! mouse. It builds the HID report descriptors and the GATT services a host
//! expects, sequences their registration, advertises, tracks connected hosts,
//! answers GATT reads and writes and paces input report notifications.
//! The radio is reached through the [`PeripheralStack`] trait; [`sim`]
//! provides an in-process implementation for tests and demos.

pub mod address;
pub mod advertising;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod gatt;
pub mod hid;
pub mod peripheral;
pub mod report;
pub mod sequencer;
pub mod sim;
pub mod stack;
pub mod uuid;

// Re-export common types for convenience
pub use address::BdAddr;
pub use advertising::{AdvertiseError, AdvertisingController, AdvertisingState};
pub use config::{AdvertiseMode, AdvertisingParameters, DeviceIdentity, PeripheralConfig, TxPower};
pub use connection::{ConnectionCallback, ConnectionRegistry, ConnectionState, ConnectionStateChange};
pub use error::{Error, Result, StackError};
pub use event::{event_channel, Command, Event, EventSender, ReadRequest, WriteRequest};
pub use gatt::{AttributeTree, GattRouter, GattStatus, ReportKind};
pub use hid::{
    HidProfile, KeyboardEncoder, KeyboardProfile, LedState, Modifiers, MouseButtons, MouseEncoder, MouseProfile,
};
pub use peripheral::{PeripheralEngine, PeripheralHandle};
pub use report::{InputReportQueue, InputReportSender};
pub use sim::SimulatedStack;
pub use stack::{AdapterState, BondState, PeripheralStack};
pub use uuid::Uuid;
