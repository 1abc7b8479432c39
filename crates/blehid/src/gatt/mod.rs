//! GATT server side of the HID peripheral
//!
//! The attribute tree, the services a HID device exposes and the router
//! that answers remote reads and writes.

pub mod constants;
pub mod router;
pub mod services;
pub mod status;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tests;

pub use router::{GattRouter, Response};
pub use services::{build_tree, ServiceHandles};
pub use status::GattStatus;
pub use tree::{AttributeTree, GattCharacteristic, GattDescriptor, GattService, TreeError};
pub use types::{AttPermissions, CccdValue, CharacteristicProperties, ReportKind};
