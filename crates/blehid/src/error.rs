//! Error types for the blehid library

use crate::advertising::AdvertiseError;
use crate::gatt::TreeError;
use thiserror::Error;

/// Errors reported by a [`PeripheralStack`](crate::stack::PeripheralStack) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Permission denied for {0}")]
    PermissionDenied(&'static str),

    #[error("Bluetooth stack unavailable")]
    Unavailable,

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Errors returned by the peripheral engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("No Bluetooth adapter present")]
    AdapterUnavailable,

    #[error("Bluetooth adapter is disabled")]
    AdapterDisabled,

    #[error("Adapter does not support peripheral advertising")]
    AdvertiserUnavailable,

    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    #[error("Attribute tree error: {0}")]
    Attribute(#[from] TreeError),

    #[error("Advertising failed: {0}")]
    Advertise(AdvertiseError),

    #[error("Peripheral engine is no longer running")]
    EngineClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
