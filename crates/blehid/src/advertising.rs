//! Advertising lifecycle and adapter name handling

use crate::config::AdvertisingParameters;
use crate::error::{Error, Result, StackError};
use crate::gatt::constants::SERVICE_HID;
use crate::stack::PeripheralStack;
use crate::uuid::Uuid;
use log::{debug, error, info, warn};

/// Reason the stack gave for failing to start advertising
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseError {
    #[error("advertising data too large")]
    DataTooLarge,

    #[error("too many advertisers")]
    TooManyAdvertisers,

    #[error("advertising already started")]
    AlreadyStarted,

    #[error("internal error")]
    InternalError,

    #[error("advertising not supported")]
    FeatureUnsupported,

    #[error("unknown error code {0}")]
    Unknown(u8),
}

impl From<u8> for AdvertiseError {
    fn from(code: u8) -> Self {
        match code {
            1 => AdvertiseError::DataTooLarge,
            2 => AdvertiseError::TooManyAdvertisers,
            3 => AdvertiseError::AlreadyStarted,
            4 => AdvertiseError::InternalError,
            5 => AdvertiseError::FeatureUnsupported,
            c => AdvertiseError::Unknown(c),
        }
    }
}

/// Contents of an advertising or scan response payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisingData {
    pub include_device_name: bool,
    pub service_uuids: Vec<Uuid>,
}

impl AdvertisingData {
    /// Primary payload announcing the HID service under the adapter name.
    pub fn hid() -> Self {
        Self {
            include_device_name: true,
            service_uuids: vec![SERVICE_HID],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvertisingState {
    #[default]
    Idle,
    Advertising,
    Connected,
}

/// Adapter name in effect before the peripheral renamed it.
///
/// Set only when a rename is attempted and cleared by the first restore
/// attempt, successful or not.
#[derive(Debug, Default)]
pub struct AdvertisingNameState {
    original: Option<String>,
}

impl AdvertisingNameState {
    /// Renames the adapter to `name` if it is non-empty and differs from the
    /// current name. Failures are logged and otherwise ignored.
    pub fn rename<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S, name: &str) {
        if name.is_empty() {
            return;
        }
        let current = match stack.adapter_name() {
            Ok(current) => current,
            Err(e) => {
                warn!("Could not read adapter name: {}", e);
                return;
            }
        };
        if current.as_deref() == Some(name) {
            return;
        }
        // Keep the first saved name across repeated renames.
        if self.original.is_none() {
            self.original = Some(current.unwrap_or_default());
        }
        match stack.set_adapter_name(name) {
            Ok(()) => debug!("Adapter renamed to {:?}", name),
            Err(e) => warn!("Could not rename adapter to {:?}: {}", name, e),
        }
    }

    /// Puts the saved name back, if any.
    pub fn restore<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S) {
        if let Some(original) = self.original.take() {
            match stack.set_adapter_name(&original) {
                Ok(()) => debug!("Adapter name restored to {:?}", original),
                Err(e) => warn!("Could not restore adapter name {:?}: {}", original, e),
            }
        }
    }

    pub fn saved(&self) -> Option<&str> {
        self.original.as_deref()
    }
}

/// Drives advertising on behalf of the engine
#[derive(Debug, Default)]
pub struct AdvertisingController {
    state: AdvertisingState,
    name: AdvertisingNameState,
}

impl AdvertisingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AdvertisingState {
        self.state
    }

    pub fn name_state(&self) -> &AdvertisingNameState {
        &self.name
    }

    /// Renames the adapter and requests advertising of the HID service.
    ///
    /// On failure the adapter name is restored and the controller stays idle.
    pub fn start<S: PeripheralStack + ?Sized>(
        &mut self,
        stack: &mut S,
        params: &AdvertisingParameters,
        device_name: &str,
    ) -> Result<()> {
        if !stack.has_advertiser() {
            error!("No advertiser available");
            return Err(Error::AdvertiserUnavailable);
        }

        self.name.rename(stack, device_name);

        match stack.start_advertising(params, &AdvertisingData::hid(), &AdvertisingData::default()) {
            Ok(()) => {
                info!("Advertising requested as {:?}", device_name);
                self.state = AdvertisingState::Advertising;
                Ok(())
            }
            Err(e) => {
                error!("Failed to start advertising: {}", e);
                self.name.restore(stack);
                self.state = AdvertisingState::Idle;
                Err(e.into())
            }
        }
    }

    /// Handles an asynchronous advertising start failure.
    pub fn on_start_failure<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S, code: u8) -> AdvertiseError {
        let reason = AdvertiseError::from(code);
        error!("Advertising failed to start: {}", reason);
        self.name.restore(stack);
        self.state = AdvertisingState::Idle;
        reason
    }

    /// First host connected: advertising is no longer needed.
    pub fn on_connected<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S) {
        stop_advertising(stack);
        self.name.restore(stack);
        self.state = AdvertisingState::Connected;
    }

    /// Cancels advertising. The adapter name is left as is.
    pub fn stop<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S) {
        stop_advertising(stack);
        self.state = AdvertisingState::Idle;
    }

    pub fn restore_name<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S) {
        self.name.restore(stack);
    }
}

fn stop_advertising<S: PeripheralStack + ?Sized>(stack: &mut S) {
    match stack.stop_advertising() {
        Ok(()) => debug!("Advertising stopped"),
        Err(StackError::PermissionDenied(what)) => warn!("Permission denied for {}, advertising not stopped", what),
        Err(e) => warn!("Failed to stop advertising: {}", e),
    }
}
