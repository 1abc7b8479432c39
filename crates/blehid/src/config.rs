//! Peripheral configuration

use std::time::Duration;

/// Strings served by the Device Information service. The device name is also
/// the advertised adapter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub device_name: String,
    pub serial_number: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            manufacturer: "blehid".to_string(),
            device_name: "BLE HID".to_string(),
            serial_number: "00000000".to_string(),
        }
    }
}

/// Advertising mode, trading latency for power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvertiseMode {
    LowPower,
    Balanced,
    #[default]
    LowLatency,
}

/// Advertising transmit power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxPower {
    UltraLow,
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParameters {
    pub mode: AdvertiseMode,
    pub tx_power: TxPower,
    pub connectable: bool,
}

impl Default for AdvertisingParameters {
    fn default() -> Self {
        Self {
            mode: AdvertiseMode::default(),
            tx_power: TxPower::default(),
            connectable: true,
        }
    }
}

/// Peripheral engine configuration
#[derive(Debug, Clone)]
pub struct PeripheralConfig {
    pub identity: DeviceIdentity,
    /// Initial Battery Level value, 0-100
    pub battery_level: u8,
    /// Overrides the profile's report interval when set
    pub report_interval: Option<Duration>,
    /// Only notify input reports once the host has enabled notifications on
    /// the input report's CCCD
    pub require_subscription: bool,
    pub advertising: AdvertisingParameters,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            identity: DeviceIdentity::default(),
            battery_level: 100,
            report_interval: None,
            require_subscription: true,
            advertising: AdvertisingParameters::default(),
        }
    }
}
