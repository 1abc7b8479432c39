//! Status codes returned to the remote peer
use super::constants::*;

/// ATT status carried in a GATT response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattStatus {
    /// Success
    Success,
    /// Invalid handle
    InvalidHandle,
    /// Read not permitted
    ReadNotPermitted,
    /// Write not permitted
    WriteNotPermitted,
    /// Invalid PDU
    InvalidPdu,
    /// Insufficient authentication
    InsufficientAuthentication,
    /// Request not supported
    RequestNotSupported,
    /// Invalid offset
    InvalidOffset,
    /// Insufficient authorization
    InsufficientAuthorization,
    /// Invalid attribute value length
    InvalidAttributeValueLength,
    /// Unlikely error
    Unlikely,
    /// Insufficient encryption
    InsufficientEncryption,
    /// Any other code
    Other(u8),
}

impl GattStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, GattStatus::Success)
    }
}

impl From<u8> for GattStatus {
    fn from(code: u8) -> Self {
        match code {
            GATT_SUCCESS => GattStatus::Success,
            GATT_INVALID_HANDLE => GattStatus::InvalidHandle,
            GATT_READ_NOT_PERMITTED => GattStatus::ReadNotPermitted,
            GATT_WRITE_NOT_PERMITTED => GattStatus::WriteNotPermitted,
            GATT_INVALID_PDU => GattStatus::InvalidPdu,
            GATT_INSUFFICIENT_AUTHENTICATION => GattStatus::InsufficientAuthentication,
            GATT_REQUEST_NOT_SUPPORTED => GattStatus::RequestNotSupported,
            GATT_INVALID_OFFSET => GattStatus::InvalidOffset,
            GATT_INSUFFICIENT_AUTHORIZATION => GattStatus::InsufficientAuthorization,
            GATT_INVALID_ATTRIBUTE_VALUE_LENGTH => GattStatus::InvalidAttributeValueLength,
            GATT_UNLIKELY => GattStatus::Unlikely,
            GATT_INSUFFICIENT_ENCRYPTION => GattStatus::InsufficientEncryption,
            c => GattStatus::Other(c),
        }
    }
}

impl From<GattStatus> for u8 {
    fn from(status: GattStatus) -> u8 {
        match status {
            GattStatus::Success => GATT_SUCCESS,
            GattStatus::InvalidHandle => GATT_INVALID_HANDLE,
            GattStatus::ReadNotPermitted => GATT_READ_NOT_PERMITTED,
            GattStatus::WriteNotPermitted => GATT_WRITE_NOT_PERMITTED,
            GattStatus::InvalidPdu => GATT_INVALID_PDU,
            GattStatus::InsufficientAuthentication => GATT_INSUFFICIENT_AUTHENTICATION,
            GattStatus::RequestNotSupported => GATT_REQUEST_NOT_SUPPORTED,
            GattStatus::InvalidOffset => GATT_INVALID_OFFSET,
            GattStatus::InsufficientAuthorization => GATT_INSUFFICIENT_AUTHORIZATION,
            GattStatus::InvalidAttributeValueLength => GATT_INVALID_ATTRIBUTE_VALUE_LENGTH,
            GattStatus::Unlikely => GATT_UNLIKELY,
            GattStatus::InsufficientEncryption => GATT_INSUFFICIENT_ENCRYPTION,
            GattStatus::Other(code) => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_conversion() {
        assert_eq!(GattStatus::from(0x0D), GattStatus::InvalidAttributeValueLength);
        assert_eq!(u8::from(GattStatus::ReadNotPermitted), 0x02);
        assert_eq!(GattStatus::from(0x85), GattStatus::Other(0x85));
        assert_eq!(u8::from(GattStatus::Other(0x85)), 0x85);
        assert!(GattStatus::from(0).is_success());
    }
}
