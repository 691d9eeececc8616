//! EEPROM driver errors

use core::fmt;

use twi_hal::{StatusCode, TwiError};

/// Errors from EEPROM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A bus primitive failed (completion timeout, arbitration, bus fault)
    Bus(TwiError),
    /// The device never acknowledged after a write cycle
    Timeout,
    /// The device did not acknowledge an address or data byte
    ProtocolNak(StatusCode),
    /// The controller reported a status the protocol step does not expect
    UnexpectedStatus(StatusCode),
    /// Address not usable for the requested operation
    InvalidAddress,
    /// Zero-length transfer
    InvalidLength,
    /// Caller buffer shorter than the requested length
    BufferTooSmall,
    /// Range extends past the end of the device
    OutOfBounds,
    /// Device configuration is inconsistent
    InvalidConfig,
}

impl From<TwiError> for Error {
    fn from(e: TwiError) -> Self {
        match e {
            TwiError::Nak(code) => Error::ProtocolNak(code),
            TwiError::UnexpectedStatus(code) => Error::UnexpectedStatus(code),
            other => Error::Bus(other),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {}", e),
            Error::Timeout => f.write_str("write cycle did not complete"),
            Error::ProtocolNak(code) => write!(f, "device did not acknowledge: {}", code),
            Error::UnexpectedStatus(code) => write!(f, "unexpected bus status: {}", code),
            Error::InvalidAddress => f.write_str("invalid memory address"),
            Error::InvalidLength => f.write_str("transfer length must be at least 1"),
            Error::BufferTooSmall => f.write_str("buffer too small"),
            Error::OutOfBounds => f.write_str("range exceeds device capacity"),
            Error::InvalidConfig => f.write_str("invalid device configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_errors_are_classified() {
        assert_eq!(
            Error::from(TwiError::Nak(StatusCode::DATA_SENT_NAK)),
            Error::ProtocolNak(StatusCode::DATA_SENT_NAK)
        );
        assert_eq!(
            Error::from(TwiError::UnexpectedStatus(StatusCode::IDLE)),
            Error::UnexpectedStatus(StatusCode::IDLE)
        );
        assert_eq!(
            Error::from(TwiError::Timeout),
            Error::Bus(TwiError::Timeout)
        );
        assert_eq!(
            Error::from(TwiError::ArbitrationLost),
            Error::Bus(TwiError::ArbitrationLost)
        );
    }
}
