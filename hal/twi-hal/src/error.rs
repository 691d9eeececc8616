//! Bus error type

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::status::StatusCode;

/// Error from a bus primitive or a checked bus step
///
/// Primitives themselves only fail with [`TwiError::Timeout`] or
/// [`TwiError::InvalidConfig`]; the status-derived variants come from
/// [`StatusCode::expect_any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiError {
    /// Hardware never signalled completion within the poll limit
    Timeout,
    /// Device did not acknowledge
    Nak(StatusCode),
    /// Arbitration lost to another master
    ArbitrationLost,
    /// Illegal START/STOP condition on the bus
    BusFault,
    /// Any other status than the protocol step expects
    UnexpectedStatus(StatusCode),
    /// Bus clock cannot be derived from the configuration
    InvalidConfig,
}

impl fmt::Display for TwiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwiError::Timeout => f.write_str("bus operation timed out"),
            TwiError::Nak(code) => write!(f, "not acknowledged: {}", code),
            TwiError::ArbitrationLost => f.write_str("arbitration lost"),
            TwiError::BusFault => f.write_str("bus error"),
            TwiError::UnexpectedStatus(code) => write!(f, "unexpected status: {}", code),
            TwiError::InvalidConfig => f.write_str("invalid bus configuration"),
        }
    }
}

impl embedded_hal::i2c::Error for TwiError {
    fn kind(&self) -> ErrorKind {
        match *self {
            TwiError::Nak(code) if code.is_address_nak() => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            TwiError::Nak(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            TwiError::ArbitrationLost => ErrorKind::ArbitrationLoss,
            TwiError::BusFault => ErrorKind::Bus,
            TwiError::Timeout | TwiError::UnexpectedStatus(_) | TwiError::InvalidConfig => {
                ErrorKind::Other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            TwiError::Nak(StatusCode::SLA_W_NAK).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            TwiError::Nak(StatusCode::DATA_SENT_NAK).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
        assert_eq!(TwiError::ArbitrationLost.kind(), ErrorKind::ArbitrationLoss);
        assert_eq!(TwiError::BusFault.kind(), ErrorKind::Bus);
        assert_eq!(TwiError::Timeout.kind(), ErrorKind::Other);
    }
}
