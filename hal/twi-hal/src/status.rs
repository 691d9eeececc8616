//! TWI status register codes
//!
//! After every bus step the controller reports the outcome in its status
//! register. The lower three bits hold the prescaler and are not part of the
//! status, so every raw value is masked with [`StatusCode::MASK`] first.

use core::fmt;

use crate::error::TwiError;
use crate::i2c::Direction;

/// Masked value of the status register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusCode(u8);

impl StatusCode {
    /// Status bits of the raw register value
    pub const MASK: u8 = 0xF8;

    /// Illegal START or STOP condition
    pub const BUS_ERROR: Self = Self(0x00);
    /// START condition transmitted
    pub const START: Self = Self(0x08);
    /// Repeated START condition transmitted
    pub const REPEATED_START: Self = Self(0x10);
    /// SLA+W transmitted, ACK received
    pub const SLA_W_ACK: Self = Self(0x18);
    /// SLA+W transmitted, NAK received
    pub const SLA_W_NAK: Self = Self(0x20);
    /// Data byte transmitted, ACK received
    pub const DATA_SENT_ACK: Self = Self(0x28);
    /// Data byte transmitted, NAK received
    pub const DATA_SENT_NAK: Self = Self(0x30);
    /// Arbitration lost in SLA or data phase
    pub const ARBITRATION_LOST: Self = Self(0x38);
    /// SLA+R transmitted, ACK received
    pub const SLA_R_ACK: Self = Self(0x40);
    /// SLA+R transmitted, NAK received
    pub const SLA_R_NAK: Self = Self(0x48);
    /// Data byte received, ACK returned
    pub const DATA_RECEIVED_ACK: Self = Self(0x50);
    /// Data byte received, NAK returned
    pub const DATA_RECEIVED_NAK: Self = Self(0x58);
    /// No relevant state information, bus idle
    pub const IDLE: Self = Self(0xF8);

    /// Mask a raw status register value
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & Self::MASK)
    }

    /// Status bits as a byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Status expected after addressing a device that answers
    pub const fn address_ack(direction: Direction) -> Self {
        match direction {
            Direction::Read => Self::SLA_R_ACK,
            Direction::Write => Self::SLA_W_ACK,
        }
    }

    /// Status expected after receiving a byte with the given acknowledge
    pub const fn received(ack: bool) -> Self {
        if ack {
            Self::DATA_RECEIVED_ACK
        } else {
            Self::DATA_RECEIVED_NAK
        }
    }

    /// Decode into a known master-mode status
    pub fn status(self) -> Option<Status> {
        Status::from_code(self)
    }

    /// Whether the addressed device (or data receiver) did not acknowledge
    pub fn is_nak(self) -> bool {
        matches!(
            self,
            Self::SLA_W_NAK | Self::SLA_R_NAK | Self::DATA_SENT_NAK
        )
    }

    /// Whether the NAK happened during the address phase
    pub fn is_address_nak(self) -> bool {
        matches!(self, Self::SLA_W_NAK | Self::SLA_R_NAK)
    }

    /// Short description, as printed by serial diagnostics
    pub fn mnemonic(self) -> &'static str {
        match self.status() {
            Some(status) => status.mnemonic(),
            None => "N/A",
        }
    }

    /// Check this status against the single expected one
    pub fn expect(self, expected: StatusCode) -> Result<(), TwiError> {
        self.expect_any(&[expected])
    }

    /// Check this status against a set of acceptable ones
    ///
    /// Anything else is classified into the matching [`TwiError`].
    pub fn expect_any(self, expected: &[StatusCode]) -> Result<(), TwiError> {
        if expected.contains(&self) {
            return Ok(());
        }
        Err(match self {
            code if code.is_nak() => TwiError::Nak(code),
            Self::ARBITRATION_LOST => TwiError::ArbitrationLost,
            Self::BUS_ERROR => TwiError::BusFault,
            code => TwiError::UnexpectedStatus(code),
        })
    }
}

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        Self(status as u8)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:02X})", self.mnemonic(), self.0)
    }
}

/// Known master-mode states of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    BusError = 0x00,
    StartTransmitted = 0x08,
    RepeatedStartTransmitted = 0x10,
    WriteHeaderAck = 0x18,
    WriteHeaderNak = 0x20,
    DataSentAck = 0x28,
    DataSentNak = 0x30,
    ArbitrationLost = 0x38,
    ReadHeaderAck = 0x40,
    ReadHeaderNak = 0x48,
    DataReceivedAck = 0x50,
    DataReceivedNak = 0x58,
    Idle = 0xF8,
}

impl Status {
    /// Translate a masked status code
    ///
    /// Returns `None` for codes that only occur in slave modes or are
    /// reserved.
    pub fn from_code(code: StatusCode) -> Option<Self> {
        match code.bits() {
            0x00 => Some(Self::BusError),
            0x08 => Some(Self::StartTransmitted),
            0x10 => Some(Self::RepeatedStartTransmitted),
            0x18 => Some(Self::WriteHeaderAck),
            0x20 => Some(Self::WriteHeaderNak),
            0x28 => Some(Self::DataSentAck),
            0x30 => Some(Self::DataSentNak),
            0x38 => Some(Self::ArbitrationLost),
            0x40 => Some(Self::ReadHeaderAck),
            0x48 => Some(Self::ReadHeaderNak),
            0x50 => Some(Self::DataReceivedAck),
            0x58 => Some(Self::DataReceivedNak),
            0xF8 => Some(Self::Idle),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::BusError => "BUS ERROR",
            Self::StartTransmitted => "START",
            Self::RepeatedStartTransmitted => "RESTART",
            Self::WriteHeaderAck => "MT SLA+W, ACK",
            Self::WriteHeaderNak => "MT SLA+W, NAK",
            Self::DataSentAck => "MT DATA+W, ACK",
            Self::DataSentNak => "MT DATA+W, NAK",
            Self::ArbitrationLost => "NOARB/NAK",
            Self::ReadHeaderAck => "MR SLA+R, ACK",
            Self::ReadHeaderNak => "MR SLA+R, NAK",
            Self::DataReceivedAck => "MR DATA+R, ACK",
            Self::DataReceivedNak => "MR DATA+R, NAK",
            Self::Idle => "IDLE",
        }
    }
}
