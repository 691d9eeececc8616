//! EEPROM device configuration
//!
//! Device constants (slave address, capacity) and the policies that decide
//! how strictly the driver treats the bus.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use twi_hal::{PollLimit, TwiConfig};

use crate::error::Error;

/// Bytes committed by one page write
pub const PAGE_SIZE: usize = 8;

/// 7-bit address of a 24C02 with A0..A2 tied low (0xA0 as a write header)
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x50;

/// Bytes addressable with a single 8-bit word address
pub const MAX_CAPACITY: u16 = 256;

/// Address attempts allowed while waiting for a write cycle
///
/// A 24C02 needs at most 5 ms per write cycle, roughly 50 attempts at
/// 100 kHz.
pub const DEFAULT_WRITE_POLL_ATTEMPTS: u32 = 1_000;

/// How bus status codes are treated outside the write-completion poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AckPolicy {
    /// Check the status after every step; abort and release the bus on
    /// NAK or any unexpected code
    #[default]
    Strict,
    /// Run the full sequence without checking, trusting the device to
    /// acknowledge
    Lenient,
}

/// What a page write does with an address that is not page aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PageAlignment {
    /// Move the address up to the next page boundary
    #[default]
    RoundUp,
    /// Fail with [`Error::InvalidAddress`]
    Reject,
}

/// EEPROM driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EepromConfig {
    /// 7-bit slave address
    pub address: u8,
    /// Device size in bytes (multiple of the page size, at most 256)
    pub capacity: u16,
    /// Status checking policy
    pub ack_policy: AckPolicy,
    /// Misaligned page write handling
    pub page_alignment: PageAlignment,
    /// Bound on write-completion address attempts
    pub write_poll_limit: PollLimit,
    /// Bus clock configuration applied by [`Eeprom::init`](crate::Eeprom::init)
    pub bus: TwiConfig,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self::AT24C02
    }
}

impl EepromConfig {
    /// 2 Kbit (256 x 8) device on a 100 kHz bus
    pub const AT24C02: Self = Self {
        address: DEFAULT_DEVICE_ADDRESS,
        capacity: MAX_CAPACITY,
        ack_policy: AckPolicy::Strict,
        page_alignment: PageAlignment::RoundUp,
        write_poll_limit: PollLimit::Iterations(DEFAULT_WRITE_POLL_ATTEMPTS),
        bus: TwiConfig::STANDARD,
    };

    /// 1 Kbit (128 x 8) device on a 100 kHz bus
    pub const AT24C01: Self = Self {
        capacity: 128,
        ..Self::AT24C02
    };

    /// Check the device constants
    pub fn validate(&self) -> Result<(), Error> {
        if self.address > 0x7F {
            return Err(Error::InvalidConfig);
        }
        if self.capacity == 0
            || self.capacity > MAX_CAPACITY
            || usize::from(self.capacity) % PAGE_SIZE != 0
        {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_24c02() {
        let config = EepromConfig::default();
        assert_eq!(config.address, 0x50);
        assert_eq!(config.capacity, 256);
        assert_eq!(config.ack_policy, AckPolicy::Strict);
        assert_eq!(config.page_alignment, PageAlignment::RoundUp);
        assert!(config.validate().is_ok());
        assert!(EepromConfig::AT24C01.validate().is_ok());
    }

    #[test]
    fn test_invalid_device_constants() {
        let wide_address = EepromConfig {
            address: 0xA0,
            ..EepromConfig::AT24C02
        };
        assert_eq!(wide_address.validate(), Err(Error::InvalidConfig));

        let odd_capacity = EepromConfig {
            capacity: 100,
            ..EepromConfig::AT24C02
        };
        assert_eq!(odd_capacity.validate(), Err(Error::InvalidConfig));

        let oversized = EepromConfig {
            capacity: 512,
            ..EepromConfig::AT24C02
        };
        assert_eq!(oversized.validate(), Err(Error::InvalidConfig));
    }
}
