//! I2C bus primitives
//!
//! Provides the step-level trait that TWI master controllers implement.
//! Each method performs exactly one bus step and blocks until the hardware
//! reports completion; the outcome is read back with
//! [`TwiBus::read_status`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TwiError;
use crate::poll::PollLimit;
use crate::status::StatusCode;

/// Data direction encoded in the R/W bit of the address header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master receives from the slave (R/W = 1)
    Read,
    /// Master transmits to the slave (R/W = 0)
    Write,
}

impl Direction {
    /// Value of the R/W bit
    pub const fn bit(self) -> u8 {
        match self {
            Direction::Read => 1,
            Direction::Write => 0,
        }
    }
}

/// Pack a 7-bit slave address and a direction into an SLA+R/W header
pub const fn header(address: u8, direction: Direction) -> u8 {
    ((address & 0x7F) << 1) | direction.bit()
}

/// Bit rate prescaler (TWPS bits of the status register)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prescaler {
    #[default]
    Div1,
    Div4,
    Div16,
    Div64,
}

impl Prescaler {
    /// Register bits for this prescaler
    pub const fn bits(self) -> u8 {
        match self {
            Prescaler::Div1 => 0,
            Prescaler::Div4 => 1,
            Prescaler::Div16 => 2,
            Prescaler::Div64 => 3,
        }
    }

    /// Clock divisor applied to the bit rate register
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }
}

/// Bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwiConfig {
    /// CPU clock feeding the TWI unit in Hz
    pub cpu_hz: u32,
    /// SCL frequency in Hz
    pub frequency: u32,
    /// Bit rate prescaler
    pub prescaler: Prescaler,
    /// Bound on every completion wait
    pub poll_limit: PollLimit,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TwiConfig {
    /// Standard mode (100 kHz) on a 16 MHz part
    pub const STANDARD: Self = Self {
        cpu_hz: 16_000_000,
        frequency: 100_000,
        prescaler: Prescaler::Div1,
        poll_limit: PollLimit::Iterations(crate::poll::DEFAULT_POLL_ITERATIONS),
    };

    /// Fast mode (400 kHz) on a 16 MHz part
    pub const FAST: Self = Self {
        frequency: 400_000,
        ..Self::STANDARD
    };

    /// Bit rate register value for this configuration
    ///
    /// `SCL = F_CPU / (16 + 2 * TWBR * prescaler)`, solved for TWBR.
    pub fn bit_rate(&self) -> Result<u8, TwiError> {
        if self.frequency == 0 {
            return Err(TwiError::InvalidConfig);
        }
        let cycles = self.cpu_hz / self.frequency;
        let scaled = cycles
            .checked_sub(16)
            .ok_or(TwiError::InvalidConfig)?
            / (2 * self.prescaler.divisor());
        u8::try_from(scaled).map_err(|_| TwiError::InvalidConfig)
    }
}

/// TWI bus master primitives
///
/// One bus step per call. Implementations block until the controller
/// signals completion, bounded by the configured [`PollLimit`]. Whether
/// the step was acknowledged is not reported here; callers inspect
/// [`read_status`](TwiBus::read_status) afterwards.
pub trait TwiBus {
    /// Program the bus clock and enable the controller
    fn init(&mut self, config: &TwiConfig) -> Result<(), TwiError>;

    /// Current masked status code
    fn read_status(&self) -> StatusCode;

    /// Generate a (repeated) START condition
    fn start(&mut self) -> Result<(), TwiError>;

    /// Generate a STOP condition and wait until it has executed
    fn stop(&mut self) -> Result<(), TwiError>;

    /// Transmit the SLA+R/W header for a 7-bit address
    fn transmit_address(&mut self, address: u8, direction: Direction) -> Result<(), TwiError>;

    /// Transmit one data byte
    fn transmit_byte(&mut self, data: u8) -> Result<(), TwiError>;

    /// Receive one data byte
    ///
    /// `ack = true` acknowledges the byte so the slave keeps sending;
    /// `ack = false` returns NAK to mark the last byte of a burst.
    fn receive_byte(&mut self, ack: bool) -> Result<u8, TwiError>;
}
