//! TWI bus driver for ATmega328P
//!
//! Drives the two-wire interface through its four memory-mapped registers.
//! Every step writes a TWCR command and spins on the TWINT flag (or on TWSTO
//! for STOP), bounded by the poll limit from the bus configuration.

use twi_hal::{header, poll_until, Direction, PollLimit, StatusCode, TwiBus, TwiConfig, TwiError};

/// TWI register addresses (data memory space)
pub mod reg {
    /// Bit rate register
    pub const TWBR: *mut u8 = 0x00B8 as *mut u8;
    /// Status register (status bits + prescaler)
    pub const TWSR: *mut u8 = 0x00B9 as *mut u8;
    /// Data register
    pub const TWDR: *mut u8 = 0x00BB as *mut u8;
    /// Control register
    pub const TWCR: *mut u8 = 0x00BC as *mut u8;
}

/// TWCR bits
pub mod bits {
    /// Interrupt flag, set by hardware when a step completes
    pub const TWINT: u8 = 0x80;
    /// Enable acknowledge
    pub const TWEA: u8 = 0x40;
    /// START condition
    pub const TWSTA: u8 = 0x20;
    /// STOP condition
    pub const TWSTO: u8 = 0x10;
    /// TWI enable
    pub const TWEN: u8 = 0x04;
}

use bits::{TWEA, TWEN, TWINT, TWSTA, TWSTO};

/// TWCR command that generates a START condition
pub const START_COMMAND: u8 = TWINT | TWSTA | TWEN;
/// TWCR command that generates a STOP condition
pub const STOP_COMMAND: u8 = TWINT | TWSTO | TWEN;
/// TWCR command that shifts out the data register
pub const TRANSMIT_COMMAND: u8 = TWINT | TWEN;

/// TWCR command that receives one byte, returning ACK or NAK
pub const fn receive_command(ack: bool) -> u8 {
    if ack {
        TWINT | TWEN | TWEA
    } else {
        TWINT | TWEN
    }
}

/// The ATmega328P two-wire interface
///
/// Only one instance should exist; it assumes exclusive ownership of the
/// TWI registers.
pub struct Twi {
    poll_limit: PollLimit,
}

impl Default for Twi {
    fn default() -> Self {
        Self::new()
    }
}

impl Twi {
    /// Create the driver; call [`TwiBus::init`] before use
    pub const fn new() -> Self {
        Self {
            poll_limit: PollLimit::Iterations(twi_hal::poll::DEFAULT_POLL_ITERATIONS),
        }
    }

    #[allow(unsafe_code)]
    fn write_register(register: *mut u8, value: u8) {
        // SAFETY: `register` is one of the TWI MMIO addresses in `reg`
        unsafe { register.write_volatile(value) }
    }

    #[allow(unsafe_code)]
    fn read_register(register: *mut u8) -> u8 {
        // SAFETY: `register` is one of the TWI MMIO addresses in `reg`
        unsafe { register.read_volatile() }
    }

    /// Issue a TWCR command and wait for TWINT
    fn command(&mut self, command: u8) -> Result<(), TwiError> {
        Self::write_register(reg::TWCR, command);
        poll_until(self.poll_limit, || {
            Self::read_register(reg::TWCR) & TWINT != 0
        })
    }
}

impl TwiBus for Twi {
    fn init(&mut self, config: &TwiConfig) -> Result<(), TwiError> {
        let bit_rate = config.bit_rate()?;
        self.poll_limit = config.poll_limit;

        Self::write_register(reg::TWSR, config.prescaler.bits());
        Self::write_register(reg::TWBR, bit_rate);
        Self::write_register(reg::TWCR, TWEN);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "TWI enabled: {} Hz, TWBR={}, prescaler={}",
            config.frequency,
            bit_rate,
            config.prescaler
        );
        Ok(())
    }

    fn read_status(&self) -> StatusCode {
        StatusCode::from_raw(Self::read_register(reg::TWSR))
    }

    fn start(&mut self) -> Result<(), TwiError> {
        self.command(START_COMMAND)
    }

    fn stop(&mut self) -> Result<(), TwiError> {
        // TWINT is not set after STOP; TWSTO clears once it has executed
        Self::write_register(reg::TWCR, STOP_COMMAND);
        poll_until(self.poll_limit, || {
            Self::read_register(reg::TWCR) & TWSTO == 0
        })
    }

    fn transmit_address(&mut self, address: u8, direction: Direction) -> Result<(), TwiError> {
        Self::write_register(reg::TWDR, header(address, direction));
        self.command(TRANSMIT_COMMAND)
    }

    fn transmit_byte(&mut self, data: u8) -> Result<(), TwiError> {
        Self::write_register(reg::TWDR, data);
        self.command(TRANSMIT_COMMAND)
    }

    fn receive_byte(&mut self, ack: bool) -> Result<u8, TwiError> {
        self.command(receive_command(ack))?;
        Ok(Self::read_register(reg::TWDR))
    }
}
