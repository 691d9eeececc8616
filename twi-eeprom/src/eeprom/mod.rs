//! 24Cxx EEPROM driver
//!
//! # Bus protocol
//!
//! Every operation is one bus transaction bracketed by START and STOP:
//!
//! - Byte write: `S, SLA+W, addr, data, P`
//! - Random read: `S, SLA+W, addr, Sr, SLA+R, data(NAK), P`
//! - Page write: `S, SLA+W, addr, d0..d7, P`
//! - Sequential read: `S, SLA+W, addr, Sr, SLA+R, d0(ACK)..dn(NAK), P`
//!
//! After a write the device runs an internal write cycle during which it
//! does not acknowledge its address. Completion is detected by repeating
//! `S, SLA+W` until the address is acknowledged (acknowledge polling).

mod storage;

use twi_hal::{Direction, PollBudget, StatusCode, TwiBus};

use crate::config::{AckPolicy, EepromConfig, PageAlignment, PAGE_SIZE};
use crate::error::Error;

pub use storage::MAX_BURST;

/// EEPROM on a TWI bus
pub struct Eeprom<B> {
    bus: B,
    config: EepromConfig,
}

impl<B: TwiBus> Eeprom<B> {
    /// Create a driver owning `bus`
    pub fn new(bus: B, config: EepromConfig) -> Self {
        Self { bus, config }
    }

    /// Validate the configuration and set up the bus clock
    ///
    /// Call once at startup before any other operation.
    pub fn init(&mut self) -> Result<(), Error> {
        self.config.validate()?;
        self.bus.init(&self.config.bus)?;
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    /// Access the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable access to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Write one byte and wait for the write cycle to finish
    pub fn write_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
        self.check_address(address)?;
        self.transaction(|this| {
            this.select(Direction::Write)?;
            this.send(address)?;
            this.send(data)
        })?;
        self.wait_until_write_complete()
    }

    /// Read one byte
    ///
    /// Uses a dummy write to load the device's address pointer, then a
    /// repeated START to read a single byte answered with NAK.
    pub fn read_byte(&mut self, address: u8) -> Result<u8, Error> {
        self.check_address(address)?;
        self.transaction(|this| {
            this.select(Direction::Write)?;
            this.send(address)?;
            this.select(Direction::Read)?;
            this.receive(false)
        })
    }

    /// Write one page and wait for the write cycle to finish
    ///
    /// The address is aligned to a page boundary according to
    /// [`PageAlignment`]; see [`Eeprom::page_address`]. Payloads that span
    /// pages go through [`Eeprom::write`] instead.
    pub fn write_page(&mut self, address: u8, data: &[u8; PAGE_SIZE]) -> Result<(), Error> {
        let page = self.page_address(address)?;
        self.transaction(|this| {
            this.select(Direction::Write)?;
            this.send(page)?;
            for &byte in data.iter() {
                this.send(byte)?;
            }
            Ok(())
        })?;
        self.wait_until_write_complete()
    }

    /// Read `len` bytes starting at `start_address` into `buffer`
    ///
    /// The first `len - 1` bytes are acknowledged, the last one is answered
    /// with NAK to end the burst. The device's address pointer wraps at the
    /// end of its memory.
    pub fn read_sequential(
        &mut self,
        buffer: &mut [u8],
        start_address: u8,
        len: u8,
    ) -> Result<(), Error> {
        if len == 0 {
            return Err(Error::InvalidLength);
        }
        let target = buffer
            .get_mut(..usize::from(len))
            .ok_or(Error::BufferTooSmall)?;
        self.check_address(start_address)?;

        self.transaction(|this| {
            this.select(Direction::Write)?;
            this.send(start_address)?;
            this.select(Direction::Read)?;

            let (last, body) = target.split_last_mut().ok_or(Error::InvalidLength)?;
            for byte in body.iter_mut() {
                *byte = this.receive(true)?;
            }
            *last = this.receive(false)?;
            Ok(())
        })
    }

    /// Block until the device finishes its internal write cycle
    ///
    /// Repeats START and SLA+W until the address is acknowledged, then
    /// releases the bus. Each busy response costs one attempt from
    /// `write_poll_limit`; running out yields [`Error::Timeout`].
    pub fn wait_until_write_complete(&mut self) -> Result<(), Error> {
        let mut budget = PollBudget::new(self.config.write_poll_limit);

        loop {
            self.bus.start()?;
            self.bus
                .transmit_address(self.config.address, Direction::Write)?;

            let status = self.bus.read_status();
            if status == StatusCode::SLA_W_ACK {
                break;
            }

            if self.config.ack_policy == AckPolicy::Strict && status != StatusCode::SLA_W_NAK {
                #[cfg(feature = "defmt")]
                defmt::warn!("write poll aborted: {}", status);
                let _ = self.bus.stop();
                status.expect(StatusCode::SLA_W_ACK)?;
            }

            #[cfg(feature = "defmt")]
            defmt::trace!("device busy: {}", status);

            if budget.tick().is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("write cycle did not complete");
                let _ = self.bus.stop();
                return Err(Error::Timeout);
            }
        }

        self.bus.stop()?;
        Ok(())
    }

    /// Page-aligned address used by [`Eeprom::write_page`]
    ///
    /// With [`PageAlignment::RoundUp`] a misaligned address moves up to the
    /// next multiple of [`PAGE_SIZE`] (0x03 becomes 0x08). An address that
    /// would move past the end of the device is rejected either way.
    pub fn page_address(&self, address: u8) -> Result<u8, Error> {
        let offset = address % PAGE_SIZE as u8;
        let page = if offset == 0 {
            address
        } else {
            match self.config.page_alignment {
                PageAlignment::Reject => return Err(Error::InvalidAddress),
                PageAlignment::RoundUp => address
                    .checked_add(PAGE_SIZE as u8 - offset)
                    .ok_or(Error::InvalidAddress)?,
            }
        };
        self.check_address(page)?;
        Ok(page)
    }

    fn check_address(&self, address: u8) -> Result<(), Error> {
        if u16::from(address) < self.config.capacity {
            Ok(())
        } else {
            Err(Error::InvalidAddress)
        }
    }

    /// Run `body` as one transaction and always finish it with STOP
    fn transaction<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match body(self) {
            Ok(value) => {
                self.bus.stop()?;
                Ok(value)
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("transaction failed: {}", e);
                // Release the bus; the step error is the one worth reporting
                let _ = self.bus.stop();
                Err(e)
            }
        }
    }

    fn check(&self, expected: &[StatusCode]) -> Result<(), Error> {
        let status = self.bus.read_status();

        #[cfg(feature = "defmt")]
        defmt::trace!("status {}", status);

        match self.config.ack_policy {
            AckPolicy::Strict => status.expect_any(expected).map_err(Error::from),
            AckPolicy::Lenient => Ok(()),
        }
    }

    /// (Repeated) START followed by the device address
    fn select(&mut self, direction: Direction) -> Result<(), Error> {
        self.bus.start()?;
        self.check(&[StatusCode::START, StatusCode::REPEATED_START])?;
        self.bus.transmit_address(self.config.address, direction)?;
        self.check(&[StatusCode::address_ack(direction)])
    }

    fn send(&mut self, byte: u8) -> Result<(), Error> {
        self.bus.transmit_byte(byte)?;
        self.check(&[StatusCode::DATA_SENT_ACK])
    }

    fn receive(&mut self, ack: bool) -> Result<u8, Error> {
        let byte = self.bus.receive_byte(ack)?;
        self.check(&[StatusCode::received(ack)])?;
        Ok(byte)
    }
}
