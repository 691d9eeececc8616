//! Arbitrary-length access on top of the page and burst primitives
//!
//! Also implements the `embedded-storage` traits so the EEPROM can back
//! generic storage code.

use embedded_storage::{ReadStorage, Storage};
use twi_hal::TwiBus;

use super::Eeprom;
use crate::config::PAGE_SIZE;
use crate::error::Error;

/// Longest sequential read issued in one transaction
pub const MAX_BURST: usize = u8::MAX as usize;

impl<B: TwiBus> Eeprom<B> {
    /// Read `bytes.len()` bytes starting at `offset`
    ///
    /// Split into sequential reads of at most [`MAX_BURST`] bytes.
    pub fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Error> {
        self.check_range(offset, bytes.len())?;

        let mut address = offset;
        for chunk in bytes.chunks_mut(MAX_BURST) {
            let len = u8::try_from(chunk.len()).map_err(|_| Error::InvalidLength)?;
            let start = u8::try_from(address).map_err(|_| Error::OutOfBounds)?;
            self.read_sequential(chunk, start, len)?;
            address += u32::from(len);
        }
        Ok(())
    }

    /// Write `data` starting at `offset`
    ///
    /// Whole aligned pages go out as page writes; the unaligned head and
    /// tail are written byte by byte. Every write waits for its write cycle.
    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Error> {
        self.check_range(offset, data.len())?;

        let mut address = offset;
        let mut remaining = data;
        while !remaining.is_empty() {
            let start = u8::try_from(address).map_err(|_| Error::OutOfBounds)?;

            if usize::from(start) % PAGE_SIZE == 0 && remaining.len() >= PAGE_SIZE {
                let (page, rest) = remaining.split_at(PAGE_SIZE);
                let page: &[u8; PAGE_SIZE] = page.try_into().map_err(|_| Error::InvalidLength)?;
                self.write_page(start, page)?;
                remaining = rest;
                address += PAGE_SIZE as u32;
            } else {
                self.write_byte(start, remaining[0])?;
                remaining = &remaining[1..];
                address += 1;
            }
        }
        Ok(())
    }

    fn check_range(&self, offset: u32, len: usize) -> Result<(), Error> {
        let end = u32::try_from(len)
            .ok()
            .and_then(|len| offset.checked_add(len))
            .ok_or(Error::OutOfBounds)?;
        if end > u32::from(self.config.capacity) {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}

impl<B: TwiBus> ReadStorage for Eeprom<B> {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        Eeprom::read(self, offset, bytes)
    }

    fn capacity(&self) -> usize {
        usize::from(self.config.capacity)
    }
}

impl<B: TwiBus> Storage for Eeprom<B> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        Eeprom::write(self, offset, bytes)
    }
}
