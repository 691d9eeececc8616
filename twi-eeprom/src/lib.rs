//! EEPROM protocol layer for two-wire serial EEPROMs
//!
//! This crate composes the `twi-hal` bus primitives into the access
//! patterns of 24Cxx-style EEPROMs:
//!
//! - Single byte write and read (dummy-write addressing for reads)
//! - 8-byte page write
//! - Sequential multi-byte read
//! - Write-cycle completion polling (acknowledge polling)
//! - Arbitrary-length reads and writes via [`embedded_storage`]
//!
//! The driver is blocking and single-master. It owns the bus for as long as
//! it lives; [`Eeprom::release`] hands it back.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod eeprom;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{AckPolicy, EepromConfig, PageAlignment, PAGE_SIZE};
pub use eeprom::Eeprom;
pub use error::Error;
