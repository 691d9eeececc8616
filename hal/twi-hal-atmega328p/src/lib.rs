//! ATmega328P-specific HAL for the TWI bus
//!
//! This crate provides the register-level implementation of the
//! `twi-hal` primitives for the ATmega328P two-wire interface.
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! use twi_hal::{TwiBus, TwiConfig};
//! use twi_hal_atmega328p::Twi;
//!
//! let mut twi = Twi::new();
//! twi.init(&TwiConfig::STANDARD)?;
//! ```

#![no_std]

pub mod i2c;

pub use i2c::Twi;
// Re-export shared types from twi-hal
pub use twi_hal::{Direction, StatusCode, TwiBus, TwiConfig, TwiError};
