//! Two-wire bus hardware abstraction
//!
//! This crate defines the bus primitive trait that chip-specific TWI
//! controllers implement (ATmega328P registers, simulated devices, etc.),
//! along with the status codes those controllers report after every step.
//! Device drivers such as `twi-eeprom` are written against [`TwiBus`] only.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (twi-eeprom, ...)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twi-hal (this crate - primitives)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   twi-hal-    │       │  simulated    │
//! │  atmega328p   │       │    devices    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`i2c`] - [`TwiBus`] primitives, direction and bus configuration
//! - [`status`] - Masked status register codes
//! - [`poll`] - Bounded completion polling
//! - [`master`] - `embedded-hal` I2C adapter built from the primitives

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod i2c;
pub mod master;
pub mod poll;
pub mod status;

// Re-export key types at crate root for convenience
pub use error::TwiError;
pub use i2c::{header, Direction, Prescaler, TwiBus, TwiConfig};
pub use master::TwiMaster;
pub use poll::{poll_until, PollBudget, PollLimit};
pub use status::{Status, StatusCode};
