//! Lever Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs (RP2040, host simulation, etc.). This enables the
//! same calibration and monitoring logic to run on the board and in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (lever-firmware, tests)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lever-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  lever-hal-   │       │   RamEeprom   │
//! │    rp2040     │       │ (host / test) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AnalogInput`] - Raw lever position sampling
//! - [`gpio::InputPin`] - Digital input (calibration button)
//! - [`eeprom::EepromStorage`] - Byte-addressable persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod eeprom;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogInput};
pub use eeprom::{EepromError, EepromStorage, RamEeprom};
pub use gpio::{Button, InputPin};
