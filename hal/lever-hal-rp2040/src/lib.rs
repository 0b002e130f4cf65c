//! RP2040-specific HAL for the lever sensor firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `lever-hal` traits:
//!
//! - ADC sampling of the lever potentiometer (implements `lever_hal::AnalogInput`)
//! - Calibration button input (implements `lever_hal::InputPin`)
//! - Flash-backed EEPROM emulation (implements `lever_hal::EepromStorage`)

#![no_std]

pub mod adc;
pub mod eeprom;
pub mod gpio;

// Re-export shared traits from lever-hal for convenience
pub use lever_hal::{AnalogInput, EepromStorage, InputPin};
