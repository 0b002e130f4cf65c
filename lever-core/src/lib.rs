//! Board-agnostic core logic for the lever sensor firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Calibration range persistence, integrity checks, and 0-100 mapping
//! - Interactive calibration capture
//! - Error detection and the recovery state machine
//! - Raw sample history and smoothing
//! - Display mode selection
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod display;
pub mod error;
pub mod sensor;

pub use calibration::{map_to_0_100, CalibrationRange, CalibrationStore};
pub use error::{ErrorKind, ErrorMonitor};
