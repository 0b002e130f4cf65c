//! Display mode signal
//!
//! The core never renders anything. It derives which mode an attached
//! display should show; the renderer owns the patterns and animation.

use crate::error::ErrorKind;

/// How long the startup mode is shown after boot (ms)
pub const STARTUP_MS: u32 = 1500;

/// How long calibration results and command activity are flashed (ms)
pub const FLASH_MS: u32 = 1000;

/// What the display should currently present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Normalized 0-100 value
    Normal,
    /// Boot sequence
    Startup,
    /// Calibration sweep in progress
    Calibrating,
    /// Calibration just saved
    CalibSuccess,
    /// Calibration just rejected
    CalibFailure,
    /// An error is active
    Error(ErrorKind),
    /// A host command was just served
    Communication,
}

/// Tracks the timed events behind the display mode
#[derive(Debug, Clone)]
pub struct DisplayState {
    boot_ms: u32,
    calibration_result: Option<(bool, u32)>,
    last_command_ms: Option<u32>,
}

impl DisplayState {
    /// Start tracking at boot time `boot_ms`
    pub const fn new(boot_ms: u32) -> Self {
        Self {
            boot_ms,
            calibration_result: None,
            last_command_ms: None,
        }
    }

    /// Record the outcome of a calibration attempt
    pub fn note_calibration_result(&mut self, success: bool, now_ms: u32) {
        self.calibration_result = Some((success, now_ms));
    }

    /// Record that a host command was served
    pub fn note_command(&mut self, now_ms: u32) {
        self.last_command_ms = Some(now_ms);
    }

    /// Select the mode to show
    ///
    /// Priority: startup, error, calibrating, calibration result,
    /// communication, normal.
    pub fn mode(&self, now_ms: u32, error: ErrorKind, calibrating: bool) -> DisplayMode {
        let within = |since: u32, window: u32| now_ms.wrapping_sub(since) < window;

        if within(self.boot_ms, STARTUP_MS) {
            return DisplayMode::Startup;
        }
        if error != ErrorKind::NoError {
            return DisplayMode::Error(error);
        }
        if calibrating {
            return DisplayMode::Calibrating;
        }
        if let Some((success, at)) = self.calibration_result {
            if within(at, FLASH_MS) {
                return if success {
                    DisplayMode::CalibSuccess
                } else {
                    DisplayMode::CalibFailure
                };
            }
        }
        if let Some(at) = self.last_command_ms {
            if within(at, FLASH_MS) {
                return DisplayMode::Communication;
            }
        }

        DisplayMode::Normal
    }
}
