//! Error monitor implementation
//!
//! Detects fault conditions from observations supplied by the control
//! loop and holds a single active error with its recovery state.
//!
//! All timing is poll-based: every call that needs a clock takes the
//! caller's monotonic millisecond timestamp. Differences use wrapping
//! arithmetic so a `u32` rollover (~49 days) does not produce false
//! timeouts.

use lever_hal::adc::RAW_MAX;

use super::kind::ErrorKind;
use crate::calibration::is_valid_range;

/// Result of one recovery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryOutcome {
    /// No error was active
    NothingToRecover,
    /// The error was cleared
    Recovered(ErrorKind),
    /// The error is still active
    Pending {
        kind: ErrorKind,
        /// True on the first attempt of this error episode
        first_attempt: bool,
    },
}

impl RecoveryOutcome {
    /// Whether the monitor is error-free after this attempt
    pub fn is_clear(&self) -> bool {
        !matches!(self, RecoveryOutcome::Pending { .. })
    }
}

/// Error monitor for fault detection and recovery
///
/// Holds at most one current error. A newly detected error always
/// replaces the previous one; per-kind counters keep the history.
#[derive(Debug, Clone)]
pub struct ErrorMonitor {
    /// Currently active error
    current_error: ErrorKind,
    /// Timestamp at which the current error was raised (ms)
    error_start_ms: u32,
    /// Cumulative occurrences, indexed by `ErrorKind::index`
    error_counts: [u32; ErrorKind::COUNT],
    /// Recovery has been attempted for the current error
    in_recovery: bool,
    /// Button level seen on the previous stuck check
    last_button_state: bool,
    /// Timestamp of the last button transition (ms)
    press_start_ms: u32,
}

impl Default for ErrorMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorMonitor {
    /// Create a monitor with no active error
    pub const fn new() -> Self {
        Self {
            current_error: ErrorKind::NoError,
            error_start_ms: 0,
            error_counts: [0; ErrorKind::COUNT],
            in_recovery: false,
            last_button_state: false,
            press_start_ms: 0,
        }
    }

    /// Check a raw sample for a stuck or out-of-range sensor
    ///
    /// Stuck means `raw` equals every one of the first `sample_count`
    /// entries of `recent_samples`. Fewer than `sample_count` samples, or
    /// a zero count, is not enough evidence and never flags.
    pub fn check_sensor_error(
        &mut self,
        raw: i16,
        recent_samples: &[i16],
        sample_count: usize,
        now_ms: u32,
    ) -> bool {
        let is_stuck = sample_count > 0
            && recent_samples.len() >= sample_count
            && recent_samples[..sample_count].iter().all(|&s| s == raw);
        let out_of_range = !(0..=RAW_MAX).contains(&raw);

        if is_stuck || out_of_range {
            self.set_error(ErrorKind::SensorError, now_ms);
            return true;
        }

        false
    }

    /// Check a calibration triple for semantic validity
    ///
    /// Catches ranges that passed the load-time checksum but cannot be
    /// used; uncalibrated ranges are never flagged.
    pub fn check_calibration_data(
        &mut self,
        min: i16,
        max: i16,
        is_calibrated: bool,
        now_ms: u32,
    ) -> bool {
        if is_calibrated && !is_valid_range(min, max) {
            self.set_error(ErrorKind::CalibrationError, now_ms);
            return true;
        }

        false
    }

    /// Check for a button held down longer than `threshold_ms`
    ///
    /// A level change only records the transition time. The press is
    /// flagged on a later call once it has lasted strictly longer than
    /// the threshold.
    pub fn check_button_stuck(&mut self, pressed: bool, threshold_ms: u32, now_ms: u32) -> bool {
        if pressed != self.last_button_state {
            self.last_button_state = pressed;
            self.press_start_ms = now_ms;
            return false;
        }

        if pressed && now_ms.wrapping_sub(self.press_start_ms) > threshold_ms {
            self.set_error(ErrorKind::ButtonError, now_ms);
            return true;
        }

        false
    }

    /// Check for host link silence longer than `timeout_ms`
    pub fn check_communication_timeout(
        &mut self,
        last_comm_ms: u32,
        timeout_ms: u32,
        now_ms: u32,
    ) -> bool {
        if now_ms.wrapping_sub(last_comm_ms) > timeout_ms {
            self.set_error(ErrorKind::CommunicationError, now_ms);
            return true;
        }

        false
    }

    /// Make `kind` the current error
    ///
    /// Overwrites any active error, restarts the episode clock, bumps the
    /// kind's counter, and clears the recovery flag. `NoError` clears.
    pub fn set_error(&mut self, kind: ErrorKind, now_ms: u32) {
        if kind == ErrorKind::NoError {
            self.clear_error();
            return;
        }

        self.current_error = kind;
        self.error_start_ms = now_ms;
        let count = &mut self.error_counts[kind.index()];
        *count = count.saturating_add(1);
        self.in_recovery = false;
    }

    /// Set or clear an error; `active = false` clears whatever is current
    pub fn set_error_active(&mut self, kind: ErrorKind, active: bool, now_ms: u32) {
        if active {
            self.set_error(kind, now_ms);
        } else {
            self.clear_error();
        }
    }

    /// Return to the error-free state
    pub fn clear_error(&mut self) {
        self.current_error = ErrorKind::NoError;
        self.in_recovery = false;
    }

    /// Attempt recovery from the current error
    ///
    /// Safe to call every tick. The first call of an episode marks
    /// recovery as started; later calls only re-evaluate the kind's
    /// recovery condition. Returns true when no error remains.
    pub fn handle_error(&mut self, now_ms: u32) -> bool {
        self.handle_error_outcome(now_ms).is_clear()
    }

    /// Attempt recovery, reporting what happened
    pub fn handle_error_outcome(&mut self, now_ms: u32) -> RecoveryOutcome {
        let kind = self.current_error;
        if kind == ErrorKind::NoError {
            return RecoveryOutcome::NothingToRecover;
        }

        let first_attempt = !self.in_recovery;
        self.in_recovery = true;

        let elapsed = now_ms.wrapping_sub(self.error_start_ms);
        if kind.recovery_strategy().is_recovered(elapsed) {
            self.clear_error();
            RecoveryOutcome::Recovered(kind)
        } else {
            RecoveryOutcome::Pending {
                kind,
                first_attempt,
            }
        }
    }

    /// Currently active error
    pub fn current_error(&self) -> ErrorKind {
        self.current_error
    }

    /// Whether any error is active
    pub fn has_error(&self) -> bool {
        self.current_error != ErrorKind::NoError
    }

    /// Cumulative occurrences of `kind` since boot
    pub fn error_count(&self, kind: ErrorKind) -> u32 {
        self.error_counts[kind.index()]
    }

    /// Whether recovery has been attempted for the current error
    pub fn in_recovery(&self) -> bool {
        self.in_recovery
    }

    /// Timestamp at which the current error was raised
    pub fn error_start_ms(&self) -> u32 {
        self.error_start_ms
    }
}
