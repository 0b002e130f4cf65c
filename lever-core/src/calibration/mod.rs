//! Lever calibration
//!
//! A calibration range is the pair of raw readings that define 0% and
//! 100% of lever travel. The range is persisted with a checksum and
//! re-validated every time it is read back.

pub mod capture;
pub mod checksum;
pub mod store;

pub use capture::{CalibrationCapture, CaptureError};
pub use store::{CalibrationError, CalibrationStore, RECORD_SIZE};

/// Smallest accepted distance between min and max, in raw units
pub const MIN_SPAN: i16 = 50;

/// Raw lower bound used when no calibration exists
pub const DEFAULT_MIN: i16 = 0;

/// Raw upper bound used when no calibration exists
pub const DEFAULT_MAX: i16 = 1023;

/// Check that `min..max` is usable as a calibration range
///
/// True when `min < max` and the span is at least [`MIN_SPAN`].
pub const fn is_valid_range(min: i16, max: i16) -> bool {
    // Widen before subtracting so extreme inputs cannot overflow
    min < max && (max as i32 - min as i32) >= MIN_SPAN as i32
}

/// Calibration range for raw lever readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRange {
    /// Raw reading at 0% travel
    pub min_value: i16,
    /// Raw reading at 100% travel
    pub max_value: i16,
    /// Whether a user calibration exists (false means full-scale defaults)
    pub is_calibrated: bool,
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CalibrationRange {
    /// Full-scale, uncalibrated range
    pub const DEFAULT: Self = Self {
        min_value: DEFAULT_MIN,
        max_value: DEFAULT_MAX,
        is_calibrated: false,
    };

    /// Create a range
    pub const fn new(min_value: i16, max_value: i16, is_calibrated: bool) -> Self {
        Self {
            min_value,
            max_value,
            is_calibrated,
        }
    }

    /// Check the range invariant
    ///
    /// A calibrated range has to satisfy [`is_valid_range`]. An
    /// uncalibrated one only needs `min < max`, the same rule
    /// [`CalibrationStore::save_calibration`] applies.
    pub const fn is_consistent(&self) -> bool {
        if self.is_calibrated {
            is_valid_range(self.min_value, self.max_value)
        } else {
            self.min_value < self.max_value
        }
    }

    /// Map a raw reading into 0-100 using this range
    pub fn map(&self, raw: i16) -> u8 {
        map_to_0_100(raw, self)
    }
}

/// Map a raw reading to 0-100 percent of travel
///
/// The reading is clamped to the range first, so out-of-range values
/// give 0 or 100 instead of an error. Integer arithmetic with
/// round-half-up. A degenerate range (`max <= min`) maps to 0.
pub fn map_to_0_100(raw: i16, range: &CalibrationRange) -> u8 {
    let min = range.min_value as i32;
    let max = range.max_value as i32;
    if max <= min {
        return 0;
    }

    let clamped = (raw as i32).clamp(min, max);
    let span = max - min;

    // (offset * 100 + span / 2) / span rounds half up for non-negative values
    let percent = ((clamped - min) * 100 + span / 2) / span;
    percent.clamp(0, 100) as u8
}
