//! Interactive calibration capture
//!
//! While active, every raw sample widens the observed min/max. The user
//! sweeps the lever through its full travel, then finishes the capture
//! to obtain a range ready for [`CalibrationStore::save_calibration`].
//!
//! [`CalibrationStore::save_calibration`]: super::CalibrationStore::save_calibration

use lever_hal::adc::RAW_MAX;

use super::is_valid_range;

/// Reasons a capture cannot produce a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Capture was not running or saw no usable samples
    NoSamples,
    /// Observed travel is narrower than the minimum span
    SpanTooSmall { min: i16, max: i16 },
}

/// Min/max tracker for a calibration sweep
#[derive(Debug, Clone, Default)]
pub struct CalibrationCapture {
    active: bool,
    observed: Option<(i16, i16)>,
}

impl CalibrationCapture {
    /// Create an idle capture
    pub const fn new() -> Self {
        Self {
            active: false,
            observed: None,
        }
    }

    /// Start a new sweep, discarding anything seen before
    pub fn begin(&mut self) {
        self.active = true;
        self.observed = None;
    }

    /// Whether a sweep is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Observed bounds so far
    pub fn observed(&self) -> Option<(i16, i16)> {
        self.observed
    }

    /// Feed one raw sample
    ///
    /// Ignored when idle. Readings outside the sensor's physical range
    /// are ignored too; those are sensor faults, not lever travel.
    pub fn observe(&mut self, raw: i16) {
        if !self.active || !(0..=RAW_MAX).contains(&raw) {
            return;
        }

        self.observed = Some(match self.observed {
            Some((min, max)) => (min.min(raw), max.max(raw)),
            None => (raw, raw),
        });
    }

    /// End the sweep and return the captured range
    pub fn finish(&mut self) -> Result<(i16, i16), CaptureError> {
        let was_active = self.active;
        self.active = false;

        let (min, max) = match self.observed.take() {
            Some(bounds) if was_active => bounds,
            _ => return Err(CaptureError::NoSamples),
        };

        if !is_valid_range(min, max) {
            return Err(CaptureError::SpanTooSmall { min, max });
        }

        Ok((min, max))
    }

    /// Abort the sweep without producing a range
    pub fn cancel(&mut self) {
        self.active = false;
        self.observed = None;
    }
}
