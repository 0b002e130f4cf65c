//! Analog input abstractions
//!
//! The lever potentiometer is read as a 10-bit raw value (0-1023),
//! regardless of the native converter resolution.

/// Full-scale raw value of the lever sensor
pub const RAW_MAX: i16 = 1023;

/// Errors from analog sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Conversion,
}

/// Analog input delivering raw lever samples
pub trait AnalogInput {
    /// Take one sample, scaled to the 10-bit raw range
    fn read_raw(&mut self) -> Result<i16, AdcError>;
}

/// Scale a native converter reading to the 10-bit raw range
///
/// `bits` is the native resolution (e.g. 12 for RP2040).
pub fn scale_to_raw(value: u16, bits: u8) -> i16 {
    let scaled = if bits >= 10 {
        value >> (bits - 10)
    } else {
        value << (10 - bits)
    };
    scaled.min(RAW_MAX as u16) as i16
}
