//! ADC sampling of the lever potentiometer
//!
//! RP2040 has a single 12-bit ADC with 5 channels:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29
//! - ADC4: Internal temperature sensor
//!
//! Samples are scaled down to the 10-bit raw range used by the lever core.

use embassy_rp::adc::{Adc, Blocking, Channel};
use lever_hal::adc::{scale_to_raw, AdcError, AnalogInput};

/// Native ADC resolution in bits
pub const ADC_BITS: u8 = 12;

/// ADC channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// ADC0 on GPIO26
    Adc0,
    /// ADC1 on GPIO27
    Adc1,
    /// ADC2 on GPIO28
    Adc2,
    /// ADC3 on GPIO29
    Adc3,
    /// Internal temperature sensor
    Temperature,
}

impl AdcChannel {
    /// Get the GPIO pin for this ADC channel
    pub fn gpio(&self) -> Option<u8> {
        match self {
            AdcChannel::Adc0 => Some(26),
            AdcChannel::Adc1 => Some(27),
            AdcChannel::Adc2 => Some(28),
            AdcChannel::Adc3 => Some(29),
            AdcChannel::Temperature => None,
        }
    }
}

/// Lever potentiometer on one ADC channel
pub struct LeverAdc<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> LeverAdc<'d> {
    /// Create a lever input from a blocking ADC and its channel
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl<'d> AnalogInput for LeverAdc<'d> {
    fn read_raw(&mut self) -> Result<i16, AdcError> {
        let value = self
            .adc
            .blocking_read(&mut self.channel)
            .map_err(|_| AdcError::Conversion)?;

        Ok(scale_to_raw(value, ADC_BITS))
    }
}
