//! GPIO input for the calibration button

use embassy_rp::gpio::Input;

/// RP2040 input pin implementing `lever_hal::InputPin`
pub struct Rp2040Input<'d> {
    pin: Input<'d>,
}

impl<'d> Rp2040Input<'d> {
    /// Wrap a configured embassy input
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> lever_hal::InputPin for Rp2040Input<'d> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
