//! GPIO pin abstractions
//!
//! Provides the digital input trait used for the calibration button.

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Push button on a digital input
///
/// Maps the electrical level to "pressed" according to the wiring.
pub struct Button<P: InputPin> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> Button<P> {
    /// Create a button; `active_low` for a switch to ground with pull-up
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Whether the button is currently held down
    pub fn is_pressed(&self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
