//! Raw sample handling
//!
//! Keeps the recent sample history used for stuck-sensor detection and
//! smoothing.

pub mod window;

pub use window::SampleWindow;
