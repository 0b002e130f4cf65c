//! Error detection and recovery
//!
//! Detects fault conditions from supplied observations and drives a
//! single-active-error recovery state machine.

pub mod kind;
pub mod monitor;

pub use kind::{ErrorKind, RecoveryStrategy, BUTTON_RECOVERY_MS};
pub use monitor::{ErrorMonitor, RecoveryOutcome};
