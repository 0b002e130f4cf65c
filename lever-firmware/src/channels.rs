//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

use lever_protocol::{Command, CommandError, MAX_LINE_LEN, MAX_MESSAGE_SIZE};

/// Channel capacity for parsed host lines
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Channel capacity for encoded outbound lines
const OUTBOUND_CHANNEL_SIZE: usize = 4;

/// A line received from the host
#[derive(Debug, Clone)]
pub enum HostRequest {
    /// Parsed command
    Command(Command),
    /// Line that did not parse, kept for the error reply
    Rejected {
        error: CommandError,
        line: String<MAX_LINE_LEN>,
    },
}

/// One encoded JSON line ready for the wire
pub type OutboundLine = Vec<u8, MAX_MESSAGE_SIZE>;

/// Host requests from the serial receiver to the controller
pub static HOST_REQUESTS: Channel<CriticalSectionRawMutex, HostRequest, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Encoded reports and replies from the controller to the serial transmitter
pub static OUTBOUND: Channel<CriticalSectionRawMutex, OutboundLine, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();
