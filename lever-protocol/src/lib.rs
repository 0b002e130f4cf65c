//! Lever serial protocol
//!
//! This crate defines the text protocol between the lever sensor and a
//! host over a UART or USB serial link.
//!
//! # Protocol Overview
//!
//! The host sends ASCII command lines; the device answers with one JSON
//! object per line:
//! ```text
//! host   → GET_DATA\n
//! device ← {"device_id":"lever1","timestamp":12,"data":{...},"status":{...}}\n
//! host   → SET_ID:lever2\n
//! device ← {"status":"OK","message":"ID set to lever2"}\n
//! ```
//!
//! Data reports are also sent unsolicited at a fixed interval.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod report;

pub use command::{Command, CommandError, DeviceId, MAX_ID_LEN};
pub use line::{LineBuffer, LineError, MAX_LINE_LEN};
pub use report::{
    DataReport, EncodeError, Reply, ReplyStatus, SensorData, StatusData, MAX_MESSAGE_SIZE,
};
