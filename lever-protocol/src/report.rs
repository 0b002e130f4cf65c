//! JSON messages sent to the host
//!
//! Every message is a single JSON object followed by `\n`:
//!
//! ```text
//! {"device_id":"lever1","timestamp":12,"data":{"raw":512,"smoothed":510,
//!  "value":50,"calibrated":true,"calib_min":0,"calib_max":1023},
//!  "status":{"error_code":0}}
//! {"status":"OK","message":"Calibration reset"}
//! ```

use core::fmt::Write;

use heapless::String;
use serde::Serialize;

use crate::command::CommandError;

/// Buffer size that fits any encoded message
pub const MAX_MESSAGE_SIZE: usize = 256;

/// Longest reply message text
pub const MAX_REPLY_TEXT: usize = 64;

/// Errors while encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer cannot hold the message and its terminator
    BufferTooSmall,
}

/// Sensor readings section of a [`DataReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorData {
    pub raw: i16,
    pub smoothed: i16,
    pub value: u8,
    pub calibrated: bool,
    pub calib_min: i16,
    pub calib_max: i16,
}

/// Status section of a [`DataReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusData {
    pub error_code: u8,
}

/// Periodic or on-demand data report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataReport<'a> {
    pub device_id: &'a str,
    /// Seconds since boot
    pub timestamp: u32,
    pub data: SensorData,
    pub status: StatusData,
}

impl DataReport<'_> {
    /// Encode as a newline-terminated JSON line
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        encode_line(self, buffer)
    }
}

/// Outcome carried by a [`Reply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

/// Acknowledgement of a host command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub status: ReplyStatus,
    pub message: String<MAX_REPLY_TEXT>,
}

impl Reply {
    /// Reply with free-form text, truncated to [`MAX_REPLY_TEXT`]
    pub fn new(status: ReplyStatus, text: &str) -> Self {
        let mut message = String::new();
        push_truncated(&mut message, text);
        Self { status, message }
    }

    /// `RESET_CALIB` succeeded
    pub fn calibration_reset() -> Self {
        Self::new(ReplyStatus::Ok, "Calibration reset")
    }

    /// `RESET_CALIB` could not persist the defaults
    pub fn calibration_reset_failed() -> Self {
        Self::new(ReplyStatus::Error, "Calibration reset failed")
    }

    /// `SET_ID` succeeded
    pub fn id_set(id: &str) -> Self {
        let mut reply = Self::new(ReplyStatus::Ok, "ID set to ");
        push_truncated(&mut reply.message, id);
        reply
    }

    /// A line was rejected
    pub fn rejected(error: CommandError, line: &str) -> Self {
        match error {
            CommandError::Unknown => {
                let mut reply = Self::new(ReplyStatus::Error, "Unknown command: ");
                push_truncated(&mut reply.message, line);
                reply
            }
            CommandError::InvalidId => Self::new(ReplyStatus::Error, "Invalid device ID"),
        }
    }

    /// Encode as a newline-terminated JSON line
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        encode_line(self, buffer)
    }
}

fn push_truncated(out: &mut String<MAX_REPLY_TEXT>, text: &str) {
    for c in text.chars() {
        if out.write_char(c).is_err() {
            break;
        }
    }
}

/// Serialize `value` as JSON followed by `\n`
///
/// Returns the number of bytes written.
pub fn encode_line<T: Serialize>(value: &T, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    let len = serde_json_core::to_slice(value, buffer).map_err(|_| EncodeError::BufferTooSmall)?;
    let terminator = buffer.get_mut(len).ok_or(EncodeError::BufferTooSmall)?;
    *terminator = b'\n';
    Ok(len + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(device_id: &str) -> DataReport<'_> {
        DataReport {
            device_id,
            timestamp: 12,
            data: SensorData {
                raw: 512,
                smoothed: 510,
                value: 50,
                calibrated: true,
                calib_min: 0,
                calib_max: 1023,
            },
            status: StatusData { error_code: 0 },
        }
    }

    fn encoded(buffer: &[u8], len: usize) -> &str {
        core::str::from_utf8(&buffer[..len]).unwrap()
    }

    #[test]
    fn test_data_report_layout() {
        let mut buffer = [0u8; MAX_MESSAGE_SIZE];
        let len = sample_report("lever1").encode(&mut buffer).unwrap();

        assert_eq!(
            encoded(&buffer, len),
            "{\"device_id\":\"lever1\",\"timestamp\":12,\"data\":{\"raw\":512,\
             \"smoothed\":510,\"value\":50,\"calibrated\":true,\"calib_min\":0,\
             \"calib_max\":1023},\"status\":{\"error_code\":0}}\n"
        );
    }

    #[test]
    fn test_worst_case_report_fits() {
        let mut report = sample_report("0123456789abcdef");
        report.timestamp = u32::MAX;
        report.data = SensorData {
            raw: i16::MIN,
            smoothed: i16::MIN,
            value: 100,
            calibrated: false,
            calib_min: i16::MIN,
            calib_max: i16::MIN,
        };
        report.status.error_code = 99;

        let mut buffer = [0u8; MAX_MESSAGE_SIZE];
        assert!(report.encode(&mut buffer).is_ok());
    }

    #[test]
    fn test_replies() {
        let mut buffer = [0u8; MAX_MESSAGE_SIZE];

        let len = Reply::calibration_reset().encode(&mut buffer).unwrap();
        assert_eq!(
            encoded(&buffer, len),
            "{\"status\":\"OK\",\"message\":\"Calibration reset\"}\n"
        );

        let len = Reply::id_set("lever2").encode(&mut buffer).unwrap();
        assert_eq!(
            encoded(&buffer, len),
            "{\"status\":\"OK\",\"message\":\"ID set to lever2\"}\n"
        );

        let len = Reply::rejected(CommandError::Unknown, "HELLO")
            .encode(&mut buffer)
            .unwrap();
        assert_eq!(
            encoded(&buffer, len),
            "{\"status\":\"ERROR\",\"message\":\"Unknown command: HELLO\"}\n"
        );
    }

    #[test]
    fn test_reply_text_truncated() {
        let long = [b'x'; 100];
        let reply = Reply::rejected(
            CommandError::Unknown,
            core::str::from_utf8(&long).unwrap(),
        );
        assert_eq!(reply.message.len(), MAX_REPLY_TEXT);
        assert!(reply.message.starts_with("Unknown command: xxx"));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; 16];
        assert_eq!(
            sample_report("lever1").encode(&mut buffer),
            Err(EncodeError::BufferTooSmall)
        );

        // Room for the JSON but not the terminator
        let reply = Reply::calibration_reset();
        let mut exact = [0u8; 45];
        assert_eq!(reply.encode(&mut exact), Err(EncodeError::BufferTooSmall));
    }
}
