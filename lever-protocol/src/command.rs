//! Host commands
//!
//! | Line           | Command                |
//! |----------------|------------------------|
//! | `GET_DATA`     | [`Command::GetData`]   |
//! | `RESET_CALIB`  | [`Command::ResetCalib`]|
//! | `SET_ID:<id>`  | [`Command::SetId`]     |

use heapless::String;

/// Longest accepted device ID in bytes
pub const MAX_ID_LEN: usize = 16;

/// Device identifier carried in reports
pub type DeviceId = String<MAX_ID_LEN>;

const SET_ID_PREFIX: &str = "SET_ID:";

/// Commands accepted from the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Send a data report now
    GetData,
    /// Restore and persist the default calibration range
    ResetCalib,
    /// Change the device ID used in reports
    SetId(DeviceId),
}

/// Reasons a line is not a valid command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Not a known command
    Unknown,
    /// `SET_ID` with an empty, overlong, or non-printable ID
    InvalidId,
}

impl Command {
    /// Parse a trimmed command line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();

        match line {
            "GET_DATA" => Ok(Command::GetData),
            "RESET_CALIB" => Ok(Command::ResetCalib),
            _ => match line.strip_prefix(SET_ID_PREFIX) {
                Some(id) => parse_device_id(id).map(Command::SetId),
                None => Err(CommandError::Unknown),
            },
        }
    }
}

/// Validate a device ID
///
/// IDs are 1 to [`MAX_ID_LEN`] printable ASCII characters without quotes
/// or backslashes.
pub fn parse_device_id(id: &str) -> Result<DeviceId, CommandError> {
    let valid_char = |c: char| c.is_ascii_graphic() && c != '"' && c != '\\';
    if id.is_empty() || !id.chars().all(valid_char) {
        return Err(CommandError::InvalidId);
    }

    let mut out = DeviceId::new();
    out.push_str(id).map_err(|_| CommandError::InvalidId)?;
    Ok(out)
}
