//! Calibration persistence
//!
//! Owns the active calibration range and its on-media record. Every
//! save and reset is written through immediately; every load re-checks
//! the header, checksum, and range invariant before the data is trusted.
//!
//! Record layout (little endian, [`RECORD_SIZE`] bytes):
//!
//! ```text
//! ┌───────┬─────────┬─────┬─────┬────────────┬───────┐
//! │ MAGIC │ VERSION │ MIN │ MAX │ CALIBRATED │ CRC32 │
//! │ 2B    │ 1B      │ 2B  │ 2B  │ 1B         │ 4B    │
//! └───────┴─────────┴─────┴─────┴────────────┴───────┘
//! ```
//!
//! The CRC covers everything before it. Header, triple, and CRC go out in
//! one `write` call, so a torn write shows up as a CRC mismatch on the
//! next load.

use lever_hal::eeprom::{EepromError, EepromStorage};

use super::checksum::crc32;
use super::{is_valid_range, map_to_0_100, CalibrationRange};

/// Magic number identifying a calibration record ("LV")
pub const RECORD_MAGIC: u16 = 0x4C56;

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Bytes covered by the CRC
const PAYLOAD_SIZE: usize = 8;

/// Total record size in storage
pub const RECORD_SIZE: usize = PAYLOAD_SIZE + 4;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Storage operation failed
    Storage(EepromError),
    /// Storage is erased, nothing was ever saved
    NotFound,
    /// Invalid magic, version, or flag byte
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
    /// Range violates the calibration invariant
    InvalidRange,
}

impl From<EepromError> for CalibrationError {
    fn from(e: EepromError) -> Self {
        CalibrationError::Storage(e)
    }
}

/// Serialize a range into a record with a fresh CRC
pub fn encode_record(range: &CalibrationRange) -> [u8; RECORD_SIZE] {
    let mut record = [0u8; RECORD_SIZE];

    record[0..2].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    record[2] = RECORD_VERSION;
    record[3..5].copy_from_slice(&range.min_value.to_le_bytes());
    record[5..7].copy_from_slice(&range.max_value.to_le_bytes());
    record[7] = range.is_calibrated as u8;

    let crc = crc32(&record[..PAYLOAD_SIZE]);
    record[PAYLOAD_SIZE..].copy_from_slice(&crc.to_le_bytes());

    record
}

/// Parse and validate a stored record
pub fn decode_record(record: &[u8; RECORD_SIZE]) -> Result<CalibrationRange, CalibrationError> {
    if record.iter().all(|&b| b == 0xFF) {
        return Err(CalibrationError::NotFound);
    }

    let magic = u16::from_le_bytes([record[0], record[1]]);
    if magic != RECORD_MAGIC || record[2] != RECORD_VERSION {
        return Err(CalibrationError::InvalidFormat);
    }

    let stored_crc = u32::from_le_bytes([
        record[PAYLOAD_SIZE],
        record[PAYLOAD_SIZE + 1],
        record[PAYLOAD_SIZE + 2],
        record[PAYLOAD_SIZE + 3],
    ]);
    if stored_crc != crc32(&record[..PAYLOAD_SIZE]) {
        return Err(CalibrationError::CrcMismatch);
    }

    let is_calibrated = match record[7] {
        0 => false,
        1 => true,
        _ => return Err(CalibrationError::InvalidFormat),
    };

    let range = CalibrationRange {
        min_value: i16::from_le_bytes([record[3], record[4]]),
        max_value: i16::from_le_bytes([record[5], record[6]]),
        is_calibrated,
    };

    if !range.is_consistent() {
        return Err(CalibrationError::InvalidRange);
    }

    Ok(range)
}

/// Persisted calibration range
///
/// The active range starts at the full-scale defaults and only changes
/// through [`load_calibration`](Self::load_calibration),
/// [`save_calibration`](Self::save_calibration), or
/// [`reset_calibration`](Self::reset_calibration). Callers get copies.
pub struct CalibrationStore<S: EepromStorage> {
    storage: S,
    offset: usize,
    range: CalibrationRange,
}

impl<S: EepromStorage> CalibrationStore<S> {
    /// Create a store whose record lives at `offset` in `storage`
    ///
    /// Nothing is read until [`load_calibration`](Self::load_calibration).
    pub fn new(storage: S, offset: usize) -> Self {
        Self {
            storage,
            offset,
            range: CalibrationRange::DEFAULT,
        }
    }

    /// Currently active range
    pub fn range(&self) -> CalibrationRange {
        self.range
    }

    /// Whether the active range comes from a user calibration
    pub fn is_calibrated(&self) -> bool {
        self.range.is_calibrated
    }

    /// Map a raw reading through the active range
    pub fn map_to_0_100(&self, raw: i16) -> u8 {
        map_to_0_100(raw, &self.range)
    }

    /// Validate and persist a new range
    ///
    /// A calibrated range must pass [`is_valid_range`]; otherwise nothing
    /// is written and `InvalidRange` is returned. An uncalibrated range
    /// only needs `min < max`.
    pub fn save_calibration(
        &mut self,
        min: i16,
        max: i16,
        calibrated: bool,
    ) -> Result<(), CalibrationError> {
        let valid = if calibrated {
            is_valid_range(min, max)
        } else {
            min < max
        };
        if !valid {
            return Err(CalibrationError::InvalidRange);
        }

        let range = CalibrationRange::new(min, max, calibrated);
        self.write_record(&range)?;
        self.range = range;

        Ok(())
    }

    /// Read the stored range back
    ///
    /// On success the loaded range becomes active. On any failure the
    /// stored data is not trusted: the active range falls back to the
    /// defaults and the reason is returned for the caller to report.
    pub fn load_calibration(&mut self) -> Result<CalibrationRange, CalibrationError> {
        match self.read_record() {
            Ok(range) => {
                self.range = range;
                Ok(range)
            }
            Err(e) => {
                self.range = CalibrationRange::DEFAULT;
                Err(e)
            }
        }
    }

    /// Load the stored range, using the defaults when it is absent or corrupt
    pub fn load_or_default(&mut self) -> CalibrationRange {
        self.load_calibration().unwrap_or(CalibrationRange::DEFAULT)
    }

    /// Persist the full-scale defaults
    ///
    /// The active range is reset even if the medium rejects the write.
    pub fn reset_calibration(&mut self) -> Result<(), CalibrationError> {
        self.range = CalibrationRange::DEFAULT;
        self.write_record(&CalibrationRange::DEFAULT)
    }

    /// Access the underlying storage
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the store, returning the storage
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn write_record(&mut self, range: &CalibrationRange) -> Result<(), CalibrationError> {
        let record = encode_record(range);
        self.storage.write(self.offset, &record)?;
        Ok(())
    }

    fn read_record(&mut self) -> Result<CalibrationRange, CalibrationError> {
        let mut record = [0u8; RECORD_SIZE];
        self.storage.read(self.offset, &mut record)?;
        decode_record(&record)
    }
}
