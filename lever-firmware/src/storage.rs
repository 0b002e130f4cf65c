//! Calibration storage for the board
//!
//! Normally the flash-backed EEPROM. If the flash sector cannot be read
//! at boot the firmware keeps running on a RAM image and reports
//! `MemoryError`; calibrations then last until power-off.

use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use lever_hal::{EepromError, EepromStorage, RamEeprom};
use lever_hal_rp2040::eeprom::{FlashEeprom, EEPROM_SIZE, FLASH_SIZE};

/// Blocking flash driver for the on-board QSPI flash
pub type BoardFlash = Flash<'static, FLASH, Blocking, FLASH_SIZE>;

/// EEPROM backing the calibration store
pub enum BoardStorage {
    Flash(FlashEeprom<BoardFlash>),
    Volatile(RamEeprom<EEPROM_SIZE>),
}

impl BoardStorage {
    /// Whether writes are lost at power-off
    pub fn is_volatile(&self) -> bool {
        matches!(self, BoardStorage::Volatile(_))
    }
}

impl EepromStorage for BoardStorage {
    fn capacity(&self) -> usize {
        match self {
            BoardStorage::Flash(eeprom) => eeprom.capacity(),
            BoardStorage::Volatile(eeprom) => eeprom.capacity(),
        }
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        match self {
            BoardStorage::Flash(eeprom) => eeprom.read(offset, buffer),
            BoardStorage::Volatile(eeprom) => eeprom.read(offset, buffer),
        }
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        match self {
            BoardStorage::Flash(eeprom) => eeprom.write(offset, data),
            BoardStorage::Volatile(eeprom) => eeprom.write(offset, data),
        }
    }
}
