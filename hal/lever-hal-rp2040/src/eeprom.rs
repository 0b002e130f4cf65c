//! Flash-backed EEPROM emulation for RP2040
//!
//! The RP2040 has no EEPROM. A small RAM mirror is loaded from the last
//! flash sector at boot; every write updates the mirror and commits the
//! whole image back to that sector (erase + program, blocking).
//!
//! A power loss between erase and program leaves the sector erased
//! (`0xFF`), which callers detect through their own record checksum.
//!
//! Implements the `EepromStorage` trait from `lever-hal`.

use embedded_storage::nor_flash::NorFlash;
use lever_hal::eeprom::check_bounds;

// Re-export shared types from lever-hal
pub use lever_hal::eeprom::{EepromError, EepromStorage};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico boards

/// Emulated EEPROM size (one flash page)
pub const EEPROM_SIZE: usize = 256;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = 4096;

/// Start of the sector holding the EEPROM image (last sector of flash)
pub const EEPROM_SECTOR_START: u32 = (FLASH_SIZE - FLASH_ERASE_SIZE) as u32;

/// Flash-backed EEPROM
///
/// Generic over any blocking NOR flash so it works with
/// `embassy_rp::flash::Flash` in blocking mode.
pub struct FlashEeprom<F: NorFlash, const N: usize = EEPROM_SIZE> {
    flash: F,
    sector_start: u32,
    mirror: [u8; N],
}

impl<F: NorFlash, const N: usize> FlashEeprom<F, N> {
    /// Load the EEPROM image from the sector at `sector_start`
    pub fn new(mut flash: F, sector_start: u32) -> Result<Self, EepromError> {
        let mut mirror = [0xFFu8; N];
        flash
            .read(sector_start, &mut mirror)
            .map_err(|_| EepromError::Flash)?;

        Ok(Self {
            flash,
            sector_start,
            mirror,
        })
    }

    /// Erase the sector and program the current mirror
    fn commit(&mut self) -> Result<(), EepromError> {
        let sector_end = self.sector_start + F::ERASE_SIZE as u32;

        self.flash
            .erase(self.sector_start, sector_end)
            .map_err(|_| EepromError::Flash)?;

        self.flash
            .write(self.sector_start, &self.mirror)
            .map_err(|_| EepromError::Flash)
    }
}

impl<F: NorFlash, const N: usize> EepromStorage for FlashEeprom<F, N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(N, offset, buffer.len())?;
        buffer.copy_from_slice(&self.mirror[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(N, offset, data.len())?;

        let target = &mut self.mirror[offset..offset + data.len()];
        if target == data {
            // Nothing changed, spare the sector an erase cycle
            return Ok(());
        }
        target.copy_from_slice(data);

        self.commit()
    }
}
