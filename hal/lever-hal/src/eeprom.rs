//! EEPROM-class storage abstractions
//!
//! Provides a byte-addressable persistent storage trait that can be
//! implemented by chip-specific HALs, either on real EEPROM or on a
//! flash-backed emulation.

/// Errors from persistent storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Access extends past the end of the storage
    OutOfBounds,
    /// Underlying flash/EEPROM operation failed
    Flash,
}

/// Byte-addressable persistent storage
///
/// Writes are synchronous: when `write` returns `Ok`, the bytes are on the
/// medium. Implementations make no wear-leveling or journaling promises;
/// callers that need integrity store a checksum next to their data.
pub trait EepromStorage {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError>;
}

/// Check that `offset..offset + len` fits in a storage of `capacity` bytes
pub fn check_bounds(capacity: usize, offset: usize, len: usize) -> Result<(), EepromError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(EepromError::OutOfBounds),
    }
}

/// RAM-backed storage
///
/// Volatile implementation used for host-side testing and simulation.
/// Starts erased (all bytes `0xFF`), like a fresh EEPROM.
#[derive(Debug, Clone)]
pub struct RamEeprom<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> Default for RamEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamEeprom<N> {
    /// Create an erased storage
    pub const fn new() -> Self {
        Self { data: [0xFF; N] }
    }

    /// Raw contents, for inspection
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw mutable contents, for injecting corruption
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> EepromStorage for RamEeprom<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(N, offset, buffer.len())?;
        buffer.copy_from_slice(&self.data[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(N, offset, data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}
