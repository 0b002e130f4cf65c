//! CRC-32 checksum for persisted calibration records
//!
//! IEEE 802.3 polynomial, reflected, bitwise. Small and table-free,
//! which is all a 12-byte record needs.

/// Reflected IEEE 802.3 polynomial
const POLY: u32 = 0xEDB8_8320;

/// Compute the CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    !crc32_update(0xFFFF_FFFF, data)
}

/// Feed `data` into a running (non-finalized) CRC
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
