//! CRC-16/MODBUS
//!
//! Default checksum used by [`SlaveHost::crc16`](crate::SlaveHost::crc16).
//! Running it over a frame that already carries its trailing CRC
//! (little-endian) yields zero.

use crc::{Crc, CRC_16_MODBUS};

/// CRC calculator for RTU
const CRC_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute CRC-16/MODBUS over `data`
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    CRC_MODBUS.checksum(data)
}
