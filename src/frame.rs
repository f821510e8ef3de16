//! Borrowed view over one received RTU frame
//!
//! `[addr:1][function:1][payload...][crc16:2]`, multi-byte fields big-endian.

use crate::constants::{CRC_LEN, MAX_ADU_SIZE, MIN_FRAME_LEN};
use crate::error::{ModbusError, ModbusResult};

/// One received Application Data Unit, CRC included
#[derive(Debug, Clone, Copy)]
pub struct RequestFrame<'a> {
    bytes: &'a [u8],
}

impl<'a> RequestFrame<'a> {
    /// Wrap a received frame after structural checks.
    ///
    /// Fails with [`ModbusError::InvalidInput`] when the frame cannot hold an
    /// address, a function code and a CRC, or exceeds the RTU ADU limit.
    pub fn new(bytes: &'a [u8]) -> ModbusResult<Self> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(ModbusError::invalid_input(format!(
                "Frame too short: {} bytes (min {})",
                bytes.len(),
                MIN_FRAME_LEN
            )));
        }
        if bytes.len() > MAX_ADU_SIZE {
            return Err(ModbusError::invalid_input(format!(
                "Frame too large: {} bytes (max {})",
                bytes.len(),
                MAX_ADU_SIZE
            )));
        }
        Ok(Self { bytes })
    }

    /// Whole frame, CRC included
    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// Received length, CRC included
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: construction rejects short frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Address byte
    #[inline]
    pub fn address(&self) -> u8 {
        self.bytes[0]
    }

    /// Function code byte
    #[inline]
    pub fn function_code(&self) -> u8 {
        self.bytes[1]
    }

    /// Bytes between the function code and the CRC
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[2..self.bytes.len() - CRC_LEN]
    }

    /// Big-endian u16 at `offset`, if the frame (excluding CRC) holds it
    #[inline]
    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        let body = &self.bytes[..self.bytes.len() - CRC_LEN];
        match body.get(offset..offset + 2) {
            Some(&[hi, lo]) => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }

    /// Byte at `offset`, if the frame (excluding CRC) holds it
    #[inline]
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes[..self.bytes.len() - CRC_LEN].get(offset).copied()
    }

    /// Starting register number (bytes 2-3)
    #[inline]
    pub fn start_register(&self) -> Option<u16> {
        self.u16_at(2)
    }

    /// Register count, or value for write-single (bytes 4-5)
    #[inline]
    pub fn quantity(&self) -> Option<u16> {
        self.u16_at(4)
    }

    /// Slice from `offset` up to the CRC
    #[inline]
    pub fn data_from(&self, offset: usize) -> &'a [u8] {
        let end = self.bytes.len() - CRC_LEN;
        &self.bytes[offset.min(end)..end]
    }

    /// Run `crc16` over the whole frame; a valid frame yields zero
    pub fn verify_crc(&self, crc16: impl FnOnce(&[u8]) -> u16) -> ModbusResult<()> {
        if crc16(self.bytes) != 0 {
            return Err(ModbusError::Checksum {
                len: self.bytes.len(),
            });
        }
        Ok(())
    }
}
