//! Reply frame buffer
//!
//! Fixed-size stack array so a reply is assembled without heap allocation.
//! Two bytes at the end are always kept free for the CRC.

use tracing::debug;

use crate::constants::{CRC_LEN, EXCEPTION_FLAG, MAX_ADU_SIZE};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{ModbusException, ModbusFunction};

/// Reply under construction: `[addr][function][data...]` then `[crc lo][crc hi]`
#[derive(Debug, Clone)]
pub struct ReplyBuffer {
    /// Fixed-size buffer (stack)
    data: [u8; MAX_ADU_SIZE],
    /// Bytes written so far, CRC excluded until `append_crc`
    len: usize,
    /// CRC appended, body is frozen
    sealed: bool,
}

impl ReplyBuffer {
    /// Largest reply body (everything before the CRC)
    pub const BODY_CAPACITY: usize = MAX_ADU_SIZE - CRC_LEN;

    /// Create an empty reply
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; MAX_ADU_SIZE],
            len: 0,
            sealed: false,
        }
    }

    /// Start a reply by echoing the request's address and function code
    #[inline]
    pub(crate) fn begin(&mut self, address: u8, function_code: u8) {
        self.data[0] = address;
        self.data[1] = function_code;
        self.len = 2;
        self.sealed = false;
    }

    /// Push a single byte
    #[inline]
    pub fn push(&mut self, byte: u8) -> ModbusResult<()> {
        if self.sealed || self.len >= Self::BODY_CAPACITY {
            return Err(ModbusError::invalid_input("Reply buffer full"));
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Push u16 in big-endian
    #[inline]
    pub fn push_u16(&mut self, value: u16) -> ModbusResult<()> {
        self.extend(&value.to_be_bytes())
    }

    /// Extend with a byte slice
    #[inline]
    pub fn extend(&mut self, data: &[u8]) -> ModbusResult<()> {
        if self.sealed {
            return Err(ModbusError::invalid_input("Reply already sealed"));
        }
        if self.len + data.len() > Self::BODY_CAPACITY {
            return Err(ModbusError::invalid_input(format!(
                "Reply would exceed max size: {} + {} > {}",
                self.len,
                data.len(),
                Self::BODY_CAPACITY
            )));
        }
        self.data[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    /// Replace whatever follows the echoed header with an exception.
    ///
    /// Sets the high bit of the function code and leaves a 3-byte body.
    /// Ignored once the reply is sealed.
    pub fn set_exception(&mut self, exception: ModbusException) {
        if self.sealed {
            return;
        }
        self.data[1] |= EXCEPTION_FLAG;
        self.data[2] = exception.to_u8();
        self.len = 3;
    }

    /// Append the CRC little-endian after the body
    #[inline]
    pub(crate) fn append_crc(&mut self, crc: u16) -> ModbusResult<()> {
        if self.sealed || self.len < 2 || self.len > Self::BODY_CAPACITY {
            return Err(ModbusError::invalid_input(format!(
                "Cannot seal a {} byte reply",
                self.len
            )));
        }
        let [lo, hi] = crc.to_le_bytes();
        self.data[self.len] = lo;
        self.data[self.len + 1] = hi;
        self.len += CRC_LEN;
        self.sealed = true;
        Ok(())
    }

    /// Get immutable data slice
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Get current length
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear reply
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.sealed = false;
    }

    /// Echoed function code, exception bit included
    #[inline]
    pub fn function_code(&self) -> Option<u8> {
        if self.len > 1 {
            Some(self.data[1])
        } else {
            None
        }
    }

    /// Check if exception reply
    #[inline]
    pub fn is_exception(&self) -> bool {
        self.function_code()
            .map(|fc| fc & EXCEPTION_FLAG != 0)
            .unwrap_or(false)
    }

    /// Get exception code
    #[inline]
    pub fn exception(&self) -> Option<ModbusException> {
        if self.is_exception() && self.len > 2 {
            ModbusException::from_u8(self.data[2])
        } else {
            None
        }
    }

    pub(crate) fn log_built(&self) {
        if let Some(fc) = self.function_code() {
            let fc_desc = ModbusFunction::description(fc);
            if let Some(exc) = self.exception() {
                debug!(
                    "Reply built: FC={:02X} (Exception: {}), exception_code={:02X}",
                    fc,
                    fc_desc,
                    exc.to_u8()
                );
            } else {
                debug!("Reply built: FC={:02X} ({}), total_len={}", fc, fc_desc, self.len);
            }
        }
    }
}

impl Default for ReplyBuffer {
    fn default() -> Self {
        Self::new()
    }
}
