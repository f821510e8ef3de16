//! Host capabilities consumed by the slave
//!
//! The slave never owns register storage or the wire. Everything outside
//! frame processing goes through [`SlaveHost`]:
//!
//! | Capability | Required | Default |
//! |------------|----------|---------|
//! | `send` | yes | - |
//! | `rw_registers` / `ro_registers` | yes | - |
//! | `commit` | yes | - |
//! | `crc16` | no | CRC-16/MODBUS |
//! | `extended_registers` | no | empty |
//! | `write_check` | no | accept |
//! | `on_read` / `on_param_read` / `on_write` | no | no-op |
//! | `vendor_request` | no | reject (data exception) |

use crate::frame::RequestFrame;
use crate::reply::ReplyBuffer;

/// One pending register write, borrowed from the request frame.
///
/// Passed to [`SlaveHost::write_check`] and, once accepted, to
/// [`SlaveHost::commit`]. It does not outlive the `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord<'a> {
    data: &'a [u8],
    offset: u16,
    count: u16,
}

impl<'a> WriteRecord<'a> {
    pub(crate) fn new(data: &'a [u8], offset: u16, count: u16) -> Self {
        Self {
            data,
            offset,
            count,
        }
    }

    /// Raw big-endian register data, `2 * count` bytes
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// Offset of the first register inside the RW region
    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Number of registers
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Register values in request order
    pub fn values(&self) -> impl Iterator<Item = u16> + 'a {
        self.data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
    }

    /// `(rw_offset, value)` pairs in request order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u16)> + 'a {
        let base = self.offset as usize;
        self.values().enumerate().map(move |(i, v)| (base + i, v))
    }
}

/// Capabilities the host supplies to [`ModbusSlave::process`](crate::ModbusSlave::process).
///
/// # Example
///
/// ```rust
/// use modbus_rtu_slave::{SlaveHost, WriteRecord};
///
/// struct Device {
///     params: [u16; 4],
///     status: [u16; 2],
///     tx: Vec<u8>,
/// }
///
/// impl SlaveHost for Device {
///     fn send(&mut self, frame: &[u8]) {
///         self.tx = frame.to_vec();
///     }
///
///     fn rw_registers(&self) -> &[u16] {
///         &self.params
///     }
///
///     fn ro_registers(&self) -> &[u16] {
///         &self.status
///     }
///
///     fn write_check(&mut self, record: &WriteRecord<'_>) -> bool {
///         record.values().all(|v| v <= 1000)
///     }
///
///     fn commit(&mut self, record: &WriteRecord<'_>) {
///         for (offset, value) in record.iter() {
///             self.params[offset] = value;
///         }
///     }
/// }
/// ```
pub trait SlaveHost {
    /// Checksum used to verify requests and to seal replies.
    ///
    /// Must return 0 over a frame that carries a valid trailing CRC.
    fn crc16(&self, data: &[u8]) -> u16 {
        crate::crc::crc16(data)
    }

    /// Transmit a complete reply frame. Called at most once per request.
    fn send(&mut self, frame: &[u8]);

    /// Backing store of the read-write region, indexed by region offset
    fn rw_registers(&self) -> &[u16];

    /// Backing store of the read-only region, indexed by region offset
    fn ro_registers(&self) -> &[u16];

    /// Backing store of the extended region, if the map declares one
    fn extended_registers(&self) -> &[u16] {
        &[]
    }

    /// Validate a pending write before it is accepted.
    fn write_check(&mut self, _record: &WriteRecord<'_>) -> bool {
        true
    }

    /// Apply an accepted write. Called at most once per request, after the
    /// reply has been handed to `send`.
    fn commit(&mut self, record: &WriteRecord<'_>);

    /// A read request passed its length checks
    fn on_read(&mut self) {}

    /// A read request returned at least one RW register
    fn on_param_read(&mut self) {}

    /// A write-multiple request passed its length check
    fn on_write(&mut self) {}

    /// Handle the configured vendor function code.
    ///
    /// `reply` already holds the echoed address and function code, which the
    /// hook cannot remove. Push the payload after them, or mark an exception.
    /// Returning `false` turns the reply into an illegal-data-value exception.
    fn vendor_request(&mut self, _request: &RequestFrame<'_>, _reply: &mut ReplyBuffer) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_record_values() {
        let data = [0x00, 0x0A, 0x01, 0x02];
        let record = WriteRecord::new(&data, 3, 2);

        assert_eq!(record.count(), 2);
        assert_eq!(record.offset(), 3);
        assert_eq!(record.raw(), &data);
        assert_eq!(record.values().collect::<Vec<_>>(), vec![0x000A, 0x0102]);
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![(3, 0x000A), (4, 0x0102)]);
    }

    struct Minimal;

    impl SlaveHost for Minimal {
        fn send(&mut self, _frame: &[u8]) {}

        fn rw_registers(&self) -> &[u16] {
            &[]
        }

        fn ro_registers(&self) -> &[u16] {
            &[]
        }

        fn commit(&mut self, _record: &WriteRecord<'_>) {}
    }

    #[test]
    fn test_default_capabilities() {
        let mut host = Minimal;
        let data = [0x00, 0x01];
        let record = WriteRecord::new(&data, 0, 1);

        assert!(host.write_check(&record));
        assert!(host.extended_registers().is_empty());
        assert_eq!(host.crc16(b"123456789"), 0x4B37);

        let bytes = [0x01, 0x41, 0x00, 0x00];
        let request = RequestFrame::new(&bytes).unwrap();
        let mut reply = ReplyBuffer::new();
        assert!(!host.vendor_request(&request, &mut reply));
    }
}
