//! # Modbus RTU Slave - Request/Response Engine
//!
//! **License:** MIT
//!
//! The request/response engine of a Modbus RTU slave. Given one received
//! frame it decides whether the frame addresses this device, interprets the
//! function code, maps register numbers onto the device's register regions,
//! builds a correctly framed reply and triggers persistence of written
//! values.
//!
//! Everything else (the wire, register storage, persistence, device
//! specific hooks) belongs to the host and is reached through the
//! [`SlaveHost`] trait.
//!
//! ## Features
//!
//! - **No heap on the hot path**: replies are built in a fixed 256-byte buffer
//! - **Three register layouts**: RW→RO, RO→RW, or disjoint regions, plus an
//!   optional extended read-only region
//! - **Broadcast aware**: address 0 is processed but never answered; an
//!   optional extended address is answered individually
//! - **Deferred writes**: writes are validated by the host, then committed
//!   exactly once after the reply went out
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Slave |
//! |------|----------|-------|
//! | 0x03 | Read Holding Registers | ✅ |
//! | 0x06 | Write Single Register | ✅ |
//! | 0x10 | Write Multiple Registers | ✅ |
//! | host | Vendor function | via [`SlaveHost::vendor_request`] |
//!
//! ## Quick Start
//!
//! ```rust
//! use modbus_rtu_slave::{
//!     crc16, ModbusSlave, ModbusResult, Region, RegisterMap, SlaveConfig, SlaveHost, WriteRecord,
//! };
//!
//! struct Device {
//!     params: [u16; 1],
//!     status: [u16; 1],
//!     tx: Vec<u8>,
//! }
//!
//! impl SlaveHost for Device {
//!     fn send(&mut self, frame: &[u8]) {
//!         self.tx = frame.to_vec();
//!     }
//!     fn rw_registers(&self) -> &[u16] {
//!         &self.params
//!     }
//!     fn ro_registers(&self) -> &[u16] {
//!         &self.status
//!     }
//!     fn commit(&mut self, record: &WriteRecord<'_>) {
//!         for (offset, value) in record.iter() {
//!             self.params[offset] = value;
//!         }
//!     }
//! }
//!
//! fn main() -> ModbusResult<()> {
//!     let map = RegisterMap::new(Region::new(0, 1)?, Region::new(1, 1)?)?;
//!     let mut slave = ModbusSlave::new(SlaveConfig::new(1, map))?;
//!     let mut device = Device { params: [0x0102], status: [0x0304], tx: Vec::new() };
//!
//!     // Read 2 registers starting at 0
//!     let mut request = vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02];
//!     request.extend_from_slice(&crc16(&request).to_le_bytes());
//!
//!     slave.process(&request, &mut device)?;
//!     assert_eq!(&device.tx[..7], &[0x01, 0x03, 0x04, 0x01, 0x02, 0x03, 0x04]);
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Modbus protocol constants
pub mod constants;

/// Function codes, exception codes and addressing
pub mod protocol;

/// CRC-16/MODBUS
pub mod crc;

/// Borrowed view over a received frame
pub mod frame;

/// Stack-allocated reply buffer
pub mod reply;

// ============================================================================
// Slave modules
// ============================================================================

/// Register address space and layouts
pub mod register_map;

/// Slave device configuration
pub mod config;

/// Host capability trait
pub mod host;

/// Frame processor
pub mod slave;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Core slave API ===
pub use config::SlaveConfig;
pub use host::{SlaveHost, WriteRecord};
pub use slave::{ModbusSlave, Outcome};

// === Error handling ===
pub use error::{ModbusError, ModbusResult, ProcessStatus};

// === Core types ===
pub use frame::RequestFrame;
pub use protocol::{Addressing, ModbusException, ModbusFunction, SlaveId};
pub use register_map::{Bank, ReadSpan, Region, RegisterLayout, RegisterMap};
pub use reply::ReplyBuffer;

// === Checksum ===
pub use crc::crc16;

// === Protocol limits (commonly needed constants) ===
pub use constants::{
    BROADCAST_ADDRESS, DEFAULT_EXTENDED_ADDRESS, MAX_ADU_SIZE, MAX_READ_REGISTERS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
