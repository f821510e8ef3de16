//! Modbus RTU slave constants
//!
//! Frame sizes follow the RS485 ADU limit of 256 bytes:
//! - Slave address: 1 byte
//! - PDU: up to 253 bytes
//! - CRC: 2 bytes (little-endian on the wire)

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Maximum RTU ADU size (address + PDU + CRC)
pub const MAX_ADU_SIZE: usize = 256;

/// Maximum PDU (Protocol Data Unit) size
/// RS485 ADU (256 bytes) - Slave Address (1 byte) - CRC (2 bytes) = 253 bytes
pub const MAX_PDU_SIZE: usize = 253;

/// CRC trailer length
pub const CRC_LEN: usize = 2;

/// Smallest frame that can be checked at all: address + function code + CRC
pub const MIN_FRAME_LEN: usize = 1 + 1 + CRC_LEN;

/// Read Holding Registers request length
/// Format: Address(1) + FC(1) + Start(2) + Count(2) + CRC(2) = 8 bytes
pub const READ_REQUEST_LEN: usize = 8;

/// Write Single Register request length
/// Format: Address(1) + FC(1) + Register(2) + Value(2) + CRC(2) = 8 bytes
pub const WRITE_SINGLE_REQUEST_LEN: usize = 8;

/// Bytes of a Write Multiple Registers request that are not register data
/// Format: Address(1) + FC(1) + Start(2) + Count(2) + ByteCount(1) + CRC(2) = 9 bytes
pub const WRITE_MULTIPLE_OVERHEAD: usize = 9;

/// Offset of the byte-count field in a Write Multiple Registers request
pub const WRITE_MULTIPLE_BYTE_COUNT_OFFSET: usize = 6;

/// Offset of the register data in a Write Multiple Registers request
pub const WRITE_MULTIPLE_DATA_OFFSET: usize = 7;

/// Offset of the value field in a Write Single Register request
pub const WRITE_SINGLE_DATA_OFFSET: usize = 4;

/// Exception reply length before CRC: Address(1) + FC|0x80(1) + Code(1)
pub const EXCEPTION_REPLY_LEN: usize = 3;

/// Write acknowledge length before CRC: Address(1) + FC(1) + Start(2) + Count/Value(2)
pub const WRITE_REPLY_LEN: usize = 6;

// ============================================================================
// Register Operation Limits
// ============================================================================

/// Maximum number of registers returned by one FC03 reply
///
/// Fixed by the reply buffer:
/// - Address + FC + Byte Count: 3 bytes
/// - Register Data: N × 2 bytes
/// - CRC: 2 bytes
/// - 124 keeps the reply at 253 bytes, leaving headroom in the 256-byte buffer
pub const MAX_READ_REGISTERS: u16 = 124;

// ============================================================================
// Addressing
// ============================================================================

/// Broadcast address: processed, never answered
pub const BROADCAST_ADDRESS: u8 = 0x00;

/// Conventional secondary address a device answers individually
pub const DEFAULT_EXTENDED_ADDRESS: u8 = 0xF8;

/// Highest assignable slave address
pub const MAX_SLAVE_ADDRESS: u8 = 247;

// ============================================================================
// Modbus Function Codes
// ============================================================================

/// Read Holding Registers (FC03)
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Write Single Register (FC06)
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;

/// Write Multiple Registers (FC16)
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// Bit set on the echoed function code of an exception reply
pub const EXCEPTION_FLAG: u8 = 0x80;

// ============================================================================
// Modbus Exception Codes
// ============================================================================

/// Illegal Function
pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;

/// Illegal Data Address
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

/// Illegal Data Value
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;

/// Server Device Failure (reserved for host use)
pub const EXCEPTION_SERVER_DEVICE_FAILURE: u8 = 0x04;

/// Server Device Busy (reserved for host use)
pub const EXCEPTION_SERVER_DEVICE_BUSY: u8 = 0x06;
