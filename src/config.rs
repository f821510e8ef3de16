//! # Slave Configuration
//!
//! Static description of one slave device: its address, an optional
//! secondary "extended" address it also answers, its register map and an
//! optional vendor function code handed to the host.
//!
//! ## Example
//!
//! ```rust
//! use modbus_rtu_slave::{Region, RegisterMap, SlaveConfig, DEFAULT_EXTENDED_ADDRESS};
//!
//! let map = RegisterMap::new(Region::new(0, 16).unwrap(), Region::new(16, 32).unwrap()).unwrap();
//! let config = SlaveConfig::new(7, map)
//!     .with_extended_address(DEFAULT_EXTENDED_ADDRESS)
//!     .with_vendor_function(0x41);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.extended_address, Some(0xF8));
//! ```

use crate::constants::{
    BROADCAST_ADDRESS, EXCEPTION_FLAG, FC_READ_HOLDING_REGISTERS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_REGISTER, MAX_SLAVE_ADDRESS,
};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::SlaveId;
use crate::register_map::RegisterMap;

/// Configuration of one slave device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaveConfig {
    /// Own slave address (1-247).
    pub slave_id: SlaveId,
    /// Secondary address answered like the own address.
    pub extended_address: Option<u8>,
    /// Function code delegated to [`SlaveHost::vendor_request`](crate::SlaveHost::vendor_request).
    pub vendor_function: Option<u8>,
    /// Register address space.
    pub map: RegisterMap,
}

impl SlaveConfig {
    /// Create a configuration with no extended address and no vendor code.
    pub fn new(slave_id: SlaveId, map: RegisterMap) -> Self {
        Self {
            slave_id,
            extended_address: None,
            vendor_function: None,
            map,
        }
    }

    /// Set the extended address.
    pub fn with_extended_address(mut self, address: u8) -> Self {
        self.extended_address = Some(address);
        self
    }

    /// Set the vendor function code.
    pub fn with_vendor_function(mut self, code: u8) -> Self {
        self.vendor_function = Some(code);
        self
    }

    /// Check addresses and the vendor code for conflicts.
    pub fn validate(&self) -> ModbusResult<()> {
        if self.slave_id == BROADCAST_ADDRESS || self.slave_id > MAX_SLAVE_ADDRESS {
            return Err(ModbusError::configuration(format!(
                "Invalid slave ID: {} (must be 1-{})",
                self.slave_id, MAX_SLAVE_ADDRESS
            )));
        }

        if let Some(ext) = self.extended_address {
            if ext == BROADCAST_ADDRESS || ext == self.slave_id {
                return Err(ModbusError::configuration(format!(
                    "Extended address {} collides with broadcast or slave ID",
                    ext
                )));
            }
        }

        if let Some(code) = self.vendor_function {
            let standard = matches!(
                code,
                FC_READ_HOLDING_REGISTERS | FC_WRITE_SINGLE_REGISTER | FC_WRITE_MULTIPLE_REGISTERS
            );
            if code == 0 || code & EXCEPTION_FLAG != 0 || standard {
                return Err(ModbusError::configuration(format!(
                    "Invalid vendor function code: 0x{:02X}",
                    code
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register_map::Region;

    fn map() -> RegisterMap {
        RegisterMap::new(Region::new(0, 1).unwrap(), Region::new(1, 1).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = SlaveConfig::new(1, map());
        assert_eq!(config.extended_address, None);
        assert_eq!(config.vendor_function, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SlaveConfig::new(3, map())
            .with_extended_address(0xF8)
            .with_vendor_function(0x41);

        assert_eq!(config.slave_id, 3);
        assert_eq!(config.extended_address, Some(0xF8));
        assert_eq!(config.vendor_function, Some(0x41));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_slave_id() {
        assert!(SlaveConfig::new(0, map()).validate().is_err());
        assert!(SlaveConfig::new(248, map()).validate().is_err());
        assert!(SlaveConfig::new(247, map()).validate().is_ok());
    }

    #[test]
    fn test_extended_address_collisions() {
        assert!(SlaveConfig::new(5, map())
            .with_extended_address(0)
            .validate()
            .is_err());
        assert!(SlaveConfig::new(5, map())
            .with_extended_address(5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_vendor_code_collisions() {
        for code in [0x00, 0x03, 0x06, 0x10, 0x83] {
            assert!(
                SlaveConfig::new(1, map())
                    .with_vendor_function(code)
                    .validate()
                    .is_err(),
                "code 0x{:02X} should be rejected",
                code
            );
        }
    }
}
