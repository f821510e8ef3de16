//! Modbus protocol definitions
//!
//! Function codes served by the slave, exception codes, and classification
//! of the address byte of a received frame.

use std::fmt;

use crate::constants::{
    BROADCAST_ADDRESS, FC_READ_HOLDING_REGISTERS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_REGISTER,
};

/// Modbus slave/unit identifier (1-247)
pub type SlaveId = u8;

/// Function codes understood by the slave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModbusFunction {
    /// Read Holding Registers (0x03)
    ReadHoldingRegisters,
    /// Write Single Register (0x06)
    WriteSingleRegister,
    /// Write Multiple Registers (0x10)
    WriteMultipleRegisters,
    /// Host-defined vendor function code
    Vendor(u8),
}

impl ModbusFunction {
    /// Classify a function code byte.
    ///
    /// `vendor` is the host's configured vendor code, if any. Returns `None`
    /// for every code the slave does not serve.
    pub fn from_u8(value: u8, vendor: Option<u8>) -> Option<Self> {
        match value {
            FC_READ_HOLDING_REGISTERS => Some(ModbusFunction::ReadHoldingRegisters),
            FC_WRITE_SINGLE_REGISTER => Some(ModbusFunction::WriteSingleRegister),
            FC_WRITE_MULTIPLE_REGISTERS => Some(ModbusFunction::WriteMultipleRegisters),
            code if vendor == Some(code) => Some(ModbusFunction::Vendor(code)),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        match self {
            ModbusFunction::ReadHoldingRegisters => FC_READ_HOLDING_REGISTERS,
            ModbusFunction::WriteSingleRegister => FC_WRITE_SINGLE_REGISTER,
            ModbusFunction::WriteMultipleRegisters => FC_WRITE_MULTIPLE_REGISTERS,
            ModbusFunction::Vendor(code) => code,
        }
    }

    /// Human-readable description of any function code byte
    pub fn description(fc: u8) -> &'static str {
        match fc & 0x7F {
            0x01 => "Read Coils",
            0x02 => "Read Discrete Inputs",
            0x03 => "Read Holding Registers",
            0x04 => "Read Input Registers",
            0x05 => "Write Single Coil",
            0x06 => "Write Single Register",
            0x0F => "Write Multiple Coils",
            0x10 => "Write Multiple Registers",
            0x17 => "Read/Write Multiple Registers",
            _ => "Unknown Function",
        }
    }
}

impl fmt::Display for ModbusFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModbusFunction::Vendor(code) => write!(f, "Vendor Function (0x{:02X})", code),
            other => {
                let code = other.to_u8();
                write!(f, "{} (0x{:02X})", Self::description(code), code)
            }
        }
    }
}

/// Modbus exception codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ModbusException {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    /// Reserved for host use, never raised by the slave itself
    ServerDeviceFailure = 0x04,
    /// Reserved for host use, never raised by the slave itself
    ServerDeviceBusy = 0x06,
}

impl ModbusException {
    /// Convert from u8 to ModbusException
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ModbusException::IllegalFunction),
            0x02 => Some(ModbusException::IllegalDataAddress),
            0x03 => Some(ModbusException::IllegalDataValue),
            0x04 => Some(ModbusException::ServerDeviceFailure),
            0x06 => Some(ModbusException::ServerDeviceBusy),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ModbusException::IllegalFunction => "Function code not allowed by the server",
            ModbusException::IllegalDataAddress => "Data address not allowed by the server",
            ModbusException::IllegalDataValue => "Value in the query data field not allowed",
            ModbusException::ServerDeviceFailure => "Unrecoverable device error",
            ModbusException::ServerDeviceBusy => "Server busy with a long-duration command",
        }
    }
}

impl fmt::Display for ModbusException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modbus Exception 0x{:02X}: {}", self.to_u8(), self.description())
    }
}

/// How a received frame is addressed relative to this device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// The device's own slave id
    Unicast,
    /// The device's secondary extended address, answered individually
    Extended,
    /// Address 0: processed but never answered
    Broadcast,
}

impl Addressing {
    /// Classify `address` for a device with `slave_id` and an optional
    /// extended address. Returns `None` when the frame is for someone else.
    pub fn classify(address: u8, slave_id: SlaveId, extended: Option<u8>) -> Option<Self> {
        if address == BROADCAST_ADDRESS {
            Some(Addressing::Broadcast)
        } else if address == slave_id {
            Some(Addressing::Unicast)
        } else if extended == Some(address) {
            Some(Addressing::Extended)
        } else {
            None
        }
    }

    /// Whether a reply goes back on the wire
    pub fn expects_reply(self) -> bool {
        !matches!(self, Addressing::Broadcast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_conversion() {
        assert_eq!(
            ModbusFunction::from_u8(0x03, None),
            Some(ModbusFunction::ReadHoldingRegisters)
        );
        assert_eq!(ModbusFunction::ReadHoldingRegisters.to_u8(), 0x03);
        assert_eq!(
            ModbusFunction::from_u8(0x10, None),
            Some(ModbusFunction::WriteMultipleRegisters)
        );
        assert_eq!(ModbusFunction::from_u8(0x04, None), None);
        assert_eq!(ModbusFunction::from_u8(0x41, None), None);
    }

    #[test]
    fn test_vendor_function() {
        assert_eq!(
            ModbusFunction::from_u8(0x41, Some(0x41)),
            Some(ModbusFunction::Vendor(0x41))
        );
        assert_eq!(ModbusFunction::Vendor(0x41).to_u8(), 0x41);
        assert_eq!(
            ModbusFunction::Vendor(0x41).to_string(),
            "Vendor Function (0x41)"
        );
    }

    #[test]
    fn test_exception_conversion() {
        assert_eq!(
            ModbusException::from_u8(0x02),
            Some(ModbusException::IllegalDataAddress)
        );
        assert_eq!(ModbusException::IllegalDataValue.to_u8(), 0x03);
        assert_eq!(ModbusException::ServerDeviceBusy.to_u8(), 0x06);
        assert_eq!(ModbusException::from_u8(0x05), None);
    }

    #[test]
    fn test_addressing() {
        assert_eq!(Addressing::classify(0, 5, None), Some(Addressing::Broadcast));
        assert_eq!(Addressing::classify(5, 5, None), Some(Addressing::Unicast));
        assert_eq!(
            Addressing::classify(0xF8, 5, Some(0xF8)),
            Some(Addressing::Extended)
        );
        assert_eq!(Addressing::classify(0xF8, 5, None), None);
        assert_eq!(Addressing::classify(6, 5, Some(0xF8)), None);

        assert!(!Addressing::Broadcast.expects_reply());
        assert!(Addressing::Extended.expects_reply());
    }
}
