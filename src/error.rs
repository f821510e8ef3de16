//! Error types for frame processing
//!
//! Errors returned from [`ModbusSlave::process`](crate::ModbusSlave::process)
//! are local to the call: nothing was transmitted and nothing was committed.
//! Wire-reportable problems (bad register range, rejected write, unknown
//! function) are not errors here; they produce an exception reply instead.

use thiserror::Error;

/// Result type used throughout the crate
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Errors produced while validating a frame or building a configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModbusError {
    /// Structurally unusable frame or buffer
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// CRC over the received frame did not validate
    #[error("CRC check failed over {len} byte frame")]
    Checksum { len: usize },

    /// Frame addressed to another device
    #[error("Frame addressed to slave {address}, not this device")]
    AddressMismatch { address: u8 },

    /// Frame length disagrees with what the function code requires
    #[error("Length error: {message}")]
    Length { message: String },

    /// Invalid register map or slave configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ModbusError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ModbusError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn length(message: impl Into<String>) -> Self {
        ModbusError::Length {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ModbusError::Configuration {
            message: message.into(),
        }
    }

    /// True when the frame was simply not for this device.
    ///
    /// Address filtering is the normal outcome on a shared bus, so hosts
    /// usually skip logging it.
    pub fn is_filtered(&self) -> bool {
        matches!(self, ModbusError::AddressMismatch { .. })
    }
}

/// Numeric outcome of one `process` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProcessStatus {
    Ok = 0,
    CrcError = 1,
    AddressError = 2,
    LengthError = 3,
    InputError = 4,
}

impl ProcessStatus {
    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<&ModbusError> for ProcessStatus {
    fn from(err: &ModbusError) -> Self {
        match err {
            ModbusError::Checksum { .. } => ProcessStatus::CrcError,
            ModbusError::AddressMismatch { .. } => ProcessStatus::AddressError,
            ModbusError::Length { .. } => ProcessStatus::LengthError,
            ModbusError::InvalidInput { .. } | ModbusError::Configuration { .. } => {
                ProcessStatus::InputError
            }
        }
    }
}

impl<T> From<&ModbusResult<T>> for ProcessStatus {
    fn from(result: &ModbusResult<T>) -> Self {
        match result {
            Ok(_) => ProcessStatus::Ok,
            Err(err) => err.into(),
        }
    }
}
