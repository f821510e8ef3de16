//! Modbus RTU slave frame processor
//!
//! One call to [`ModbusSlave::process`] handles exactly one received frame:
//!
//! 1. **Validate**: structure, CRC, address match. Failures return an error
//!    and nothing is sent or committed.
//! 2. **Dispatch**: route on the function code to the read handler, one of
//!    the write handlers, the host's vendor hook, or an illegal-function
//!    exception.
//! 3. **Reply & commit**: fire notification hooks, seal the reply with a CRC
//!    and send it (never for broadcast), then commit an accepted write.
//!
//! The slave keeps no state between calls beyond its configuration and the
//! reply buffer it reuses.

use tracing::{debug, trace, warn};

use crate::config::SlaveConfig;
use crate::constants::{
    MAX_READ_REGISTERS, READ_REQUEST_LEN, WRITE_MULTIPLE_BYTE_COUNT_OFFSET,
    WRITE_MULTIPLE_DATA_OFFSET, WRITE_MULTIPLE_OVERHEAD, WRITE_SINGLE_DATA_OFFSET,
    WRITE_SINGLE_REQUEST_LEN,
};
use crate::error::{ModbusError, ModbusResult};
use crate::frame::RequestFrame;
use crate::host::{SlaveHost, WriteRecord};
use crate::protocol::{Addressing, ModbusException, ModbusFunction};
use crate::register_map::Bank;
use crate::reply::ReplyBuffer;

/// What happened to a frame that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// A reply was handed to `send`
    pub replied: bool,
    /// Exception carried by the reply, sent or not
    pub exception: Option<ModbusException>,
    /// `commit` was called
    pub committed: bool,
    /// Bytes handed to `send`, CRC included; 0 when nothing was sent
    pub reply_len: usize,
}

/// Notification hooks to fire once the handler is done
#[derive(Debug, Clone, Copy, Default)]
struct Notifications {
    read: bool,
    param_read: bool,
    write: bool,
}

/// Result of the dispatch step, interpreted by `finish`
#[derive(Debug, Default)]
struct Dispatch<'f> {
    commit: Option<WriteRecord<'f>>,
    notify: Notifications,
}

/// Request/response engine of one slave device
#[derive(Debug, Clone)]
pub struct ModbusSlave {
    config: SlaveConfig,
    reply: ReplyBuffer,
}

impl ModbusSlave {
    /// Create a slave after validating its configuration
    pub fn new(config: SlaveConfig) -> ModbusResult<Self> {
        config.validate()?;
        debug!(
            "Slave {} ready: RW={} RO={} layout={:?}",
            config.slave_id,
            config.map.rw(),
            config.map.ro(),
            config.map.layout()
        );
        Ok(Self {
            config,
            reply: ReplyBuffer::new(),
        })
    }

    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    /// Reply assembled by the last `process` call, CRC included if it was sent
    pub fn last_reply(&self) -> &[u8] {
        self.reply.as_slice()
    }

    /// Process one received frame (CRC included).
    ///
    /// # Errors
    ///
    /// - [`ModbusError::InvalidInput`] - frame too short or too long, or a
    ///   backing store smaller than its region
    /// - [`ModbusError::Checksum`] - CRC does not validate
    /// - [`ModbusError::AddressMismatch`] - frame is for another device
    /// - [`ModbusError::Length`] - frame length wrong for its function code
    ///
    /// None of these send a reply or commit a write.
    pub fn process<H>(&mut self, frame: &[u8], host: &mut H) -> ModbusResult<Outcome>
    where
        H: SlaveHost + ?Sized,
    {
        self.reply.clear();
        let frame = RequestFrame::new(frame)?;

        if let Err(err) = frame.verify_crc(|bytes| host.crc16(bytes)) {
            warn!("Dropping frame: {}", err);
            return Err(err);
        }

        let address = frame.address();
        let addressing =
            Addressing::classify(address, self.config.slave_id, self.config.extended_address)
                .ok_or_else(|| {
                    trace!("Frame for slave {} ignored", address);
                    ModbusError::AddressMismatch { address }
                })?;

        let fc = frame.function_code();
        debug!(
            "Processing frame: addr={:02X} FC={:02X} ({}), len={}",
            address,
            fc,
            ModbusFunction::description(fc),
            frame.len()
        );

        self.reply.begin(address, fc);
        let dispatch = match self.dispatch(&frame, host) {
            Ok(dispatch) => dispatch,
            Err(err) => {
                warn!("Dropping frame: {}", err);
                self.reply.clear();
                return Err(err);
            }
        };

        self.finish(addressing, dispatch, host)
    }

    fn dispatch<'f, H>(
        &mut self,
        frame: &RequestFrame<'f>,
        host: &mut H,
    ) -> ModbusResult<Dispatch<'f>>
    where
        H: SlaveHost + ?Sized,
    {
        let function = ModbusFunction::from_u8(frame.function_code(), self.config.vendor_function);
        match function {
            Some(ModbusFunction::ReadHoldingRegisters) => self.read_holding_registers(frame, host),
            Some(ModbusFunction::WriteSingleRegister) => self.write_single_register(frame, host),
            Some(ModbusFunction::WriteMultipleRegisters) => {
                self.write_multiple_registers(frame, host)
            }
            Some(ModbusFunction::Vendor(_)) => {
                if !host.vendor_request(frame, &mut self.reply) {
                    self.reply.set_exception(ModbusException::IllegalDataValue);
                }
                Ok(Dispatch::default())
            }
            None => {
                self.reply.set_exception(ModbusException::IllegalFunction);
                Ok(Dispatch::default())
            }
        }
    }

    /// FC03: `[start:2][count:2]` -> `[byte_count:1][values:2*count]`
    fn read_holding_registers<'f, H>(
        &mut self,
        frame: &RequestFrame<'f>,
        host: &mut H,
    ) -> ModbusResult<Dispatch<'f>>
    where
        H: SlaveHost + ?Sized,
    {
        if frame.len() != READ_REQUEST_LEN {
            return Err(ModbusError::length(format!(
                "Read request is {} bytes (expected {})",
                frame.len(),
                READ_REQUEST_LEN
            )));
        }
        let (start, count) = request_range(frame)?;
        if count > MAX_READ_REGISTERS {
            return Err(ModbusError::length(format!(
                "Read of {} registers exceeds {}",
                count, MAX_READ_REGISTERS
            )));
        }

        let mut notify = Notifications {
            read: true,
            ..Default::default()
        };

        match self.config.map.resolve_read(start, count) {
            Some(span) => {
                self.reply.push((count * 2) as u8)?;
                for (bank, offset) in span.iter() {
                    self.reply.push_u16(register_value(host, bank, offset)?)?;
                }
                notify.param_read = span.touches(Bank::ReadWrite);
            }
            None => {
                debug!("Read {}+{} outside register map", start, count);
                self.reply.set_exception(ModbusException::IllegalDataAddress);
            }
        }

        Ok(Dispatch {
            commit: None,
            notify,
        })
    }

    /// FC06: `[reg:2][value:2]`, reply echoes the request
    fn write_single_register<'f, H>(
        &mut self,
        frame: &RequestFrame<'f>,
        host: &mut H,
    ) -> ModbusResult<Dispatch<'f>>
    where
        H: SlaveHost + ?Sized,
    {
        if frame.len() != WRITE_SINGLE_REQUEST_LEN {
            return Err(ModbusError::length(format!(
                "Write single request is {} bytes (expected {})",
                frame.len(),
                WRITE_SINGLE_REQUEST_LEN
            )));
        }
        let (start, _) = request_range(frame)?;

        let commit = self.stage_write(frame, host, start, 1, WRITE_SINGLE_DATA_OFFSET)?;
        Ok(Dispatch {
            commit,
            notify: Notifications::default(),
        })
    }

    /// FC16: `[start:2][count:2][byte_count:1][values:2*count]` -> `[start:2][count:2]`
    fn write_multiple_registers<'f, H>(
        &mut self,
        frame: &RequestFrame<'f>,
        host: &mut H,
    ) -> ModbusResult<Dispatch<'f>>
    where
        H: SlaveHost + ?Sized,
    {
        let byte_count = frame
            .byte_at(WRITE_MULTIPLE_BYTE_COUNT_OFFSET)
            .ok_or_else(|| {
                ModbusError::length(format!(
                    "Write multiple request is {} bytes (min {})",
                    frame.len(),
                    WRITE_MULTIPLE_OVERHEAD
                ))
            })? as usize;
        let (start, count) = request_range(frame)?;

        let data_len = frame.len() - WRITE_MULTIPLE_OVERHEAD;
        if byte_count != count as usize * 2 || byte_count != data_len {
            return Err(ModbusError::length(format!(
                "Byte count {} disagrees with {} registers in a {} byte frame",
                byte_count,
                count,
                frame.len()
            )));
        }

        let commit = self.stage_write(frame, host, start, count, WRITE_MULTIPLE_DATA_OFFSET)?;
        Ok(Dispatch {
            commit,
            notify: Notifications {
                write: true,
                ..Default::default()
            },
        })
    }

    /// Resolve, validate and acknowledge a write; returns the record to commit
    fn stage_write<'f, H>(
        &mut self,
        frame: &RequestFrame<'f>,
        host: &mut H,
        start: u16,
        count: u16,
        data_offset: usize,
    ) -> ModbusResult<Option<WriteRecord<'f>>>
    where
        H: SlaveHost + ?Sized,
    {
        let Some(offset) = self.config.map.resolve_write(start, count) else {
            debug!("Write {}+{} outside RW region", start, count);
            self.reply.set_exception(ModbusException::IllegalDataAddress);
            return Ok(None);
        };

        let record = WriteRecord::new(frame.data_from(data_offset), offset, count);
        if !host.write_check(&record) {
            debug!("Write {}+{} rejected by host", start, count);
            self.reply.set_exception(ModbusException::IllegalDataValue);
            return Ok(None);
        }

        // Echo start and count (or register and value) verbatim
        self.reply.extend(&frame.payload()[..4])?;
        Ok(Some(record))
    }

    fn finish<H>(
        &mut self,
        addressing: Addressing,
        dispatch: Dispatch<'_>,
        host: &mut H,
    ) -> ModbusResult<Outcome>
    where
        H: SlaveHost + ?Sized,
    {
        let Dispatch { commit, notify } = dispatch;
        if notify.read {
            host.on_read();
        }
        if notify.param_read {
            host.on_param_read();
        }
        if notify.write {
            host.on_write();
        }

        let exception = self.reply.exception();
        self.reply.log_built();

        let mut reply_len = 0;
        if addressing.expects_reply() {
            let crc = host.crc16(self.reply.as_slice());
            if let Err(err) = self.reply.append_crc(crc) {
                warn!("Dropping reply: {}", err);
                self.reply.clear();
                return Err(err);
            }
            reply_len = self.reply.len();
            host.send(self.reply.as_slice());
        }

        let committed = match commit {
            Some(record) => {
                debug!(
                    "Committing {} register(s) at RW offset {}",
                    record.count(),
                    record.offset()
                );
                host.commit(&record);
                true
            }
            None => false,
        };

        Ok(Outcome {
            replied: reply_len > 0,
            exception,
            committed,
            reply_len,
        })
    }
}

/// Start register and quantity fields (bytes 2-5)
fn request_range(frame: &RequestFrame<'_>) -> ModbusResult<(u16, u16)> {
    match (frame.start_register(), frame.quantity()) {
        (Some(start), Some(count)) => Ok((start, count)),
        _ => Err(ModbusError::length(format!(
            "Frame of {} bytes lacks start/quantity fields",
            frame.len()
        ))),
    }
}

fn register_value<H>(host: &H, bank: Bank, offset: usize) -> ModbusResult<u16>
where
    H: SlaveHost + ?Sized,
{
    let store = match bank {
        Bank::ReadWrite => host.rw_registers(),
        Bank::ReadOnly => host.ro_registers(),
        Bank::Extended => host.extended_registers(),
    };
    store.get(offset).copied().ok_or_else(|| {
        ModbusError::invalid_input(format!(
            "{:?} store holds {} registers, offset {} requested",
            bank,
            store.len(),
            offset
        ))
    })
}
