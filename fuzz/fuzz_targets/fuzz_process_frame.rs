#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modbus_rtu_slave::{
    crc16, ModbusSlave, Region, RegisterMap, ReplyBuffer, RequestFrame, SlaveConfig, SlaveHost,
    WriteRecord,
};

#[derive(Debug, Arbitrary)]
struct Input {
    rw_start: u16,
    rw_total: u8,
    ro_start: u16,
    ro_total: u8,
    /// Append a valid CRC so the frame reaches the handlers
    seal: bool,
    frame: Vec<u8>,
}

struct Device {
    rw: Vec<u16>,
    ro: Vec<u16>,
}

impl SlaveHost for Device {
    fn send(&mut self, frame: &[u8]) {
        assert!(frame.len() <= 256);
        assert_eq!(crc16(frame), 0);
    }

    fn rw_registers(&self) -> &[u16] {
        &self.rw
    }

    fn ro_registers(&self) -> &[u16] {
        &self.ro
    }

    fn commit(&mut self, record: &WriteRecord<'_>) {
        for (offset, value) in record.iter() {
            self.rw[offset] = value;
        }
    }

    fn vendor_request(&mut self, request: &RequestFrame<'_>, reply: &mut ReplyBuffer) -> bool {
        reply.extend(request.payload()).is_ok()
    }
}

fuzz_target!(|input: Input| {
    let (Ok(rw), Ok(ro)) = (
        Region::new(input.rw_start, input.rw_total as u16),
        Region::new(input.ro_start, input.ro_total as u16),
    ) else {
        return;
    };
    let Ok(map) = RegisterMap::new(rw, ro) else {
        return;
    };
    let config = SlaveConfig::new(1, map)
        .with_extended_address(0xF8)
        .with_vendor_function(0x41);
    let Ok(mut slave) = ModbusSlave::new(config) else {
        return;
    };

    let mut device = Device {
        rw: vec![0; input.rw_total as usize],
        ro: vec![0; input.ro_total as usize],
    };

    let mut frame = input.frame;
    if input.seal {
        let crc = crc16(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
    }

    // Must never panic, only return Result
    let _ = slave.process(&frame, &mut device);
});
