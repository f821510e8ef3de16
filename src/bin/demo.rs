//! Modbus RTU Slave Demo
//!
//! Plays a scripted master against an in-memory device and prints every
//! request, reply and commit:
//! - Reads across the read-write / read-only boundary
//! - Single and multiple register writes, including a rejected value
//! - Exceptions, broadcast and dropped frames
//!
//! Usage: cargo run --bin demo

use modbus_rtu_slave::{
    crc16, ModbusResult, ModbusSlave, ProcessStatus, Region, RegisterMap, SlaveConfig, SlaveHost,
    WriteRecord, DEFAULT_EXTENDED_ADDRESS,
};

/// Setpoint limit enforced by `write_check`
const MAX_SETPOINT: u16 = 1000;

struct Device {
    params: [u16; 8],
    status: [u16; 4],
    last_tx: Vec<u8>,
    saves: usize,
}

impl SlaveHost for Device {
    fn send(&mut self, frame: &[u8]) {
        self.last_tx = frame.to_vec();
    }

    fn rw_registers(&self) -> &[u16] {
        &self.params
    }

    fn ro_registers(&self) -> &[u16] {
        &self.status
    }

    fn write_check(&mut self, record: &WriteRecord<'_>) -> bool {
        record.values().all(|v| v <= MAX_SETPOINT)
    }

    fn commit(&mut self, record: &WriteRecord<'_>) {
        for (offset, value) in record.iter() {
            self.params[offset] = value;
        }
        self.saves += 1;
        println!(
            "    💾 committed {} register(s) at offset {}",
            record.count(),
            record.offset()
        );
    }

    fn on_param_read(&mut self) {
        println!("    🔔 parameter read");
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn sealed(body: &[u8]) -> Vec<u8> {
    let mut frame = body.to_vec();
    frame.extend_from_slice(&crc16(body).to_le_bytes());
    frame
}

fn exchange(slave: &mut ModbusSlave, device: &mut Device, label: &str, frame: &[u8]) {
    println!("  ▶ {}", label);
    println!("    TX: {}", hex(frame));
    device.last_tx.clear();

    let result = slave.process(frame, device);
    match &result {
        Ok(outcome) if outcome.replied => {
            println!("    RX: {}", hex(&device.last_tx));
            if let Some(exception) = outcome.exception {
                println!("    ⚠️  exception: {}", exception);
            }
        }
        Ok(_) => println!("    RX: (silent)"),
        Err(e) => println!("    ❌ dropped: {}", e),
    }
    println!("    status code: {}", ProcessStatus::from(&result).to_u8());
}

fn main() -> ModbusResult<()> {
    println!("🚀 Modbus RTU Slave v{} Demo", modbus_rtu_slave::VERSION);
    println!("==============================\n");

    let map = RegisterMap::new(Region::new(0, 8)?, Region::new(8, 4)?)?;
    let config = SlaveConfig::new(0x11, map).with_extended_address(DEFAULT_EXTENDED_ADDRESS);
    let mut slave = ModbusSlave::new(config)?;

    println!("📦 Register map");
    println!("---------------");
    println!("  RW: {}", map.rw());
    println!("  RO: {}", map.ro());
    println!("  Layout: {:?}\n", map.layout());

    let mut device = Device {
        params: [100, 200, 300, 400, 0, 0, 0, 0],
        status: [0x0001, 0x00FA, 0x1234, 0xBEEF],
        last_tx: Vec::new(),
        saves: 0,
    };

    // =========================================================================
    // Part 1: Reads
    // =========================================================================
    println!("📖 Part 1: Read Holding Registers");
    println!("---------------------------------");
    exchange(
        &mut slave,
        &mut device,
        "FC03 params 0-3",
        &sealed(&[0x11, 0x03, 0x00, 0x00, 0x00, 0x04]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC03 across RW/RO boundary",
        &sealed(&[0x11, 0x03, 0x00, 0x06, 0x00, 0x04]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC03 via extended address",
        &sealed(&[0xF8, 0x03, 0x00, 0x08, 0x00, 0x02]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC03 past the end",
        &sealed(&[0x11, 0x03, 0x00, 0x0B, 0x00, 0x02]),
    );

    // =========================================================================
    // Part 2: Writes
    // =========================================================================
    println!("\n✏️  Part 2: Writes");
    println!("-----------------");
    exchange(
        &mut slave,
        &mut device,
        "FC06 param 4 = 500",
        &sealed(&[0x11, 0x06, 0x00, 0x04, 0x01, 0xF4]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC06 param 4 = 5000 (over limit)",
        &sealed(&[0x11, 0x06, 0x00, 0x04, 0x13, 0x88]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC16 params 5-6 = 10, 20",
        &sealed(&[0x11, 0x10, 0x00, 0x05, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x00, 0x14]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC06 to read-only register",
        &sealed(&[0x11, 0x06, 0x00, 0x08, 0x00, 0x01]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC06 broadcast param 7 = 7",
        &sealed(&[0x00, 0x06, 0x00, 0x07, 0x00, 0x07]),
    );

    // =========================================================================
    // Part 3: Dropped frames
    // =========================================================================
    println!("\n🚫 Part 3: Dropped frames");
    println!("-------------------------");
    let mut corrupted = sealed(&[0x11, 0x03, 0x00, 0x00, 0x00, 0x01]);
    corrupted[3] ^= 0x40;
    exchange(&mut slave, &mut device, "Corrupted CRC", &corrupted);
    exchange(
        &mut slave,
        &mut device,
        "Other slave",
        &sealed(&[0x22, 0x03, 0x00, 0x00, 0x00, 0x01]),
    );
    exchange(
        &mut slave,
        &mut device,
        "Unsupported FC01",
        &sealed(&[0x11, 0x01, 0x00, 0x00, 0x00, 0x08]),
    );
    exchange(
        &mut slave,
        &mut device,
        "FC16 byte count mismatch",
        &sealed(&[0x11, 0x10, 0x00, 0x00, 0x00, 0x02, 0x02, 0x00, 0x01]),
    );

    println!("\n✅ Final params: {:?}", device.params);
    println!("   Saves: {}", device.saves);
    Ok(())
}
