//! Frame processing throughput
//!
//! Run with: cargo bench --bench throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use modbus_rtu_slave::{
    crc16, ModbusSlave, Region, RegisterMap, SlaveConfig, SlaveHost, WriteRecord,
};

struct BenchDevice {
    rw: Vec<u16>,
    ro: Vec<u16>,
    sent: usize,
}

impl SlaveHost for BenchDevice {
    fn send(&mut self, frame: &[u8]) {
        self.sent += frame.len();
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
}

fn with_crc(mut body: Vec<u8>) -> Vec<u8> {
    let crc = crc16(&body);
    body.extend_from_slice(&crc.to_le_bytes());
    body
}

fn setup() -> (ModbusSlave, BenchDevice) {
    let map = RegisterMap::new(Region::new(0, 64).unwrap(), Region::new(64, 64).unwrap()).unwrap();
    let slave = ModbusSlave::new(SlaveConfig::new(1, map)).unwrap();
    let device = BenchDevice {
        rw: (0..64).collect(),
        ro: (0..64).map(|v| v * 3).collect(),
        sent: 0,
    };
    (slave, device)
}

/// FC03 across the RW/RO boundary with various counts
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_holding_registers");
    let (mut slave, mut device) = setup();

    for count in [1u16, 16, 124].iter() {
        let start = 64 - count / 2;
        let mut body = vec![0x01, 0x03];
        body.extend_from_slice(&start.to_be_bytes());
        body.extend_from_slice(&count.to_be_bytes());
        let frame = with_crc(body);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| slave.process(black_box(&frame), &mut device).unwrap());
        });
    }

    group.finish();
}

/// FC06 and FC16 including commit
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_registers");
    let (mut slave, mut device) = setup();

    let single = with_crc(vec![0x01, 0x06, 0x00, 0x05, 0x12, 0x34]);
    group.bench_function("single", |b| {
        b.iter(|| slave.process(black_box(&single), &mut device).unwrap());
    });

    let mut body = vec![0x01, 0x10, 0x00, 0x00, 0x00, 0x20, 0x40];
    body.extend((0..32u16).flat_map(|v| v.to_be_bytes()));
    let multiple = with_crc(body);
    group.bench_function("multiple_32", |b| {
        b.iter(|| slave.process(black_box(&multiple), &mut device).unwrap());
    });

    group.finish();
}

/// Frames dropped at validation
fn bench_rejects(c: &mut Criterion) {
    let (mut slave, mut device) = setup();
    let mut bad_crc = with_crc(vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x01]);
    bad_crc[6] ^= 0xFF;
    let foreign = with_crc(vec![0x02, 0x03, 0x00, 0x00, 0x00, 0x01]);

    c.bench_function("reject_bad_crc", |b| {
        b.iter(|| slave.process(black_box(&bad_crc), &mut device).is_err());
    });
    c.bench_function("reject_foreign_address", |b| {
        b.iter(|| slave.process(black_box(&foreign), &mut device).is_err());
    });
}

criterion_group!(benches, bench_read, bench_write, bench_rejects);
criterion_main!(benches);
