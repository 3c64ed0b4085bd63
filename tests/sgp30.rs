use sgp30_i2c::crc;
use sgp30_i2c::{Baseline, FeatureSet, Sgp30, Sgp30Error, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug)]
enum Event {
    Write(Vec<u8>, Instant),
    Read(usize, Instant),
}

#[derive(Default)]
struct Bus {
    events: Vec<Event>,
    responses: VecDeque<Vec<u8>>,
    short_write: bool,
    fail_read: bool,
    closed: bool,
}

/// Scripted bus: each read pops the next queued response and copies as
/// much of it as fits, so a shorter response simulates a short read.
struct MockBus(Rc<RefCell<Bus>>);

impl Transport for MockBus {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut bus = self.0.borrow_mut();
        bus.events.push(Event::Write(bytes.to_vec(), Instant::now()));
        if bus.short_write {
            Ok(bytes.len() - 1)
        } else {
            Ok(bytes.len())
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut bus = self.0.borrow_mut();
        bus.events.push(Event::Read(buf.len(), Instant::now()));
        if bus.fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "nack"));
        }
        let response = bus.responses.pop_front().unwrap_or_default();
        let n = buf.len().min(response.len());
        buf[..n].copy_from_slice(&response[..n]);
        Ok(n)
    }
}

impl Drop for MockBus {
    fn drop(&mut self) {
        self.0.borrow_mut().closed = true;
    }
}

fn word(value: u16) -> Vec<u8> {
    let [msb, lsb] = value.to_be_bytes();
    vec![msb, lsb, crc::generate(&[msb, lsb])]
}

fn words(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| word(*v)).collect()
}

fn sensor(responses: Vec<Vec<u8>>) -> (Sgp30<MockBus>, Rc<RefCell<Bus>>) {
    let bus = Rc::new(RefCell::new(Bus {
        responses: responses.into(),
        ..Default::default()
    }));
    (Sgp30::with_transport(MockBus(bus.clone())), bus)
}

fn writes(bus: &Rc<RefCell<Bus>>) -> Vec<Vec<u8>> {
    bus.borrow()
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Write(bytes, _) => Some(bytes.clone()),
            Event::Read(..) => None,
        })
        .collect()
}

fn read_delay(bus: &Rc<RefCell<Bus>>) -> Duration {
    match bus.borrow().events.as_slice() {
        [Event::Write(_, written), Event::Read(_, read)] => read.duration_since(*written),
        other => panic!("expected one write then one read, got {:?}", other),
    }
}

#[test]
fn measure_air_quality_decodes_words() {
    let (mut sgp, bus) = sensor(vec![vec![
        0x01,
        0x02,
        crc::generate(&[0x01, 0x02]),
        0x03,
        0x04,
        crc::generate(&[0x03, 0x04]),
    ]]);
    let m = sgp.measure_air_quality().unwrap();
    assert_eq!(m.co2eq_ppm, 0x0102);
    assert_eq!(m.tvoc_ppb, 0x0304);
    assert_eq!(writes(&bus), vec![vec![0x20, 0x08]]);
    assert!(read_delay(&bus) >= Duration::from_millis(12));
}

#[test]
fn measure_raw_signals_waits_before_reading() {
    let (mut sgp, bus) = sensor(vec![words(&[13_119, 17_658])]);
    let raw = sgp.measure_raw_signals().unwrap();
    assert_eq!((raw.h2, raw.ethanol), (13_119, 17_658));
    assert_eq!(writes(&bus), vec![vec![0x20, 0x50]]);
    assert!(read_delay(&bus) >= Duration::from_millis(25));
}

#[test]
fn init_is_write_only() {
    let (mut sgp, bus) = sensor(vec![]);
    sgp.init().unwrap();
    assert_eq!(writes(&bus), vec![vec![0x20, 0x03]]);
    assert_eq!(bus.borrow().events.len(), 1);
}

/// Time between consecutive writes
fn write_gaps(bus: &Rc<RefCell<Bus>>) -> Vec<Duration> {
    let times: Vec<Instant> = bus
        .borrow()
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Write(_, at) => Some(*at),
            Event::Read(..) => None,
        })
        .collect();
    times.windows(2).map(|w| w[1].duration_since(w[0])).collect()
}

#[test]
fn write_only_commands_wait_before_next_command() {
    let (mut sgp, bus) = sensor(vec![]);
    sgp.init().unwrap();
    sgp.set_baseline(&Baseline {
        co2eq: 37_769,
        tvoc: 36_320,
    })
    .unwrap();
    sgp.set_humidity(11.5).unwrap();
    sgp.init().unwrap();
    let gaps = write_gaps(&bus);
    assert_eq!(gaps.len(), 3);
    for gap in gaps {
        assert!(gap >= Duration::from_millis(10), "gap {:?}", gap);
    }
}

#[test]
fn get_baseline_decodes_pair() {
    let (mut sgp, bus) = sensor(vec![words(&[37_769, 36_320])]);
    let baseline = sgp.get_baseline().unwrap();
    assert_eq!(
        baseline,
        Baseline {
            co2eq: 37_769,
            tvoc: 36_320
        }
    );
    assert!(read_delay(&bus) >= Duration::from_millis(10));
}

#[test]
fn get_baseline_checksum_mismatch_fails() {
    let mut response = words(&[37_769, 36_320]);
    response[5] ^= 0x01;
    let (mut sgp, _bus) = sensor(vec![response]);
    match sgp.get_baseline() {
        Err(Sgp30Error::Checksum { word: 1, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn set_baseline_sends_tvoc_first() {
    let (mut sgp, bus) = sensor(vec![]);
    sgp.set_baseline(&Baseline {
        co2eq: 0xBEEF,
        tvoc: 0x0000,
    })
    .unwrap();
    assert_eq!(
        writes(&bus),
        vec![vec![0x20, 0x1E, 0x00, 0x00, 0x81, 0xBE, 0xEF, 0x92]]
    );
    assert_eq!(bus.borrow().events.len(), 1);
}

#[test]
fn set_humidity_sends_packed_word() {
    let (mut sgp, bus) = sensor(vec![]);
    sgp.set_humidity(25.5).unwrap();
    let crc = crc::generate(&[0x19, 0x80]);
    assert_eq!(writes(&bus), vec![vec![0x20, 0x61, 0x19, 0x80, crc]]);
}

#[test]
fn set_humidity_out_of_range_sends_nothing() {
    let (mut sgp, bus) = sensor(vec![]);
    assert!(matches!(
        sgp.set_humidity(-1.0),
        Err(Sgp30Error::Invalid(_))
    ));
    assert!(bus.borrow().events.is_empty());
}

#[test]
fn self_test_pass_pattern() {
    let (mut sgp, bus) = sensor(vec![vec![0xD4, 0x00, crc::generate(&[0xD4, 0x00])]]);
    assert!(sgp.measure_test().unwrap());
    assert_eq!(writes(&bus), vec![vec![0x20, 0x32]]);
    assert!(read_delay(&bus) >= Duration::from_millis(220));
}

#[test]
fn self_test_other_pattern_is_functional_failure() {
    let (mut sgp, _bus) = sensor(vec![word(0x0000), word(0x0000)]);
    assert!(!sgp.measure_test().unwrap());
    match sgp.self_test() {
        Err(Sgp30Error::Functional(0x0000)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn feature_set_version() {
    let (mut sgp, bus) = sensor(vec![word(0x0022)]);
    let version = sgp.get_feature_set_version().unwrap();
    assert_eq!(version, 0x0022);
    assert_eq!(FeatureSet(version).product_type(), 0);
    assert_eq!(writes(&bus), vec![vec![0x20, 0x2F]]);
    assert!(read_delay(&bus) >= Duration::from_millis(3));
}

#[test]
fn serial_id_concatenates_words() {
    let (mut sgp, bus) = sensor(vec![words(&[0x0000, 0x0148, 0xD0A3])]);
    assert_eq!(sgp.get_serial_id().unwrap(), 0x0000_0148_D0A3);
    assert_eq!(writes(&bus), vec![vec![0x36, 0x82]]);
    let state = bus.borrow();
    match state.events.as_slice() {
        [Event::Write(..), Event::Read(9, _)] => {}
        other => panic!("unexpected {:?}", other),
    };
}

#[test]
fn short_write_is_transport_error() {
    let (mut sgp, bus) = sensor(vec![words(&[1, 2])]);
    bus.borrow_mut().short_write = true;
    match sgp.measure_air_quality() {
        Err(Sgp30Error::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::WriteZero),
        other => panic!("unexpected {:?}", other),
    }
    // Nothing is read after a failed write
    assert_eq!(bus.borrow().events.len(), 1);
}

#[test]
fn short_read_is_transport_error() {
    let (mut sgp, _bus) = sensor(vec![word(1)]);
    match sgp.measure_air_quality() {
        Err(Sgp30Error::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn failed_read_is_transport_error() {
    let (mut sgp, bus) = sensor(vec![]);
    bus.borrow_mut().fail_read = true;
    assert!(matches!(
        sgp.get_serial_id(),
        Err(Sgp30Error::Transport(_))
    ));
}

#[test]
fn deinit_releases_bus_and_guards_operations() {
    let (mut sgp, bus) = sensor(vec![words(&[400, 0])]);
    assert!(sgp.is_open());
    sgp.deinit();
    assert!(!sgp.is_open());
    assert!(bus.borrow().closed);
    assert!(matches!(
        sgp.measure_air_quality(),
        Err(Sgp30Error::Invalid(_))
    ));
    sgp.deinit();
    assert!(bus.borrow().events.is_empty());
}

#[test]
fn drop_releases_bus() {
    let (sgp, bus) = sensor(vec![]);
    drop(sgp);
    assert!(bus.borrow().closed);
}
