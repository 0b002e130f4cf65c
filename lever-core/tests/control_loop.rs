//! End-to-end scenarios over the core types, driven the way the firmware
//! controller drives them on every tick.

use lever_core::calibration::{CalibrationCapture, CalibrationError, RECORD_SIZE};
use lever_core::error::{ErrorKind, ErrorMonitor, BUTTON_RECOVERY_MS};
use lever_core::sensor::SampleWindow;
use lever_core::{CalibrationRange, CalibrationStore};
use lever_hal::RamEeprom;

const TICK_MS: u32 = 50;

#[test]
fn calibrate_then_reload_from_storage() {
    let mut store = CalibrationStore::new(RamEeprom::<64>::new(), 0);
    assert_eq!(store.load_calibration(), Err(CalibrationError::NotFound));
    assert_eq!(store.range(), CalibrationRange::DEFAULT);

    let mut capture = CalibrationCapture::new();
    capture.begin();
    for raw in [400, 250, 900, 610, 780] {
        capture.observe(raw);
    }
    let (min, max) = capture.finish().unwrap();
    store.save_calibration(min, max, true).unwrap();
    assert_eq!(store.map_to_0_100(250), 0);
    assert_eq!(store.map_to_0_100(575), 50);
    assert_eq!(store.map_to_0_100(900), 100);

    // Power cycle: a fresh store over the same medium
    let storage = store.into_inner();
    let mut store = CalibrationStore::new(storage, 0);
    let loaded = store.load_calibration().unwrap();
    assert_eq!(loaded, CalibrationRange::new(250, 900, true));
}

#[test]
fn corrupted_record_falls_back_and_is_reported() {
    let mut store = CalibrationStore::new(RamEeprom::<64>::new(), 8);
    store.save_calibration(100, 800, true).unwrap();
    store.storage_mut().as_bytes_mut()[8 + RECORD_SIZE - 1] ^= 0x01;

    let mut monitor = ErrorMonitor::new();
    match store.load_calibration() {
        Err(CalibrationError::CrcMismatch) => {
            monitor.set_error(ErrorKind::CalibrationError, 0)
        }
        other => panic!("unexpected load result: {:?}", other),
    }

    assert!(store.range().is_consistent());
    assert!(!store.is_calibrated());
    assert!(monitor.handle_error(10));
    assert_eq!(monitor.error_count(ErrorKind::CalibrationError), 1);
}

#[test]
fn stuck_sensor_raises_and_clears() {
    let mut window = SampleWindow::<20>::new();
    let mut monitor = ErrorMonitor::new();
    let mut now = 0;

    for _ in 0..20 {
        now += TICK_MS;
        // A partial window is not enough evidence
        assert!(!monitor.check_sensor_error(512, window.as_slice(), 20, now));
        window.push(512);
    }
    assert!(!monitor.has_error());
    assert!(window.is_full());
    now += TICK_MS;
    assert!(monitor.check_sensor_error(512, window.as_slice(), 20, now));
    assert_eq!(monitor.current_error(), ErrorKind::SensorError);

    assert!(monitor.handle_error(now + TICK_MS));
    assert!(!monitor.has_error());

    window.push(513);
    assert!(!monitor.check_sensor_error(512, window.as_slice(), 20, now + 2 * TICK_MS));
}

#[test]
fn button_recovers_after_release() {
    let mut monitor = ErrorMonitor::new();
    let threshold = 10_000;

    assert!(!monitor.check_button_stuck(true, threshold, 0));
    let mut now = 0;
    while !monitor.check_button_stuck(true, threshold, now) {
        now += TICK_MS;
        assert!(now <= threshold + TICK_MS);
    }
    assert_eq!(monitor.current_error(), ErrorKind::ButtonError);
    assert!(!monitor.handle_error(now));

    // Released: the error stands until the recovery delay has passed
    let released = now + TICK_MS;
    assert!(!monitor.check_button_stuck(false, threshold, released));
    assert!(!monitor.check_button_stuck(false, threshold, released + TICK_MS));
    assert!(!monitor.handle_error(now + BUTTON_RECOVERY_MS));
    assert!(monitor.handle_error(now + BUTTON_RECOVERY_MS + 1));
    assert!(!monitor.in_recovery());
}
