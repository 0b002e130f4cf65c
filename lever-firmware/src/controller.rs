//! Lever controller coordinating sampling, calibration, and fault handling
//!
//! The controller is the central brain that:
//! - Feeds ADC samples through the history and smoothing windows
//! - Runs the error monitor's checks and recovery every tick
//! - Drives the button-operated calibration capture
//! - Serves host commands and builds data reports
//!
//! It performs no I/O itself; the controller task reads the hardware and
//! logs the [`Event`]s produced here.

use heapless::Vec;

use lever_core::calibration::{CalibrationCapture, CalibrationError, CaptureError};
use lever_core::config::{LeverConfig, MAX_SAMPLE_WINDOW};
use lever_core::display::{DisplayMode, DisplayState};
use lever_core::error::{ErrorKind, ErrorMonitor, RecoveryOutcome};
use lever_core::sensor::SampleWindow;
use lever_core::{CalibrationRange, CalibrationStore};
use lever_hal::adc::AdcError;
use lever_hal::EepromStorage;
use lever_protocol::command::parse_device_id;
use lever_protocol::{Command, CommandError, DataReport, DeviceId, Reply, SensorData, StatusData};

/// Samples averaged into the smoothed value
pub const SMOOTHING_SAMPLES: usize = 8;

/// Presses shorter than this toggle calibration capture (ms)
pub const CAPTURE_PRESS_MAX_MS: u32 = 2000;

/// Maximum events buffered between drains
pub const MAX_EVENTS: usize = 8;

/// Notable transitions for the task to log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Stored range loaded at boot
    CalibrationLoaded(CalibrationRange),
    /// No range stored yet, defaults in use
    CalibrationMissing,
    /// Stored range unusable, defaults in use
    CalibrationCorrupt(CalibrationError),
    /// Button started a calibration sweep
    CaptureStarted,
    /// Sweep ended without a usable range
    CaptureRejected(CaptureError),
    /// New range persisted
    CalibrationSaved(CalibrationRange),
    /// New range could not be persisted
    CalibrationSaveFailed(CalibrationError),
    /// Defaults persisted
    CalibrationReset,
    /// Defaults could not be persisted
    CalibrationResetFailed(CalibrationError),
    /// Current error changed to this kind
    ErrorRaised(ErrorKind),
    /// First recovery attempt of an episode left this error active
    RecoveryStarted(ErrorKind),
    /// This error was cleared
    ErrorCleared(ErrorKind),
}

/// Latest processed sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub raw: i16,
    pub smoothed: i16,
    /// Smoothed value mapped through the active range
    pub value: u8,
}

/// What to send back for a host command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A data report
    Report,
    /// A status reply
    Reply(Reply),
}

/// Controller state for one lever
pub struct Controller<S: EepromStorage> {
    config: LeverConfig,
    device_id: DeviceId,
    store: CalibrationStore<S>,
    monitor: ErrorMonitor,
    /// Raw history for stuck-sensor detection
    history: SampleWindow<MAX_SAMPLE_WINDOW>,
    smoothing: SampleWindow<SMOOTHING_SAMPLES>,
    capture: CalibrationCapture,
    display: DisplayState,
    button_down_since: Option<u32>,
    last_comm_ms: u32,
    last_report_ms: u32,
    reading: Reading,
    events: Vec<Event, MAX_EVENTS>,
}

impl<S: EepromStorage> Controller<S> {
    /// Create a controller; nothing is read until [`boot`](Self::boot)
    pub fn new(config: LeverConfig, storage: S, now_ms: u32) -> Self {
        let store = CalibrationStore::new(storage, config.calibration_offset as usize);

        Self {
            config,
            device_id: parse_device_id(config.device_id).unwrap_or_default(),
            store,
            monitor: ErrorMonitor::new(),
            history: SampleWindow::new(),
            smoothing: SampleWindow::new(),
            capture: CalibrationCapture::new(),
            display: DisplayState::new(now_ms),
            button_down_since: None,
            last_comm_ms: now_ms,
            last_report_ms: now_ms,
            reading: Reading::default(),
            events: Vec::new(),
        }
    }

    /// Load the stored calibration
    ///
    /// A missing record is normal on first boot. A corrupt one raises
    /// `CalibrationError`, whose recovery rewrites the defaults; a failing
    /// medium raises `MemoryError`.
    pub fn boot(&mut self, now_ms: u32) {
        match self.store.load_calibration() {
            Ok(range) => self.emit(Event::CalibrationLoaded(range)),
            Err(CalibrationError::NotFound) => self.emit(Event::CalibrationMissing),
            Err(CalibrationError::Storage(_)) => {
                self.raise(ErrorKind::MemoryError, now_ms);
            }
            Err(e) => {
                self.emit(Event::CalibrationCorrupt(e));
                self.raise(ErrorKind::CalibrationError, now_ms);
            }
        }
    }

    /// Make `kind` the current error outside the regular checks
    pub fn raise(&mut self, kind: ErrorKind, now_ms: u32) {
        let before = self.monitor.current_error();
        self.monitor.set_error(kind, now_ms);
        self.note_error_change(before);
    }

    /// Run one control cycle
    ///
    /// Recovery runs first so an error detected in this cycle stays
    /// current until the next one. Returns true when a periodic report
    /// is due.
    pub fn tick(&mut self, sample: Result<i16, AdcError>, pressed: bool, now_ms: u32) -> bool {
        let before = self.monitor.current_error();

        match self.monitor.handle_error_outcome(now_ms) {
            RecoveryOutcome::Recovered(ErrorKind::CalibrationError) => {
                self.reset_calibration(now_ms);
            }
            RecoveryOutcome::Pending {
                kind,
                first_attempt: true,
            } => self.emit(Event::RecoveryStarted(kind)),
            _ => {}
        }

        match sample {
            Ok(raw) => self.process_sample(raw, now_ms),
            Err(AdcError::Conversion) => self.monitor.set_error(ErrorKind::SensorError, now_ms),
        }

        self.process_button(pressed, now_ms);

        let range = self.store.range();
        self.monitor.check_calibration_data(
            range.min_value,
            range.max_value,
            range.is_calibrated,
            now_ms,
        );
        self.monitor.check_communication_timeout(
            self.last_comm_ms,
            self.config.comm_timeout_ms,
            now_ms,
        );

        self.note_error_change(before);

        if now_ms.wrapping_sub(self.last_report_ms) >= self.config.report_interval_ms {
            self.last_report_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Execute a host command
    pub fn handle_command(&mut self, command: Command, now_ms: u32) -> Response {
        let before = self.monitor.current_error();
        self.note_host_activity(now_ms);

        let response = match command {
            Command::GetData => Response::Report,
            Command::ResetCalib => {
                self.capture.cancel();
                if self.reset_calibration(now_ms) {
                    Response::Reply(Reply::calibration_reset())
                } else {
                    Response::Reply(Reply::calibration_reset_failed())
                }
            }
            Command::SetId(id) => {
                let reply = Reply::id_set(&id);
                self.device_id = id;
                Response::Reply(reply)
            }
        };

        self.note_error_change(before);
        response
    }

    /// Answer a line that did not parse
    ///
    /// The host is still talking, so this counts as activity.
    pub fn reject(&mut self, error: CommandError, line: &str, now_ms: u32) -> Reply {
        self.note_host_activity(now_ms);
        Reply::rejected(error, line)
    }

    /// Build a data report from the latest reading
    ///
    /// `uptime_s` comes straight from the full-width clock, not from the
    /// wrapping millisecond tick count.
    pub fn report(&self, uptime_s: u32) -> DataReport<'_> {
        let range = self.store.range();

        DataReport {
            device_id: &self.device_id,
            timestamp: uptime_s,
            data: SensorData {
                raw: self.reading.raw,
                smoothed: self.reading.smoothed,
                value: self.reading.value,
                calibrated: range.is_calibrated,
                calib_min: range.min_value,
                calib_max: range.max_value,
            },
            status: StatusData {
                error_code: self.monitor.current_error().code(),
            },
        }
    }

    /// Mode an attached display should show
    pub fn display_mode(&self, now_ms: u32) -> DisplayMode {
        self.display
            .mode(now_ms, self.monitor.current_error(), self.capture.is_active())
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<Event, MAX_EVENTS> {
        core::mem::take(&mut self.events)
    }

    /// Latest processed sample
    pub fn reading(&self) -> Reading {
        self.reading
    }

    /// Active calibration range
    pub fn range(&self) -> CalibrationRange {
        self.store.range()
    }

    /// Current device ID
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Error monitor state
    pub fn monitor(&self) -> &ErrorMonitor {
        &self.monitor
    }

    fn process_sample(&mut self, raw: i16, now_ms: u32) {
        let count = self.config.stuck_sample_count as usize;

        // Newest `count` samples; a short history never flags
        let ordered: Vec<i16, MAX_SAMPLE_WINDOW> = self.history.iter_ordered().copied().collect();
        let recent = &ordered[ordered.len().saturating_sub(count)..];
        self.monitor.check_sensor_error(raw, recent, count, now_ms);

        self.history.push(raw);
        self.smoothing.push(raw);
        self.capture.observe(raw);

        let smoothed = self.smoothing.smoothed().unwrap_or(raw);
        self.reading = Reading {
            raw,
            smoothed,
            value: self.store.map_to_0_100(smoothed),
        };
    }

    fn process_button(&mut self, pressed: bool, now_ms: u32) {
        match (pressed, self.button_down_since) {
            (true, None) => self.button_down_since = Some(now_ms),
            (false, Some(since)) => {
                self.button_down_since = None;
                if now_ms.wrapping_sub(since) < CAPTURE_PRESS_MAX_MS {
                    self.toggle_capture(now_ms);
                }
            }
            _ => {}
        }

        self.monitor
            .check_button_stuck(pressed, self.config.button_stuck_ms, now_ms);
    }

    fn toggle_capture(&mut self, now_ms: u32) {
        if !self.capture.is_active() {
            self.capture.begin();
            self.emit(Event::CaptureStarted);
            return;
        }

        let success = match self.capture.finish() {
            Ok((min, max)) => match self.store.save_calibration(min, max, true) {
                Ok(()) => {
                    self.emit(Event::CalibrationSaved(self.store.range()));
                    true
                }
                Err(e) => {
                    if let CalibrationError::Storage(_) = e {
                        self.monitor.set_error(ErrorKind::MemoryError, now_ms);
                    }
                    self.emit(Event::CalibrationSaveFailed(e));
                    false
                }
            },
            Err(e) => {
                self.emit(Event::CaptureRejected(e));
                false
            }
        };

        self.display.note_calibration_result(success, now_ms);
    }

    fn reset_calibration(&mut self, now_ms: u32) -> bool {
        match self.store.reset_calibration() {
            Ok(()) => {
                self.emit(Event::CalibrationReset);
                true
            }
            Err(e) => {
                self.monitor.set_error(ErrorKind::MemoryError, now_ms);
                self.emit(Event::CalibrationResetFailed(e));
                false
            }
        }
    }

    fn note_host_activity(&mut self, now_ms: u32) {
        self.last_comm_ms = now_ms;
        self.display.note_command(now_ms);
    }

    fn note_error_change(&mut self, before: ErrorKind) {
        let after = self.monitor.current_error();
        if after == before {
            return;
        }
        if after == ErrorKind::NoError {
            self.emit(Event::ErrorCleared(before));
        } else {
            self.emit(Event::ErrorRaised(after));
        }
    }

    fn emit(&mut self, event: Event) {
        // Oldest events win; the task drains every cycle
        let _ = self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lever_hal::{EepromError, RamEeprom};

    type TestController = Controller<RamEeprom<64>>;

    const TICK: u32 = 50;

    fn booted() -> TestController {
        let mut ctrl = Controller::new(LeverConfig::DEFAULT, RamEeprom::new(), 0);
        ctrl.boot(0);
        ctrl
    }

    /// Tick with a slowly varying signal so the sensor never looks stuck
    fn run(ctrl: &mut TestController, from: u32, ticks: u32, pressed: bool) -> u32 {
        let mut now = from;
        for i in 0..ticks {
            now += TICK;
            ctrl.tick(Ok(500 + (i % 3) as i16), pressed, now);
        }
        now
    }

    #[test]
    fn test_first_boot_uses_defaults() {
        let mut ctrl = booted();
        assert_eq!(ctrl.range(), CalibrationRange::DEFAULT);
        assert_eq!(ctrl.take_events().as_slice(), &[Event::CalibrationMissing]);
        assert!(!ctrl.monitor().has_error());
    }

    #[test]
    fn test_corrupt_record_is_reset() {
        let mut storage = RamEeprom::<64>::new();
        storage.as_bytes_mut()[..4].copy_from_slice(&[0x56, 0x4C, 0x01, 0x00]);

        let mut ctrl = Controller::new(LeverConfig::DEFAULT, storage, 0);
        ctrl.boot(0);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::CalibrationError);

        ctrl.tick(Ok(100), false, TICK);
        let events = ctrl.take_events();
        assert!(events.contains(&Event::CalibrationReset));
        assert!(events.contains(&Event::ErrorCleared(ErrorKind::CalibrationError)));
        assert!(!ctrl.monitor().has_error());
    }

    #[test]
    fn test_reading_is_smoothed_and_mapped() {
        let mut ctrl = booted();
        ctrl.tick(Ok(1023), false, TICK);
        assert_eq!(ctrl.reading().value, 100);

        ctrl.tick(Ok(1), false, 2 * TICK);
        assert_eq!(ctrl.reading().raw, 1);
        assert_eq!(ctrl.reading().smoothed, 512);
        assert_eq!(ctrl.reading().value, 50);
    }

    #[test]
    fn test_report_interval() {
        let mut ctrl = booted();
        assert!(!ctrl.tick(Ok(100), false, 50));
        assert!(!ctrl.tick(Ok(101), false, 150));
        assert!(ctrl.tick(Ok(102), false, 200));
        assert!(!ctrl.tick(Ok(103), false, 250));
        assert!(ctrl.tick(Ok(104), false, 400));
    }

    #[test]
    fn test_stuck_sensor_visible_until_next_tick() {
        let mut ctrl = booted();
        let count = LeverConfig::DEFAULT.stuck_sample_count as u32;
        let mut now = 0;
        for _ in 0..count {
            now += TICK;
            ctrl.tick(Ok(700), false, now);
            assert!(!ctrl.monitor().has_error());
        }

        now += TICK;
        ctrl.tick(Ok(700), false, now);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::SensorError);
        assert_eq!(ctrl.report(now / 1000).status.error_code, 1);

        now += TICK;
        ctrl.tick(Ok(650), false, now);
        assert!(!ctrl.monitor().has_error());
    }

    #[test]
    fn test_adc_failure_is_sensor_error() {
        let mut ctrl = booted();
        ctrl.tick(Err(AdcError::Conversion), false, TICK);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::SensorError);
    }

    #[test]
    fn test_button_calibration_sweep() {
        let mut ctrl = booted();
        let mut now = TICK;

        // Short press starts capture
        ctrl.tick(Ok(500), true, now);
        now += TICK;
        ctrl.tick(Ok(501), false, now);
        assert_eq!(ctrl.display_mode(now), DisplayMode::Startup);
        assert!(ctrl.take_events().contains(&Event::CaptureStarted));

        for raw in [200, 350, 800, 640] {
            now += TICK;
            ctrl.tick(Ok(raw), false, now);
        }

        // Second short press saves
        now += TICK;
        ctrl.tick(Ok(600), true, now);
        now += TICK;
        ctrl.tick(Ok(601), false, now);

        assert_eq!(ctrl.range(), CalibrationRange::new(200, 800, true));
        assert!(ctrl
            .take_events()
            .contains(&Event::CalibrationSaved(CalibrationRange::new(200, 800, true))));
    }

    #[test]
    fn test_narrow_sweep_rejected() {
        let mut ctrl = booted();
        let mut now = TICK;
        ctrl.tick(Ok(500), true, now);
        now += TICK;
        ctrl.tick(Ok(501), false, now);

        now += TICK;
        ctrl.tick(Ok(510), true, now);
        now += TICK;
        ctrl.tick(Ok(511), false, now);

        assert_eq!(ctrl.range(), CalibrationRange::DEFAULT);
        assert!(ctrl
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::CaptureRejected(CaptureError::SpanTooSmall { .. }))));
    }

    #[test]
    fn test_long_press_is_button_error() {
        let mut ctrl = booted();
        let now = run(&mut ctrl, 0, 202, true);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::ButtonError);

        // Release does not toggle capture and the error holds for the
        // recovery delay
        let now = run(&mut ctrl, now, 1, false);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::ButtonError);
        assert_eq!(ctrl.display_mode(now), DisplayMode::Error(ErrorKind::ButtonError));

        run(&mut ctrl, now, 101, false);
        assert!(!ctrl.monitor().has_error());
    }

    #[test]
    fn test_commands() {
        let mut ctrl = booted();
        ctrl.tick(Ok(300), false, TICK);

        assert_eq!(ctrl.handle_command(Command::GetData, 100), Response::Report);

        let id = DeviceId::try_from("lever7").unwrap();
        assert_eq!(
            ctrl.handle_command(Command::SetId(id), 200),
            Response::Reply(Reply::id_set("lever7"))
        );
        assert_eq!(ctrl.device_id(), "lever7");
        assert_eq!(ctrl.report(2).device_id, "lever7");
        assert_eq!(ctrl.report(2).timestamp, 2);

        assert_eq!(
            ctrl.handle_command(Command::ResetCalib, 300),
            Response::Reply(Reply::calibration_reset())
        );
    }

    #[test]
    fn test_communication_timeout() {
        let mut ctrl = booted();
        let timeout = LeverConfig::DEFAULT.comm_timeout_ms;

        ctrl.tick(Ok(100), false, timeout);
        assert!(!ctrl.monitor().has_error());

        ctrl.tick(Ok(101), false, timeout + TICK);
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::CommunicationError);

        ctrl.reject(CommandError::Unknown, "PING", timeout + 2 * TICK);
        ctrl.tick(Ok(102), false, timeout + 3 * TICK);
        assert!(!ctrl.monitor().has_error());
    }

    /// Storage too small to hold a calibration record
    fn undersized() -> Controller<RamEeprom<8>> {
        Controller::new(LeverConfig::DEFAULT, RamEeprom::new(), 0)
    }

    #[test]
    fn test_unreadable_storage_at_boot_is_memory_error() {
        let mut ctrl = undersized();
        ctrl.boot(0);

        assert_eq!(ctrl.monitor().current_error(), ErrorKind::MemoryError);
        assert_eq!(ctrl.range(), CalibrationRange::DEFAULT);
        assert_eq!(
            ctrl.take_events().as_slice(),
            &[Event::ErrorRaised(ErrorKind::MemoryError)]
        );
    }

    #[test]
    fn test_failed_save_is_memory_error() {
        let mut ctrl = undersized();
        let mut now = TICK;

        ctrl.tick(Ok(500), true, now);
        now += TICK;
        ctrl.tick(Ok(501), false, now);
        for raw in [200, 800] {
            now += TICK;
            ctrl.tick(Ok(raw), false, now);
        }
        now += TICK;
        ctrl.tick(Ok(600), true, now);
        now += TICK;
        ctrl.tick(Ok(601), false, now);

        assert_eq!(ctrl.monitor().current_error(), ErrorKind::MemoryError);
        assert_eq!(ctrl.range(), CalibrationRange::DEFAULT);
        let events = ctrl.take_events();
        assert!(events.contains(&Event::CalibrationSaveFailed(CalibrationError::Storage(
            EepromError::OutOfBounds
        ))));
        assert!(events.contains(&Event::ErrorRaised(ErrorKind::MemoryError)));
    }

    #[test]
    fn test_failed_reset_replies_error() {
        let mut ctrl = undersized();

        assert_eq!(
            ctrl.handle_command(Command::ResetCalib, 100),
            Response::Reply(Reply::calibration_reset_failed())
        );
        assert_eq!(ctrl.monitor().current_error(), ErrorKind::MemoryError);
        assert_eq!(ctrl.range(), CalibrationRange::DEFAULT);
        assert!(ctrl
            .take_events()
            .contains(&Event::CalibrationResetFailed(CalibrationError::Storage(
                EepromError::OutOfBounds
            ))));
    }

    #[test]
    fn test_recovery_start_logged_once_per_episode() {
        let mut ctrl = undersized();
        ctrl.boot(0);
        ctrl.take_events();

        let now = run_undersized(&mut ctrl, 0, 3);
        let started = |events: &Vec<Event, MAX_EVENTS>| {
            events
                .iter()
                .filter(|e| **e == Event::RecoveryStarted(ErrorKind::MemoryError))
                .count()
        };
        assert_eq!(started(&ctrl.take_events()), 1);

        run_undersized(&mut ctrl, now, 3);
        assert_eq!(started(&ctrl.take_events()), 0);
    }

    fn run_undersized(ctrl: &mut Controller<RamEeprom<8>>, from: u32, ticks: u32) -> u32 {
        let mut now = from;
        for i in 0..ticks {
            now += TICK;
            ctrl.tick(Ok(500 + (i % 3) as i16), false, now);
        }
        now
    }

    #[test]
    fn test_report_timestamp_is_uptime_seconds() {
        let ctrl = booted();
        // Beyond the ~49.7 day range of a u32 millisecond count
        let uptime_s = 50 * 24 * 60 * 60;
        assert_eq!(ctrl.report(uptime_s).timestamp, uptime_s);
    }
}
