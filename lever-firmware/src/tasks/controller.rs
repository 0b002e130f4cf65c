//! Main controller task
//!
//! Samples the lever on every tick, serves host requests, and forwards
//! encoded reports and replies to the serial transmitter.

use defmt::*;
use embassy_futures::select::{select, Either};

use lever_core::error::ErrorKind;
use lever_hal::{AnalogInput, Button};
use lever_hal_rp2040::adc::LeverAdc;
use lever_hal_rp2040::gpio::Rp2040Input;
use lever_protocol::report::EncodeError;
use lever_protocol::MAX_MESSAGE_SIZE;

use crate::channels::{HostRequest, OutboundLine, HOST_REQUESTS, OUTBOUND};
use crate::config::LEVER_CONFIG;
use crate::controller::{Controller, Event, Response};
use crate::storage::BoardStorage;
use crate::tasks::tick::{now_ms, uptime_secs, TICK_SIGNAL};

type LeverController = Controller<BoardStorage>;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(
    mut lever: LeverAdc<'static>,
    button: Button<Rp2040Input<'static>>,
    storage: BoardStorage,
) {
    info!("Controller task started");

    let volatile = storage.is_volatile();
    let boot_ms = now_ms();
    let mut controller = Controller::new(LEVER_CONFIG, storage, boot_ms);

    controller.boot(boot_ms);
    if volatile {
        controller.raise(ErrorKind::MemoryError, boot_ms);
    }
    log_events(&mut controller);

    let mut mode = controller.display_mode(boot_ms);
    info!("Device ID: {}", controller.device_id());

    loop {
        let now = match select(TICK_SIGNAL.wait(), HOST_REQUESTS.receive()).await {
            Either::First(now) => {
                let sample = lever.read_raw();
                if controller.tick(sample, button.is_pressed(), now) {
                    send_report(&controller);
                }
                now
            }
            Either::Second(request) => {
                let now = now_ms();
                handle_request(&mut controller, request, now);
                now
            }
        };

        log_events(&mut controller);

        let next = controller.display_mode(now);
        if next != mode {
            debug!("Display mode: {:?}", next);
            mode = next;
        }
    }
}

/// Serve one host request
fn handle_request(controller: &mut LeverController, request: HostRequest, now: u32) {
    match request {
        HostRequest::Command(command) => match controller.handle_command(command, now) {
            Response::Report => send_report(controller),
            Response::Reply(reply) => send_line(|buf| reply.encode(buf)),
        },
        HostRequest::Rejected { error, line } => {
            warn!("Rejected '{}': {:?}", line.as_str(), error);
            let reply = controller.reject(error, &line, now);
            send_line(|buf| reply.encode(buf));
        }
    }
}

fn send_report(controller: &LeverController) {
    let report = controller.report(uptime_secs());
    send_line(|buf| report.encode(buf));
}

/// Encode a message and queue it for the transmitter
///
/// Never blocks the control loop; a full queue drops the message.
fn send_line(encode: impl FnOnce(&mut [u8]) -> Result<usize, EncodeError>) {
    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    let line = match encode(&mut buf) {
        Ok(len) => OutboundLine::from_slice(&buf[..len]),
        Err(e) => {
            error!("Failed to encode message: {:?}", e);
            return;
        }
    };

    match line {
        Ok(line) => {
            if OUTBOUND.try_send(line).is_err() {
                warn!("Outbound queue full, dropping message");
            }
        }
        Err(()) => error!("Encoded message exceeds line buffer"),
    }
}

fn log_events(controller: &mut LeverController) {
    for event in controller.take_events() {
        match event {
            Event::CalibrationLoaded(range) => info!(
                "Calibration loaded: {}..{} (calibrated={})",
                range.min_value, range.max_value, range.is_calibrated
            ),
            Event::CalibrationMissing => info!("No stored calibration, using defaults"),
            Event::CalibrationCorrupt(e) => warn!("Stored calibration unusable: {:?}", e),
            Event::CaptureStarted => info!("Calibration sweep started"),
            Event::CaptureRejected(e) => warn!("Calibration sweep rejected: {:?}", e),
            Event::CalibrationSaved(range) => {
                info!("Calibration saved: {}..{}", range.min_value, range.max_value)
            }
            Event::CalibrationSaveFailed(e) => error!("Failed to save calibration: {:?}", e),
            Event::CalibrationReset => info!("Calibration reset to defaults"),
            Event::CalibrationResetFailed(e) => error!("Failed to reset calibration: {:?}", e),
            Event::ErrorRaised(kind) => {
                if kind.requires_restart() {
                    error!("Error raised: {:?} (code {})", kind, kind.code());
                } else {
                    warn!("Error raised: {:?} (code {})", kind, kind.code());
                }
            }
            Event::RecoveryStarted(kind) => info!("Recovery in progress: {:?}", kind),
            Event::ErrorCleared(kind) => info!("Error cleared: {:?}", kind),
        }
    }
}
