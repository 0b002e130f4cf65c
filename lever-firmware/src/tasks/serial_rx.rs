//! Serial receive task
//!
//! Splits the host byte stream into lines and parses commands.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::String;

use lever_protocol::{Command, LineBuffer, LineError, MAX_LINE_LEN};

use crate::channels::{HostRequest, HOST_REQUESTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - receives and parses host command lines
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match lines.feed(byte) {
                        Ok(Some(line)) => dispatch(line),
                        Ok(None) => {}
                        Err(LineError::Overflow) => warn!("Command line too long, dropped"),
                        Err(LineError::InvalidUtf8) => warn!("Command line not UTF-8, dropped"),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Parse a line and hand it to the controller
fn dispatch(line: String<MAX_LINE_LEN>) {
    let request = match Command::parse(&line) {
        Ok(command) => {
            debug!("Command: {:?}", command);
            HostRequest::Command(command)
        }
        Err(error) => HostRequest::Rejected { error, line },
    };

    if HOST_REQUESTS.try_send(request).is_err() {
        warn!("Request channel full, dropping command");
    }
}
