//! Serial transmit task
//!
//! Writes encoded reports and replies to the host.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::OUTBOUND;

/// Serial TX task - forwards outbound lines to the UART
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let line = OUTBOUND.receive().await;

        if let Err(e) = tx.write_all(&line).await {
            warn!("Failed to send line: {:?}", e);
        } else {
            trace!("TX: {} bytes", line.len());
        }
    }
}
