//! Lever - Single-Axis Lever Position Sensor Firmware
//!
//! Main firmware binary for RP2040-based boards. Reads the lever
//! potentiometer, maps it through the stored calibration range into a
//! 0-100 value, watches for faults, and talks JSON over UART0.
//!
//! Board wiring (Raspberry Pi Pico):
//! - Potentiometer wiper: GPIO26 (ADC0)
//! - Calibration button: GPIO15 to ground (internal pull-up)
//! - Host serial: UART0 TX=GPIO0, RX=GPIO1, 115200 8N1

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lever_hal::{Button, RamEeprom};
use lever_hal_rp2040::adc::{AdcChannel, LeverAdc};
use lever_hal_rp2040::eeprom::{FlashEeprom, EEPROM_SECTOR_START};
use lever_hal_rp2040::gpio::Rp2040Input;

use crate::config::LEVER_CONFIG;
use crate::storage::BoardStorage;

mod channels;
mod config;
mod controller;
mod storage;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// ADC channel wired to the potentiometer wiper
const LEVER_CHANNEL: AdcChannel = AdcChannel::Adc0;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lever firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    info!(
        "Config: tick={}ms report={}ms stuck={} samples button={}ms comm={}ms",
        LEVER_CONFIG.tick_interval_ms,
        LEVER_CONFIG.report_interval_ms,
        LEVER_CONFIG.stuck_sample_count,
        LEVER_CONFIG.button_stuck_ms,
        LEVER_CONFIG.comm_timeout_ms,
    );

    // Calibration storage in the last flash sector
    let flash = Flash::new_blocking(p.FLASH);
    let storage = match FlashEeprom::new(flash, EEPROM_SECTOR_START) {
        Ok(eeprom) => {
            info!("EEPROM loaded from flash at {:#x}", EEPROM_SECTOR_START);
            BoardStorage::Flash(eeprom)
        }
        Err(e) => {
            error!("Flash EEPROM unavailable ({:?}), calibration will not persist", e);
            BoardStorage::Volatile(RamEeprom::new())
        }
    };

    // Lever potentiometer
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let channel = Channel::new_pin(p.PIN_26, Pull::None);
    let lever = LeverAdc::new(adc, channel);
    info!(
        "Lever ADC on {:?} (GPIO{})",
        LEVER_CHANNEL,
        LEVER_CHANNEL.gpio().unwrap_or(0)
    );

    // Calibration button, active low
    let button = Button::new(Rp2040Input::new(Input::new(p.PIN_15, Pull::Up)), true);

    // Host serial link
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for host communication");

    spawner
        .spawn(tasks::tick_task(LEVER_CONFIG.tick_interval_ms))
        .unwrap();
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::controller_task(lever, button, storage))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
