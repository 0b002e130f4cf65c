//! Tick task driving the control loop

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

/// Signal to notify controller of tick, carrying the uptime in ms
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Milliseconds since boot
///
/// Wraps after about 49 days; every consumer uses wrapping arithmetic.
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Seconds since boot, from the 64-bit clock
pub fn uptime_secs() -> u32 {
    Instant::now().as_secs() as u32
}

/// Tick task - sends periodic tick signals with timestamp
#[embassy_executor::task]
pub async fn tick_task(interval_ms: u32) {
    info!("Tick task started ({} ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms as u64));

    loop {
        ticker.next().await;
        TICK_SIGNAL.signal(now_ms());
    }
}
