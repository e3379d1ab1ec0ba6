//! Periodic write-back
//!
//! Block writes stay in the page cache until something syncs. This task
//! bounds how long a buffered write can stay off flash.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::SharedDevice;

/// Write-back interval in milliseconds
pub const SYNC_INTERVAL_MS: u64 = 1000;

/// Sync task - flushes pending writes at a fixed interval
#[embassy_executor::task]
pub async fn sync_task(device: &'static SharedDevice) {
    info!("Sync task started");

    let mut ticker = Ticker::every(Duration::from_millis(SYNC_INTERVAL_MS));

    loop {
        ticker.next().await;

        if !device.lock(|dev| dev.has_pending_writes()) {
            continue;
        }

        // A failed flush keeps the page cached; the next tick retries it
        if let Err(e) = device.sync() {
            warn!("Periodic sync failed: {:?}", e);
        }
    }
}
