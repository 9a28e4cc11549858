//! The polling driver loop.
//!
//! Runs the translation engine at a fixed millisecond cadence and
//! exchanges the boundary buffers around each tick: published coil values
//! flow into the output slots, then the engine runs, then fresh input
//! states flow out to the image the Modbus clients read.

use std::time::Duration;

use tokio::time;

use crate::engine::Gateway;
use crate::image::IoImage;

/// Run the driver loop at `tick_interval`.
///
/// This function runs forever until the task is cancelled. Intended to be
/// raced against the Modbus server and the shutdown signal.
pub async fn run(gateway: &Gateway, image: &IoImage, tick_interval: Duration) {
    let mut ticker = time::interval(tick_interval);
    // A slow tick must not cause a later burst of catch-up ticks: the
    // refresh counters count real engine cycles.
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        gateway.publish(&image.outputs_snapshot());
        gateway.tick().await;
        image.set_inputs(&gateway.acquire());
    }
}
