use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Sender};
use embassy_time::Timer;
use log::info;
use microbyte_core::dispatch::{
    SendOutcome, TELEMETRY_QUEUE_DEPTH, TelemetrySample, publish_telemetry,
};

const BATTERY_SAMPLE_INTERVAL_MS: u64 = 1_000;

/// Periodic battery producer.
///
/// The fuel-gauge divider is not wired on this board revision, so every
/// sample carries the fault sentinel and the shell shows the battery as
/// unknown.
pub(super) async fn battery_loop(
    sender: Sender<'static, CriticalSectionRawMutex, TelemetrySample, TELEMETRY_QUEUE_DEPTH>,
) -> ! {
    let mut published = 0u32;
    loop {
        let sample = TelemetrySample::fault(0);
        if publish_telemetry(&sender, sample) == SendOutcome::Delivered {
            published = published.wrapping_add(1);
            if published == 1 {
                info!("battery: first sample published {:?}", sample);
            }
        }
        Timer::after_millis(BATTERY_SAMPLE_INTERVAL_MS).await;
    }
}
