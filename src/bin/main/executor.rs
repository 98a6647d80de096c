use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Receiver};
use embassy_time::Timer;
use log::info;
use microbyte_core::dispatch::{MODE_QUEUE_DEPTH, ModeMessage, ModeOpcode};

/// Simulated run time of an external app or firmware flash.
const HANDOFF_HOLD_MS: u64 = 1_500;

/// Completion flag the execution side raises for the shell loop.
pub(super) struct ExecutionHandle {
    completed: AtomicBool,
    handled: AtomicU32,
}

impl ExecutionHandle {
    pub(super) const fn new() -> Self {
        Self {
            completed: AtomicBool::new(false),
            handled: AtomicU32::new(0),
        }
    }

    pub(super) fn mark_complete(&self) {
        self.completed.store(true, Ordering::Release);
    }

    /// Consume a pending completion, if any.
    pub(super) fn take_complete(&self) -> bool {
        self.completed.swap(false, Ordering::AcqRel)
    }

    fn record(&self) -> u32 {
        self.handled.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

/// Bring-up consumer for the mode channel: log every request and hand
/// control back for the one-shot modes.
pub(super) async fn execution_loop(
    receiver: Receiver<'static, CriticalSectionRawMutex, ModeMessage, MODE_QUEUE_DEPTH>,
    handle: &'static ExecutionHandle,
) -> ! {
    loop {
        let message = receiver.receive().await;
        let count = handle.record();
        info!(
            "executor: #{} opcode={:?} console={} name={} resume={} active={}",
            count,
            message.opcode,
            message.console_id(),
            message.item_name.as_str(),
            message.resume,
            message.active
        );

        match message.opcode {
            ModeOpcode::LaunchExternalApp | ModeOpcode::FlashFirmware => {
                Timer::after_millis(HANDOFF_HOLD_MS).await;
                info!("executor: {:?} finished, returning to menu", message.opcode);
                handle.mark_complete();
            }
            // Games keep running until the shell sends EXIT_TO_MENU.
            _ => {}
        }
    }
}
