//! Mode commands towards the execution subsystem and battery telemetry.

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{Duration, with_timeout};
use log::{debug, warn};

use crate::catalog::{Console, ITEM_NAME_BYTES, ItemName};

pub const MODE_QUEUE_DEPTH: usize = 4;
pub const TELEMETRY_QUEUE_DEPTH: usize = 2;

/// At or above this voltage the board runs from USB.
pub const EXTERNAL_POWER_MV: u16 = 4190;
/// At or above this voltage the cell reports as charged.
pub const CHARGED_MV: u16 = 4165;
pub const EMPTY_MV: u16 = 3300;
/// Percentage sentinel for an unknown or faulted reading.
pub const FAULT_PERCENT: u8 = 1;
pub const LOW_PERCENT: u8 = 25;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModeOpcode {
    LaunchGame,
    ResumeGame,
    SaveGame,
    ExitToMenu,
    LaunchExternalApp,
    FlashFirmware,
}

/// One mode transition request, consumed exactly once by the executor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModeMessage {
    pub opcode: ModeOpcode,
    pub console: Option<Console>,
    pub item_name: ItemName,
    pub resume: bool,
    pub active: bool,
}

impl ModeMessage {
    const fn bare(opcode: ModeOpcode) -> Self {
        Self {
            opcode,
            console: None,
            item_name: ItemName::new(),
            resume: false,
            active: false,
        }
    }

    fn named(opcode: ModeOpcode, name: &str) -> Self {
        let mut message = Self::bare(opcode);
        let mut end = name.len().min(ITEM_NAME_BYTES);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        // Fits by construction.
        let _ = message.item_name.push_str(&name[..end]);
        message
    }

    pub fn launch_game(console: Console, name: &str, resume: bool) -> Self {
        let mut message = Self::named(ModeOpcode::LaunchGame, name);
        message.console = Some(console);
        message.resume = resume;
        message.active = true;
        message
    }

    /// Leave the in-game menu and continue the running game.
    pub const fn resume_game() -> Self {
        Self::bare(ModeOpcode::ResumeGame)
    }

    pub fn save_game(console: Console) -> Self {
        let mut message = Self::bare(ModeOpcode::SaveGame);
        message.console = Some(console);
        message
    }

    pub const fn exit_to_menu() -> Self {
        Self::bare(ModeOpcode::ExitToMenu)
    }

    pub fn launch_app(name: &str) -> Self {
        let mut message = Self::named(ModeOpcode::LaunchExternalApp, name);
        message.active = true;
        message
    }

    pub fn flash_firmware(name: &str) -> Self {
        let mut message = Self::named(ModeOpcode::FlashFirmware, name);
        message.active = true;
        message
    }

    /// Console id on the wire, `0` when the opcode carries none.
    pub fn console_id(&self) -> u8 {
        self.console.map_or(0, Console::id)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    Delivered,
    Dropped,
}

/// Producer side of the mode channel.
///
/// Delivery is at-most-once: a message that cannot be queued within the
/// configured wait is logged and dropped, never retried.
pub struct CommandDispatcher<'ch, M: RawMutex, const N: usize> {
    sender: Sender<'ch, M, ModeMessage, N>,
    send_wait: Duration,
    delivered: u32,
    dropped: u32,
}

impl<'ch, M: RawMutex, const N: usize> CommandDispatcher<'ch, M, N> {
    pub fn new(sender: Sender<'ch, M, ModeMessage, N>, send_wait: Duration) -> Self {
        Self {
            sender,
            send_wait,
            delivered: 0,
            dropped: 0,
        }
    }

    /// Queue without waiting.
    pub fn try_send(&mut self, message: ModeMessage) -> SendOutcome {
        let opcode = message.opcode;
        let outcome = match self.sender.try_send(message) {
            Ok(()) => SendOutcome::Delivered,
            Err(_) => SendOutcome::Dropped,
        };
        self.record(opcode, outcome);
        outcome
    }

    /// Queue, waiting at most the configured send wait for room.
    pub async fn send(&mut self, message: ModeMessage) -> SendOutcome {
        let opcode = message.opcode;
        let outcome = match with_timeout(self.send_wait, self.sender.send(message)).await {
            Ok(()) => SendOutcome::Delivered,
            Err(_) => SendOutcome::Dropped,
        };
        self.record(opcode, outcome);
        outcome
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn record(&mut self, opcode: ModeOpcode, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Delivered => {
                self.delivered = self.delivered.wrapping_add(1);
                debug!("dispatch: queued opcode={:?}", opcode);
            }
            SendOutcome::Dropped => {
                self.dropped = self.dropped.wrapping_add(1);
                warn!(
                    "dispatch: mode queue full, dropped opcode={:?} total_dropped={}",
                    opcode, self.dropped
                );
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TelemetrySample {
    pub voltage_mv: u16,
    pub percentage: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatteryIndicator {
    ExternalPower,
    Fault,
    Level { percent: u8, low: bool },
}

impl TelemetrySample {
    /// Linear cell estimate between [`EMPTY_MV`] and [`CHARGED_MV`].
    ///
    /// The fault sentinel is never produced by a valid reading.
    pub fn from_millivolts(voltage_mv: u16) -> Self {
        let span = (CHARGED_MV - EMPTY_MV) as u32;
        let above = voltage_mv.saturating_sub(EMPTY_MV).min(CHARGED_MV - EMPTY_MV) as u32;
        let mut percentage = (above * 100 / span) as u8;
        if percentage == FAULT_PERCENT {
            percentage = 2;
        }
        Self {
            voltage_mv,
            percentage,
        }
    }

    pub const fn fault(voltage_mv: u16) -> Self {
        Self {
            voltage_mv,
            percentage: FAULT_PERCENT,
        }
    }

    pub const fn is_fault(&self) -> bool {
        self.percentage == FAULT_PERCENT
    }

    pub const fn is_charged(&self) -> bool {
        self.voltage_mv >= CHARGED_MV
    }

    pub fn indicator(&self) -> BatteryIndicator {
        if self.voltage_mv >= EXTERNAL_POWER_MV {
            BatteryIndicator::ExternalPower
        } else if self.is_fault() {
            BatteryIndicator::Fault
        } else {
            BatteryIndicator::Level {
                percent: self.percentage.min(100),
                low: self.percentage <= LOW_PERCENT,
            }
        }
    }
}

/// Non-blocking telemetry consumer.
pub trait TelemetrySource {
    fn try_receive(&mut self) -> Option<TelemetrySample>;
}

impl<M: RawMutex, const N: usize> TelemetrySource for Receiver<'_, M, TelemetrySample, N> {
    fn try_receive(&mut self) -> Option<TelemetrySample> {
        Receiver::try_receive(self).ok()
    }
}

/// Rate limiter for telemetry reads.
#[derive(Clone, Copy, Debug)]
pub struct TelemetryPoller {
    period_ticks: u32,
    last_poll: Option<u32>,
}

impl TelemetryPoller {
    pub const fn new(period_ticks: u32) -> Self {
        Self {
            period_ticks,
            last_poll: None,
        }
    }

    /// Read one sample when a full period has passed since the last read.
    ///
    /// No sample available leaves the caller's state untouched.
    pub fn poll<S: TelemetrySource + ?Sized>(
        &mut self,
        source: &mut S,
        now: u32,
    ) -> Option<TelemetrySample> {
        let due = self
            .last_poll
            .is_none_or(|last| now.wrapping_sub(last) >= self.period_ticks);
        if !due {
            return None;
        }
        self.last_poll = Some(now);
        source.try_receive()
    }
}

/// Producer helper for the battery task: drop the newest sample when full.
pub fn publish_telemetry<M: RawMutex, const N: usize>(
    sender: &Sender<'_, M, TelemetrySample, N>,
    sample: TelemetrySample,
) -> SendOutcome {
    match sender.try_send(sample) {
        Ok(()) => SendOutcome::Delivered,
        Err(_) => {
            warn!("battery: telemetry queue full, dropped sample {:?}", sample);
            SendOutcome::Dropped
        }
    }
}
