//! Debounced button-to-key translation with top-level tab remapping.

use heapless::Vec;
use log::debug;

use super::{BUTTON_COUNT, Button, InputBits, LogicalKey};

/// Ticks that must elapse between two accepted triggers of one button.
pub const DEBOUNCE_WINDOW_TICKS: u32 = 7;
/// Main tabs reachable with Left/Right at top level.
pub const TAB_COUNT: u8 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyMapConfig {
    pub debounce_window_ticks: u32,
    pub active_low: bool,
}

impl Default for KeyMapConfig {
    fn default() -> Self {
        Self {
            debounce_window_ticks: DEBOUNCE_WINDOW_TICKS,
            active_low: true,
        }
    }
}

/// Last accepted trigger of one physical button.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ButtonTimer {
    last_trigger: Option<u32>,
}

impl ButtonTimer {
    /// Accept the trigger when the window has elapsed, resetting the timer.
    fn accept(&mut self, now: u32, window: u32) -> bool {
        let elapsed_ok = self
            .last_trigger
            .is_none_or(|last| now.wrapping_sub(last) > window);
        if elapsed_ok {
            self.last_trigger = Some(now);
        }
        elapsed_ok
    }

    pub fn last_trigger(&self) -> Option<u32> {
        self.last_trigger
    }
}

/// One accepted button trigger.
///
/// `key` is `None` for buttons outside the navigation vocabulary (Menu) and
/// for top-level Left/Right presses against the clamped tab edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonTrigger {
    pub button: Button,
    pub key: Option<LogicalKey>,
    pub tab_switch: Option<u8>,
}

#[derive(Debug)]
pub struct KeyMapper {
    config: KeyMapConfig,
    timers: [ButtonTimer; BUTTON_COUNT],
    tab: u8,
}

impl KeyMapper {
    pub fn new(config: KeyMapConfig) -> Self {
        Self {
            config,
            timers: [ButtonTimer::default(); BUTTON_COUNT],
            tab: 0,
        }
    }

    pub fn tab(&self) -> u8 {
        self.tab
    }

    /// Align the tab index with focus changes made outside Left/Right.
    pub fn sync_tab(&mut self, tab: u8) {
        self.tab = tab.min(TAB_COUNT - 1);
    }

    pub fn timer(&self, button: Button) -> ButtonTimer {
        self.timers[button.index()]
    }

    /// Sample every registered button once.
    ///
    /// `scope_depth` is read on every call: Left/Right only cycle tabs while
    /// the scope stack sits at top level.
    pub fn poll(
        &mut self,
        raw: InputBits,
        now: u32,
        scope_depth: usize,
    ) -> Vec<ButtonTrigger, BUTTON_COUNT> {
        let mut triggers = Vec::new();

        for button in Button::ALL {
            if !button.is_asserted(raw, self.config.active_low) {
                continue;
            }
            if !self.timers[button.index()].accept(now, self.config.debounce_window_ticks) {
                continue;
            }

            let trigger = self.map_button(button, scope_depth);
            debug!(
                "input: trigger button={:?} key={:?} tab_switch={:?} depth={} now={}",
                trigger.button, trigger.key, trigger.tab_switch, scope_depth, now
            );
            // Capacity equals the number of registered buttons.
            let _ = triggers.push(trigger);
        }

        triggers
    }

    fn map_button(&mut self, button: Button, scope_depth: usize) -> ButtonTrigger {
        let top_level = scope_depth <= 1;
        let (key, tab_switch) = match button {
            Button::Down => (Some(LogicalKey::Next), None),
            Button::Up => (Some(LogicalKey::Prev), None),
            Button::A => (Some(LogicalKey::Enter), None),
            Button::B => (Some(LogicalKey::Cancel), None),
            Button::Menu => (None, None),
            Button::Left if top_level => {
                if self.tab > 0 {
                    self.tab -= 1;
                    (Some(LogicalKey::Prev), Some(self.tab))
                } else {
                    (None, None)
                }
            }
            Button::Right if top_level => {
                if self.tab < TAB_COUNT - 1 {
                    self.tab += 1;
                    (Some(LogicalKey::Next), Some(self.tab))
                } else {
                    (None, None)
                }
            }
            Button::Left => (Some(LogicalKey::Left), None),
            Button::Right => (Some(LogicalKey::Right), None),
        };

        ButtonTrigger {
            button,
            key,
            tab_switch,
        }
    }
}
