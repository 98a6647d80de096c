//! Navigation controller for the menu shell: screens, dialogs and commands.

use embassy_time::Duration;
use heapless::Deque;
use log::{debug, error, info, warn};

use crate::{
    catalog::{Category, Console, ItemEnumerator, Listing, SaveStore},
    dispatch::{
        BatteryIndicator, MODE_QUEUE_DEPTH, ModeMessage, TelemetryPoller, TelemetrySample,
        TelemetrySource,
    },
    focus::{FocusScope, Routed, ScopeError, ScopeStack},
    input::{
        Button, LogicalKey, RawInputSource,
        keymap::{KeyMapConfig, KeyMapper},
    },
    settings::{ConfigKey, ConfigStore, Theme},
    toolkit::{NavigableItem, Toolkit, WidgetKind},
};

pub const SLIDER_MAX: u8 = 100;
const FALLBACK_SLIDER_VALUE: u8 = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ShellConfig {
    pub tick_period_ms: u32,
    pub debounce_window_ticks: u32,
    pub active_low: bool,
    pub telemetry_period_ticks: u32,
    pub send_wait_ticks: u32,
    pub slider_step: u8,
    pub low_battery_percent: u8,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 10,
            debounce_window_ticks: 7,
            active_low: true,
            telemetry_period_ticks: 100,
            send_wait_ticks: 10,
            slider_step: 5,
            low_battery_percent: 10,
        }
    }
}

impl ShellConfig {
    pub fn keymap(&self) -> KeyMapConfig {
        KeyMapConfig {
            debounce_window_ticks: self.debounce_window_ticks,
            active_low: self.active_low,
        }
    }

    /// Bounded wait for one command send.
    pub fn send_wait(&self) -> Duration {
        Duration::from_millis(self.send_wait_ticks as u64 * self.tick_period_ms as u64)
    }
}

/// Main tabs, in tab order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RootTile {
    Emulators,
    ExternalApps,
    Configuration,
}

impl RootTile {
    pub const ALL: [RootTile; 3] = [Self::Emulators, Self::ExternalApps, Self::Configuration];
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EmptyReason {
    NoGames,
    NoApps,
    NoFirmware,
    StorageUnavailable,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfoDialog {
    About,
    Battery,
    SdCard,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SliderTarget {
    Volume,
    Brightness,
}

impl SliderTarget {
    const fn config_key(self) -> ConfigKey {
        match self {
            Self::Volume => ConfigKey::Volume,
            Self::Brightness => ConfigKey::Brightness,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameOption {
    NewGame,
    ResumeGame,
    DeleteSave,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OnGameOption {
    Resume,
    Save,
    Volume,
    Brightness,
    Exit,
}

impl OnGameOption {
    const ALL: [OnGameOption; 5] = [
        Self::Resume,
        Self::Save,
        Self::Volume,
        Self::Brightness,
        Self::Exit,
    ];
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingOption {
    About,
    UpdateFirmware,
    Brightness,
    ColorMode,
    Volume,
    ButtonStateSave,
    BatteryStatus,
    SdCardStatus,
}

impl SettingOption {
    const ALL: [SettingOption; 8] = [
        Self::About,
        Self::UpdateFirmware,
        Self::Brightness,
        Self::ColorMode,
        Self::Volume,
        Self::ButtonStateSave,
        Self::BatteryStatus,
        Self::SdCardStatus,
    ];
}

/// What an open scope is showing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeKind {
    Root,
    Consoles,
    Games(Console),
    GameOptions(Console),
    OnGame(Console),
    Apps,
    AppLaunch,
    Settings,
    Firmware,
    FirmwareFlash,
    Slider(SliderTarget),
    Empty(EmptyReason),
    Info(InfoDialog),
    BatteryAlert,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavState {
    Root,
    List,
    Modal,
    Options,
}

impl ScopeKind {
    pub const fn nav_state(self) -> NavState {
        match self {
            Self::Root => NavState::Root,
            Self::Consoles | Self::Games(_) | Self::Apps | Self::Settings | Self::Firmware => {
                NavState::List
            }
            Self::GameOptions(_) | Self::OnGame(_) => NavState::Options,
            Self::AppLaunch
            | Self::FirmwareFlash
            | Self::Slider(_)
            | Self::Empty(_)
            | Self::Info(_)
            | Self::BatteryAlert => NavState::Modal,
        }
    }
}

/// Identity attached to every navigable item when it is created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemTag {
    Tile(RootTile),
    Console(Console),
    Entry(u16),
    GameOption(GameOption),
    OnGame(OnGameOption),
    Setting(SettingOption),
    Slider(SliderTarget),
    Dismiss,
}

/// Action delivered to the handler of the top scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UiAction {
    Activate,
    Cancel,
    ValueChanged(u8),
}

pub struct ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    storage: SD,
    config_store: CFG,
    toolkit: TK,
    input: IN,
    config: ShellConfig,
    keymap: KeyMapper,
    scopes: ScopeStack<ScopeKind, ItemTag>,
    listing: Listing,
    selected_entry: Option<u16>,
    slider_value: u8,
    outbox: Deque<ModeMessage, MODE_QUEUE_DEPTH>,
    telemetry: TelemetryPoller,
    battery: Option<TelemetrySample>,
    low_battery_latched: bool,
    theme: Theme,
    button_state_save: bool,
    pending_redraw: bool,
}

include!("view.rs");
include!("input.rs");
include!("runtime.rs");
include!("navigation.rs");
include!("actions.rs");

#[cfg(test)]
mod tests;
