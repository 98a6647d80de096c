use super::*;
use std::{cell::RefCell, collections::VecDeque, rc::Rc, vec::Vec};

use crate::{
    catalog::StaticCatalog,
    dispatch::{ModeOpcode, TelemetrySample},
    input::{ALL_RELEASED, InputBits},
    settings::MemoryConfig,
    toolkit::arena::WidgetArena,
};

#[derive(Clone, Default)]
struct ScriptedButtons {
    queue: Rc<RefCell<VecDeque<InputBits>>>,
}

impl RawInputSource for ScriptedButtons {
    type Error = ();

    fn sample(&mut self) -> Result<InputBits, Self::Error> {
        Ok(self.queue.borrow_mut().pop_front().unwrap_or(ALL_RELEASED))
    }
}

struct FailingInput;

impl RawInputSource for FailingInput {
    type Error = ();

    fn sample(&mut self) -> Result<InputBits, Self::Error> {
        Err(())
    }
}

struct ScriptedTelemetry {
    samples: VecDeque<TelemetrySample>,
}

impl TelemetrySource for ScriptedTelemetry {
    fn try_receive(&mut self) -> Option<TelemetrySample> {
        self.samples.pop_front()
    }
}

type TestApp<'a> = ShellApp<StaticCatalog<'a>, MemoryConfig, WidgetArena<256>, ScriptedButtons>;

struct Harness<'a> {
    app: TestApp<'a>,
    buttons: ScriptedButtons,
    now: u32,
}

impl<'a> Harness<'a> {
    fn new(catalog: StaticCatalog<'a>) -> Self {
        Self::with_config(catalog, MemoryConfig::new())
    }

    fn with_config(catalog: StaticCatalog<'a>, config: MemoryConfig) -> Self {
        let buttons = ScriptedButtons::default();
        let app = ShellApp::new(
            catalog,
            config,
            WidgetArena::new(),
            buttons.clone(),
            ShellConfig::default(),
        )
        .unwrap();
        Self {
            app,
            buttons,
            now: 0,
        }
    }

    /// One debounced press, spaced past the debounce window.
    fn press(&mut self, button: Button) -> TickResult {
        self.buttons
            .queue
            .borrow_mut()
            .push_back(button.press(ALL_RELEASED, true));
        self.now += 10;
        self.app.tick(self.now)
    }

    fn press_n(&mut self, button: Button, count: usize) {
        for _ in 0..count {
            self.press(button);
        }
    }

    fn commands(&mut self) -> Vec<ModeMessage> {
        core::iter::from_fn(|| self.app.take_command()).collect()
    }

    fn top_tags(&self) -> Vec<ItemTag> {
        self.app
            .scopes
            .top()
            .map(|scope| scope.items().iter().map(|entry| entry.tag).collect())
            .unwrap_or_default()
    }

    fn focused_label(&self) -> std::string::String {
        let mut label = std::string::String::new();
        self.app
            .with_view(|view| label.push_str(view.focused_label.unwrap_or("")));
        label
    }
}

fn nes_catalog() -> StaticCatalog<'static> {
    StaticCatalog::new()
        .with_games(Console::Nes, &["mario.nes", "zelda.nes"])
        .with_save(Console::Nes, "zelda.nes")
        .with_apps(&["paint", "music"])
        .with_firmware(&["microbyte-v2.bin"])
}

/// Root -> Emulators -> NES -> zelda.nes options.
fn open_zelda_options(h: &mut Harness<'_>) {
    h.press(Button::A);
    h.press(Button::A);
    h.press(Button::Down);
    h.press(Button::A);
}

#[test]
fn starts_at_root_with_three_tiles() {
    let h = Harness::new(nes_catalog());

    assert_eq!(h.app.scope_depth(), 1);
    assert_eq!(h.app.nav_state(), NavState::Root);
    assert_eq!(
        h.top_tags(),
        RootTile::ALL.map(ItemTag::Tile).to_vec()
    );
    assert_eq!(h.app.focused_tag(), Some(ItemTag::Tile(RootTile::Emulators)));
    assert_eq!(h.app.toolkit().live_count(), 3);
}

#[test]
fn first_tick_requests_render_then_idles() {
    let mut h = Harness::new(nes_catalog());
    assert_eq!(h.app.tick(0), TickResult::RenderRequested);
    assert_eq!(h.app.tick(1), TickResult::NoRender);
}

#[test]
fn left_right_cycle_tabs_clamped_at_root() {
    let mut h = Harness::new(nes_catalog());

    h.press_n(Button::Right, 4);
    assert_eq!(h.app.tab(), 2);
    assert_eq!(h.app.toolkit().active_tab(), 2);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::Tile(RootTile::Configuration))
    );

    h.press(Button::Left);
    assert_eq!(h.app.tab(), 1);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::Tile(RootTile::ExternalApps))
    );

    h.press_n(Button::Left, 3);
    assert_eq!(h.app.tab(), 0);
}

#[test]
fn up_down_at_root_keep_tab_in_step_with_focus() {
    let mut h = Harness::new(nes_catalog());

    h.press(Button::Down);
    assert_eq!(h.app.tab(), 1);
    assert_eq!(h.app.toolkit().active_tab(), 1);

    h.press(Button::Right);
    assert_eq!(h.app.tab(), 2);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::Tile(RootTile::Configuration))
    );
}

#[test]
fn nested_left_right_leave_tab_alone() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::A);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Consoles));

    h.press_n(Button::Right, 2);
    h.press(Button::Left);

    assert_eq!(h.app.tab(), 0);
    assert_eq!(h.app.toolkit().active_tab(), 0);
    assert_eq!(h.app.focused_tag(), Some(ItemTag::Console(Console::Nes)));
}

#[test]
fn bouncing_down_press_moves_focus_once() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::A);
    let down = Button::Down.press(ALL_RELEASED, true);

    for (offset, bits) in [(0, down), (1, ALL_RELEASED), (2, ALL_RELEASED), (4, down)] {
        h.buttons.queue.borrow_mut().push_back(bits);
        h.app.tick(h.now + 20 + offset);
    }

    assert_eq!(h.app.focused_tag(), Some(ItemTag::Console(Console::GameBoy)));
}

#[test]
fn empty_console_opens_dialog_and_cancel_restores_list() {
    let mut h = Harness::new(StaticCatalog::new());
    h.press(Button::A);
    let consoles = h.top_tags();
    let live_before = h.app.toolkit().live_count();

    h.press(Button::A);
    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Empty(EmptyReason::NoGames))
    );
    assert_eq!(h.app.nav_state(), NavState::Modal);
    assert_eq!(h.top_tags(), [ItemTag::Dismiss]);
    h.app
        .with_view(|view| assert_eq!(view.body, Some("No games available.")));

    h.press(Button::B);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Consoles));
    assert_eq!(h.top_tags(), consoles);
    assert_eq!(h.app.scopes.focused_index(), Some(0));
    assert_eq!(h.focused_label(), "NES");
    assert_eq!(h.app.toolkit().live_count(), live_before);
}

#[test]
fn cancel_at_root_is_a_no_op() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::B, 3);
    assert_eq!(h.app.scope_depth(), 1);
    assert!(h.commands().is_empty());
}

#[test]
fn game_without_save_offers_new_game_only() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::A);
    h.press(Button::A);
    h.press(Button::A);

    assert_eq!(h.app.top_scope(), Some(ScopeKind::GameOptions(Console::Nes)));
    assert_eq!(h.app.nav_state(), NavState::Options);
    assert_eq!(h.top_tags(), [ItemTag::GameOption(GameOption::NewGame)]);
}

#[test]
fn new_game_sends_launch_and_opens_game_menu() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    assert_eq!(h.top_tags().len(), 3);

    h.press(Button::A);

    let commands = h.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].opcode, ModeOpcode::LaunchGame);
    assert_eq!(commands[0].console, Some(Console::Nes));
    assert_eq!(commands[0].item_name.as_str(), "zelda.nes");
    assert!(!commands[0].resume);
    assert!(commands[0].active);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::OnGame(Console::Nes)));
}

#[test]
fn resume_game_sets_resume_flag() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    h.press(Button::Down);
    h.press(Button::A);

    let commands = h.commands();
    assert_eq!(commands[0].opcode, ModeOpcode::LaunchGame);
    assert!(commands[0].resume);
}

#[test]
fn delete_save_trims_options_in_place() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    let depth = h.app.scope_depth();

    h.press_n(Button::Down, 2);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::GameOption(GameOption::DeleteSave))
    );
    h.press(Button::A);

    assert_eq!(h.app.scope_depth(), depth);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::GameOptions(Console::Nes)));
    assert_eq!(h.top_tags(), [ItemTag::GameOption(GameOption::NewGame)]);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::GameOption(GameOption::NewGame))
    );
    assert_eq!(h.app.storage().save_count(), 0);
    assert!(h.commands().is_empty());
}

#[test]
fn game_menu_cancel_resumes_and_keeps_overlay() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    h.press(Button::A);
    h.commands();

    h.press(Button::B);

    let commands = h.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].opcode, ModeOpcode::ResumeGame);
    assert!(!commands[0].active);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::OnGame(Console::Nes)));
}

#[test]
fn game_menu_save_and_exit() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    h.press(Button::A);
    h.commands();

    h.press(Button::Down);
    h.press(Button::A);
    let save = h.commands();
    assert_eq!(save[0].opcode, ModeOpcode::SaveGame);
    assert_eq!(save[0].console_id(), Console::Nes.id());

    h.press_n(Button::Down, 3);
    h.press(Button::A);
    let exit = h.commands();
    assert_eq!(exit[0].opcode, ModeOpcode::ExitToMenu);
    assert_eq!(h.app.scope_depth(), 1);
    assert_eq!(h.app.focused_tag(), Some(ItemTag::Tile(RootTile::Emulators)));
    assert_eq!(h.app.toolkit().live_count(), 3);
}

#[test]
fn game_menu_volume_slider_writes_through() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    h.press(Button::A);
    h.press_n(Button::Down, 2);
    h.press(Button::A);

    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Slider(SliderTarget::Volume))
    );
    h.press(Button::Right);
    assert_eq!(
        h.app.config_store().value(ConfigKey::Volume),
        MemoryConfig::DEFAULT_VOLUME + 5
    );

    h.press(Button::B);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::OnGame(Console::Nes)));
}

#[test]
fn app_launch_overlay_ignores_cancel_until_completion() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::Right);
    h.press(Button::A);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Apps));

    h.press(Button::Down);
    h.press(Button::A);
    let commands = h.commands();
    assert_eq!(commands[0].opcode, ModeOpcode::LaunchExternalApp);
    assert_eq!(commands[0].item_name.as_str(), "music");
    assert_eq!(h.app.top_scope(), Some(ScopeKind::AppLaunch));

    h.press(Button::B);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::AppLaunch));

    h.app.on_execution_complete();
    assert_eq!(h.app.scope_depth(), 1);
    assert_eq!(
        h.app.focused_tag(),
        Some(ItemTag::Tile(RootTile::ExternalApps))
    );
    assert_eq!(h.app.tab(), 1);
    assert_eq!(h.app.toolkit().live_count(), 3);
}

#[test]
fn no_apps_opens_empty_dialog() {
    let mut h = Harness::new(StaticCatalog::new());
    h.press(Button::Right);
    h.press(Button::A);
    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Empty(EmptyReason::NoApps))
    );
}

#[test]
fn missing_card_reports_storage_unavailable() {
    let mut h = Harness::new(nes_catalog().unmounted());
    h.press(Button::A);
    h.press(Button::A);
    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Empty(EmptyReason::StorageUnavailable))
    );

    h.press(Button::A);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Consoles));
}

#[test]
fn firmware_flash_sends_command_and_opens_overlay() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press(Button::Down);
    h.press(Button::A);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Firmware));

    h.press(Button::A);
    let commands = h.commands();
    assert_eq!(commands[0].opcode, ModeOpcode::FlashFirmware);
    assert_eq!(commands[0].item_name.as_str(), "microbyte-v2.bin");
    assert_eq!(h.app.top_scope(), Some(ScopeKind::FirmwareFlash));
}

#[test]
fn color_mode_toggles_theme_in_place() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press_n(Button::Down, 3);
    h.press(Button::A);

    assert_eq!(h.app.top_scope(), Some(ScopeKind::Settings));
    assert_eq!(h.app.toolkit().theme(), Theme::Dark);
    assert_eq!(
        h.app.config_store().value(ConfigKey::Theme),
        Theme::Dark.raw()
    );
}

#[test]
fn stored_theme_is_applied_on_start() {
    let h = Harness::with_config(
        nes_catalog(),
        MemoryConfig::new().with(ConfigKey::Theme, Theme::Dark.raw()),
    );
    assert_eq!(h.app.toolkit().theme(), Theme::Dark);
}

#[test]
fn button_state_save_label_follows_state() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press_n(Button::Down, 5);
    assert_eq!(h.focused_label(), "Enable Button State Save");

    h.press(Button::A);
    assert_eq!(h.focused_label(), "Disable Button State Save");
    assert_eq!(h.app.config_store().value(ConfigKey::ButtonStateSave), 1);
}

#[test]
fn brightness_slider_clamps_and_persists() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press_n(Button::Down, 2);
    h.press(Button::A);
    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Slider(SliderTarget::Brightness))
    );

    h.press_n(Button::Right, 10);
    assert_eq!(h.app.config_store().value(ConfigKey::Brightness), SLIDER_MAX);
    h.press_n(Button::Left, 2);

    let mut slider = None;
    h.app.with_view(|view| slider = view.slider_value);
    assert_eq!(slider, Some(90));
    assert_eq!(h.app.config_store().value(ConfigKey::Brightness), 90);

    h.press(Button::A);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::Settings));
}

#[test]
fn sd_card_dialog_without_card() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press_n(Button::Down, 7);
    h.press(Button::A);

    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Info(InfoDialog::SdCard))
    );
    h.app.with_view(|view| {
        assert_eq!(view.body, Some("SD card not available"));
        assert!(view.card.is_none());
    });
}

#[test]
fn menu_button_requests_resume() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::Menu);

    let commands = h.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].opcode, ModeOpcode::ResumeGame);
    assert_eq!(h.app.scope_depth(), 1);
}

#[test]
fn full_outbox_drops_newest() {
    let mut h = Harness::new(nes_catalog());
    h.press_n(Button::Menu, MODE_QUEUE_DEPTH + 2);
    assert_eq!(h.app.pending_commands(), MODE_QUEUE_DEPTH);
}

#[test]
fn input_errors_are_skipped() {
    let mut app = ShellApp::new(
        nes_catalog(),
        MemoryConfig::new(),
        WidgetArena::<64>::new(),
        FailingInput,
        ShellConfig::default(),
    )
    .unwrap();

    app.tick(0);
    assert_eq!(app.tick(10), TickResult::NoRender);
    assert_eq!(app.scope_depth(), 1);
}

#[test]
fn low_battery_alert_is_one_shot_until_recovery() {
    let mut h = Harness::new(nes_catalog());
    let level = |percentage| TelemetrySample {
        voltage_mv: 3500,
        percentage,
    };
    let mut source = ScriptedTelemetry {
        samples: [level(50), level(8), level(7), level(7), level(30), level(5)].into(),
    };
    let period = h.app.config().telemetry_period_ticks;
    let mut poll = |h: &mut Harness<'_>, step: u32| h.app.poll_telemetry(&mut source, step * period);

    poll(&mut h, 0);
    assert_eq!(h.app.scope_depth(), 1);

    poll(&mut h, 1);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::BatteryAlert));
    poll(&mut h, 2);
    assert_eq!(h.app.scope_depth(), 2);

    h.press(Button::B);
    poll(&mut h, 3);
    assert_eq!(h.app.scope_depth(), 1);

    poll(&mut h, 4);
    poll(&mut h, 5);
    assert_eq!(h.app.top_scope(), Some(ScopeKind::BatteryAlert));
}

#[test]
fn fault_and_usb_samples_never_alert() {
    let mut h = Harness::new(nes_catalog());
    let mut source = ScriptedTelemetry {
        samples: [
            TelemetrySample::fault(3400),
            TelemetrySample {
                voltage_mv: 4200,
                percentage: 5,
            },
        ]
        .into(),
    };

    h.app.poll_telemetry(&mut source, 0);
    let mut indicator = None;
    h.app.with_view(|view| indicator = view.battery);
    assert_eq!(indicator, Some(BatteryIndicator::Fault));

    h.app.poll_telemetry(&mut source, 100);
    h.app.with_view(|view| indicator = view.battery);
    assert_eq!(indicator, Some(BatteryIndicator::ExternalPower));
    assert_eq!(h.app.scope_depth(), 1);
}

#[test]
fn telemetry_is_rate_limited() {
    let mut h = Harness::new(nes_catalog());
    let mut source = ScriptedTelemetry {
        samples: [TelemetrySample::from_millivolts(3900); 3].into(),
    };

    h.app.poll_telemetry(&mut source, 0);
    h.app.poll_telemetry(&mut source, 10);
    h.app.poll_telemetry(&mut source, 99);
    assert_eq!(source.samples.len(), 2);
    assert!(h.app.battery().is_some());
}

#[test]
fn battery_info_dialog_reports_charged() {
    let mut h = Harness::new(nes_catalog());
    let mut source = ScriptedTelemetry {
        samples: [TelemetrySample::from_millivolts(4170)].into(),
    };
    h.app.poll_telemetry(&mut source, 0);

    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press_n(Button::Down, 6);
    h.press(Button::A);

    assert_eq!(
        h.app.top_scope(),
        Some(ScopeKind::Info(InfoDialog::Battery))
    );
    h.app.with_view(|view| assert_eq!(view.body, Some("Charged")));
}

#[test]
fn full_round_trip_releases_every_widget() {
    let mut h = Harness::new(nes_catalog());
    open_zelda_options(&mut h);
    h.press_n(Button::B, 3);
    assert_eq!(h.app.scope_depth(), 1);

    h.press_n(Button::Right, 2);
    h.press(Button::A);
    h.press(Button::A);
    h.press_n(Button::B, 2);

    assert_eq!(h.app.scope_depth(), 1);
    assert_eq!(h.app.toolkit().live_count(), 3);
}

#[test]
fn view_reports_navigation_snapshot() {
    let mut h = Harness::new(nes_catalog());
    h.press(Button::A);
    h.press(Button::Down);

    h.app.with_view(|view| {
        assert_eq!(view.nav, NavState::List);
        assert_eq!(view.scope, Some(ScopeKind::Consoles));
        assert_eq!(view.depth, 2);
        assert_eq!(view.title, "Emulators");
        assert_eq!(view.item_count, Console::ALL.len());
        assert_eq!(view.focused_index, Some(1));
        assert_eq!(view.focused_label, Some("GameBoy"));
        assert_eq!(view.theme, Theme::Light);
    });
}
