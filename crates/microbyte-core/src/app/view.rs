/// Borrowed snapshot of what the shell shows right now.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShellView<'a> {
    pub nav: NavState,
    pub scope: Option<ScopeKind>,
    pub depth: usize,
    pub tab: u8,
    pub title: &'a str,
    pub body: Option<&'static str>,
    pub focused_index: Option<usize>,
    pub focused_label: Option<&'a str>,
    pub item_count: usize,
    pub slider_value: Option<u8>,
    pub battery: Option<BatteryIndicator>,
    pub card: Option<crate::catalog::CardInfo>,
    pub theme: Theme,
}

impl<SD, CFG, TK, IN> ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    pub fn with_view<F>(&self, f: F)
    where
        F: FnOnce(ShellView<'_>),
    {
        let scope = self.scopes.top_kind();
        let top = self.scopes.top();
        let card = match scope {
            Some(ScopeKind::Info(InfoDialog::SdCard)) => self.storage.card_info(),
            _ => None,
        };

        f(ShellView {
            nav: self.nav_state(),
            scope,
            depth: self.scopes.depth(),
            tab: self.keymap.tab(),
            title: scope.map_or("", |kind| self.scope_title(kind)),
            body: scope.and_then(|kind| self.scope_body(kind)),
            focused_index: self.scopes.focused_index(),
            focused_label: self.scopes.focused_tag().map(|tag| self.item_label(tag)),
            item_count: top.map_or(0, |scope| scope.items().len()),
            slider_value: match scope {
                Some(ScopeKind::Slider(_)) => Some(self.slider_value),
                _ => None,
            },
            battery: self.battery.map(|sample| sample.indicator()),
            card,
            theme: self.theme,
        });
    }

    /// Display text of an item, derived from its tag rather than its widget.
    pub fn item_label(&self, tag: ItemTag) -> &str {
        match tag {
            ItemTag::Tile(RootTile::Emulators) => "Emulators",
            ItemTag::Tile(RootTile::ExternalApps) => "External Apps",
            ItemTag::Tile(RootTile::Configuration) => "Configuration",
            ItemTag::Console(console) => console.label(),
            ItemTag::Entry(index) => self.listing.get(index as usize).unwrap_or(""),
            ItemTag::GameOption(GameOption::NewGame) => "New Game",
            ItemTag::GameOption(GameOption::ResumeGame) => "Resume Game",
            ItemTag::GameOption(GameOption::DeleteSave) => "Delete Save Data",
            ItemTag::OnGame(OnGameOption::Resume) => "Resume Game",
            ItemTag::OnGame(OnGameOption::Save) => "Save Game",
            ItemTag::OnGame(OnGameOption::Volume) => "Volume",
            ItemTag::OnGame(OnGameOption::Brightness) => "Brightness",
            ItemTag::OnGame(OnGameOption::Exit) => "Exit",
            ItemTag::Setting(option) => self.setting_label(option),
            ItemTag::Slider(SliderTarget::Volume) => "Volume",
            ItemTag::Slider(SliderTarget::Brightness) => "Brightness",
            ItemTag::Dismiss => "OK",
        }
    }

    fn setting_label(&self, option: SettingOption) -> &'static str {
        match option {
            SettingOption::About => "About this device",
            SettingOption::UpdateFirmware => "Update firmware",
            SettingOption::Brightness => "Brightness",
            SettingOption::ColorMode => "GUI Color Mode",
            SettingOption::Volume => "Volume",
            SettingOption::ButtonStateSave if self.button_state_save => {
                "Disable Button State Save"
            }
            SettingOption::ButtonStateSave => "Enable Button State Save",
            SettingOption::BatteryStatus => "Battery Status",
            SettingOption::SdCardStatus => "SD card Status",
        }
    }

    fn scope_title(&self, kind: ScopeKind) -> &str {
        match kind {
            ScopeKind::Root => "microByte",
            ScopeKind::Consoles => "Emulators",
            ScopeKind::Games(console) => console.label(),
            ScopeKind::GameOptions(_) | ScopeKind::AppLaunch | ScopeKind::FirmwareFlash => {
                self.selected_name().unwrap_or("")
            }
            ScopeKind::OnGame(_) => "Game Menu",
            ScopeKind::Apps => "External Apps",
            ScopeKind::Settings => "Configuration",
            ScopeKind::Firmware => "Update firmware",
            ScopeKind::Slider(SliderTarget::Volume) => "Volume",
            ScopeKind::Slider(SliderTarget::Brightness) => "Brightness",
            ScopeKind::Empty(_) => "Oops!",
            ScopeKind::Info(InfoDialog::About) => "microByte",
            ScopeKind::Info(InfoDialog::Battery) => "Battery Status",
            ScopeKind::Info(InfoDialog::SdCard) => "SD Card Information",
            ScopeKind::BatteryAlert => "Battery Alert",
        }
    }

    fn scope_body(&self, kind: ScopeKind) -> Option<&'static str> {
        let body = match kind {
            ScopeKind::Empty(EmptyReason::NoGames) => "No games available.",
            ScopeKind::Empty(EmptyReason::NoApps) => "No apps available.",
            ScopeKind::Empty(EmptyReason::NoFirmware) => "No firmware images available.",
            ScopeKind::Empty(EmptyReason::StorageUnavailable) => "SD card not available",
            ScopeKind::AppLaunch => "Loading:",
            ScopeKind::FirmwareFlash => "Firmware update:",
            ScopeKind::BatteryAlert => "Battery level below 10%",
            ScopeKind::Info(InfoDialog::About) => "microByte handheld console",
            ScopeKind::Info(InfoDialog::Battery) => match self.battery {
                None => "Battery status unavailable",
                Some(sample) if sample.is_fault() => "Battery status unavailable",
                Some(sample) if sample.is_charged() => "Charged",
                Some(_) => "Discharging",
            },
            ScopeKind::Info(InfoDialog::SdCard) if self.storage.card_info().is_none() => {
                "SD card not available"
            }
            _ => return None,
        };
        Some(body)
    }
}
