impl<SD, CFG, TK, IN> ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    fn handle_action(&mut self, kind: ScopeKind, tag: Option<ItemTag>, action: UiAction) {
        debug!(
            "ui-nav: action scope={:?} tag={:?} action={:?}",
            kind, tag, action
        );

        match kind {
            ScopeKind::Root => self.on_root(tag, action),
            ScopeKind::Consoles => self.on_consoles(tag, action),
            ScopeKind::Games(console) => self.on_games(console, tag, action),
            ScopeKind::GameOptions(console) => self.on_game_options(console, tag, action),
            ScopeKind::OnGame(console) => self.on_game_menu(console, tag, action),
            ScopeKind::Apps => self.on_apps(tag, action),
            ScopeKind::Settings => self.on_settings(tag, action),
            ScopeKind::Firmware => self.on_firmware(tag, action),
            ScopeKind::Slider(target) => self.on_slider(target, action),
            // Closed by `on_execution_complete` only.
            ScopeKind::AppLaunch | ScopeKind::FirmwareFlash => {}
            ScopeKind::Empty(_) | ScopeKind::Info(_) | ScopeKind::BatteryAlert => {
                if matches!(action, UiAction::Activate | UiAction::Cancel) {
                    self.close_top();
                }
            }
        }
    }

    fn on_root(&mut self, tag: Option<ItemTag>, action: UiAction) {
        let (UiAction::Activate, Some(ItemTag::Tile(tile))) = (action, tag) else {
            return;
        };

        let _ = match tile {
            RootTile::Emulators => self.open_consoles(),
            RootTile::ExternalApps => self.open_listing(Category::Apps),
            RootTile::Configuration => self.open_settings(),
        };
    }

    fn on_consoles(&mut self, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::Console(console))) => {
                let _ = self.open_listing(Category::Games(console));
            }
            (UiAction::Cancel, _) => self.close_top(),
            _ => {}
        }
    }

    fn on_games(&mut self, console: Console, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::Entry(index))) => {
                self.selected_entry = Some(index);
                let _ = self.open_game_options(console);
            }
            (UiAction::Cancel, _) => {
                self.selected_entry = None;
                self.close_top();
            }
            _ => {}
        }
    }

    fn on_game_options(&mut self, console: Console, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::GameOption(option))) => match option {
                GameOption::NewGame => self.launch_selected_game(console, false),
                GameOption::ResumeGame => self.launch_selected_game(console, true),
                GameOption::DeleteSave => self.delete_selected_save(console),
            },
            (UiAction::Cancel, _) => self.close_top(),
            _ => {}
        }
    }

    fn launch_selected_game(&mut self, console: Console, resume: bool) {
        let Some(message) = self
            .selected_name()
            .map(|name| ModeMessage::launch_game(console, name, resume))
        else {
            return;
        };

        info!(
            "ui-nav: launch game console={:?} name={} resume={}",
            console,
            message.item_name.as_str(),
            resume
        );
        self.queue_command(message);
        let _ = self.open_on_game(console);
    }

    /// Drop the save and the options that depended on it, keeping the dialog.
    fn delete_selected_save(&mut self, console: Console) {
        let Some(name) = self
            .selected_entry
            .and_then(|index| self.listing.get(index as usize))
        else {
            return;
        };

        if self.storage.delete_save(name, console).is_err() {
            warn!("ui-nav: delete save failed console={:?}", console);
            return;
        }

        for option in [GameOption::ResumeGame, GameOption::DeleteSave] {
            if let Some(item) = self.find_item(ItemTag::GameOption(option)) {
                self.scopes.remove_item(&mut self.toolkit, item);
            }
        }
        self.pending_redraw = true;
    }

    fn on_game_menu(&mut self, console: Console, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::OnGame(option))) => match option {
                OnGameOption::Resume => self.queue_command(ModeMessage::resume_game()),
                OnGameOption::Save => self.queue_command(ModeMessage::save_game(console)),
                OnGameOption::Volume => {
                    let _ = self.open_slider(SliderTarget::Volume);
                }
                OnGameOption::Brightness => {
                    let _ = self.open_slider(SliderTarget::Brightness);
                }
                OnGameOption::Exit => {
                    self.queue_command(ModeMessage::exit_to_menu());
                    self.scopes.unwind_to_root(&mut self.toolkit);
                    self.selected_entry = None;
                    self.pending_redraw = true;
                }
            },
            // The overlay stays; the executor closes its in-game menu.
            (UiAction::Cancel, _) => self.queue_command(ModeMessage::resume_game()),
            _ => {}
        }
    }

    fn on_apps(&mut self, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::Entry(index))) => {
                let Some(message) = self.listing.get(index as usize).map(ModeMessage::launch_app)
                else {
                    return;
                };
                info!("ui-nav: launch app name={}", message.item_name.as_str());
                self.selected_entry = Some(index);
                self.queue_command(message);
                let _ = self.open_overlay(ScopeKind::AppLaunch);
            }
            (UiAction::Cancel, _) => self.close_top(),
            _ => {}
        }
    }

    fn on_firmware(&mut self, tag: Option<ItemTag>, action: UiAction) {
        match (action, tag) {
            (UiAction::Activate, Some(ItemTag::Entry(index))) => {
                let Some(message) = self
                    .listing
                    .get(index as usize)
                    .map(ModeMessage::flash_firmware)
                else {
                    return;
                };
                info!("ui-nav: flash firmware name={}", message.item_name.as_str());
                self.selected_entry = Some(index);
                self.queue_command(message);
                let _ = self.open_overlay(ScopeKind::FirmwareFlash);
            }
            (UiAction::Cancel, _) => self.close_top(),
            _ => {}
        }
    }

    fn on_settings(&mut self, tag: Option<ItemTag>, action: UiAction) {
        let option = match (action, tag) {
            (UiAction::Activate, Some(ItemTag::Setting(option))) => option,
            (UiAction::Cancel, _) => {
                self.close_top();
                return;
            }
            _ => return,
        };

        let _ = match option {
            SettingOption::About => self.open_dialog(ScopeKind::Info(InfoDialog::About)),
            SettingOption::BatteryStatus => {
                self.open_dialog(ScopeKind::Info(InfoDialog::Battery))
            }
            SettingOption::SdCardStatus => self.open_dialog(ScopeKind::Info(InfoDialog::SdCard)),
            SettingOption::UpdateFirmware => self.open_listing(Category::Firmware),
            SettingOption::Brightness => self.open_slider(SliderTarget::Brightness),
            SettingOption::Volume => self.open_slider(SliderTarget::Volume),
            SettingOption::ColorMode => {
                self.toggle_theme();
                Ok(())
            }
            SettingOption::ButtonStateSave => {
                self.toggle_button_state_save();
                Ok(())
            }
        };
    }

    fn toggle_theme(&mut self) {
        let theme = self.theme.toggled();
        if self
            .config_store
            .set_config(ConfigKey::Theme, theme.raw())
            .is_err()
        {
            warn!("settings: theme write failed, applying for this session only");
        }
        self.theme = theme;
        self.toolkit.apply_theme(theme);
        debug!("ui-nav: theme={:?}", theme);
        self.pending_redraw = true;
    }

    fn toggle_button_state_save(&mut self) {
        let enabled = !self.button_state_save;
        match self
            .config_store
            .set_config(ConfigKey::ButtonStateSave, enabled as u8)
        {
            Ok(()) => {
                self.button_state_save = enabled;
                debug!("ui-nav: button_state_save={}", enabled);
                self.pending_redraw = true;
            }
            Err(_) => warn!("settings: button state save write failed"),
        }
    }

    fn on_slider(&mut self, target: SliderTarget, action: UiAction) {
        match action {
            UiAction::ValueChanged(value) => {
                self.slider_value = value;
                if let Some(entry) = self.scopes.focused() {
                    self.toolkit.set_value(entry.item, value);
                }
                if self
                    .config_store
                    .set_config(target.config_key(), value)
                    .is_err()
                {
                    warn!("settings: write failed key={:?}", target.config_key());
                }
                self.pending_redraw = true;
            }
            UiAction::Activate | UiAction::Cancel => self.close_top(),
        }
    }
}
