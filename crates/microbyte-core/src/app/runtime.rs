impl<SD, CFG, TK, IN> ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    /// Build the shell with the three main tiles as root scope.
    pub fn new(
        storage: SD,
        mut config_store: CFG,
        mut toolkit: TK,
        input: IN,
        config: ShellConfig,
    ) -> Result<Self, ScopeError> {
        let theme = config_store
            .get_config(ConfigKey::Theme)
            .map(Theme::from_raw)
            .unwrap_or_default();
        let button_state_save = config_store
            .get_config(ConfigKey::ButtonStateSave)
            .map(|raw| raw != 0)
            .unwrap_or(false);
        toolkit.apply_theme(theme);

        let root = build_scope(
            &mut toolkit,
            ScopeKind::Root,
            None,
            WidgetKind::Tile,
            RootTile::ALL.map(ItemTag::Tile),
        )?;
        let first = root.items().first().map(|entry| entry.item);

        let mut scopes = ScopeStack::new();
        scopes.push_scope(&mut toolkit, root, first)?;
        toolkit.activate_tab(0);

        info!(
            "shell: ready theme={:?} button_state_save={}",
            theme, button_state_save
        );

        Ok(Self {
            storage,
            config_store,
            toolkit,
            input,
            keymap: KeyMapper::new(config.keymap()),
            telemetry: TelemetryPoller::new(config.telemetry_period_ticks),
            config,
            scopes,
            listing: Listing::new(),
            selected_entry: None,
            slider_value: 0,
            outbox: Deque::new(),
            battery: None,
            low_battery_latched: false,
            theme,
            button_state_save,
            pending_redraw: true,
        })
    }

    /// One scheduling-loop iteration: sample input, route keys, report redraw.
    pub fn tick(&mut self, now_ticks: u32) -> TickResult {
        self.process_inputs(now_ticks);

        if self.pending_redraw {
            self.pending_redraw = false;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    /// Read at most one battery sample when the telemetry period is due.
    pub fn poll_telemetry<S: TelemetrySource + ?Sized>(&mut self, source: &mut S, now_ticks: u32) {
        let Some(sample) = self.telemetry.poll(source, now_ticks) else {
            return;
        };

        if self.battery != Some(sample) {
            self.pending_redraw = true;
        }
        self.battery = Some(sample);

        let external = sample.indicator() == BatteryIndicator::ExternalPower;
        let low = !sample.is_fault()
            && !external
            && sample.percentage < self.config.low_battery_percent;

        if !low {
            self.low_battery_latched = false;
            return;
        }
        if self.low_battery_latched {
            return;
        }

        self.low_battery_latched = true;
        warn!(
            "battery: low level percent={} voltage_mv={}",
            sample.percentage, sample.voltage_mv
        );
        if self.scopes.top_kind() != Some(ScopeKind::BatteryAlert) {
            let _ = self.open_dialog(ScopeKind::BatteryAlert);
        }
    }

    /// Next staged command for the dispatcher, oldest first.
    pub fn take_command(&mut self) -> Option<ModeMessage> {
        self.outbox.pop_front()
    }

    /// The execution subsystem handed control back to the shell.
    pub fn on_execution_complete(&mut self) {
        info!(
            "shell: execution complete, unwinding from depth={}",
            self.scopes.depth()
        );
        self.scopes.unwind_to_root(&mut self.toolkit);
        self.selected_entry = None;
        self.pending_redraw = true;
    }

    pub fn config(&self) -> ShellConfig {
        self.config
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn top_scope(&self) -> Option<ScopeKind> {
        self.scopes.top_kind()
    }

    pub fn focused_tag(&self) -> Option<ItemTag> {
        self.scopes.focused_tag()
    }

    pub fn nav_state(&self) -> NavState {
        self.scopes
            .top_kind()
            .map_or(NavState::Root, ScopeKind::nav_state)
    }

    pub fn tab(&self) -> u8 {
        self.keymap.tab()
    }

    pub fn battery(&self) -> Option<TelemetrySample> {
        self.battery
    }

    pub fn pending_commands(&self) -> usize {
        self.outbox.len()
    }

    pub fn toolkit(&self) -> &TK {
        &self.toolkit
    }

    pub fn storage(&self) -> &SD {
        &self.storage
    }

    pub fn config_store(&self) -> &CFG {
        &self.config_store
    }

    fn queue_command(&mut self, message: ModeMessage) {
        let opcode = message.opcode;
        match self.outbox.push_back(message) {
            Ok(()) => debug!("ui-nav: staged opcode={:?}", opcode),
            Err(_) => warn!("ui-nav: command outbox full, dropped opcode={:?}", opcode),
        }
    }
}
