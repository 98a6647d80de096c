impl<SD, CFG, TK, IN> ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    fn process_inputs(&mut self, now_ticks: u32) {
        let raw = match self.input.sample() {
            Ok(raw) => raw,
            Err(_) => {
                warn!("input: raw sample failed");
                return;
            }
        };

        let triggers = self.keymap.poll(raw, now_ticks, self.scopes.depth());
        for trigger in &triggers {
            if let Some(tab) = trigger.tab_switch {
                self.toolkit.activate_tab(tab);
            }
            if trigger.button == Button::Menu {
                self.queue_command(ModeMessage::resume_game());
            }
            if let Some(key) = trigger.key {
                self.route_key(key);
            }
        }
    }

    fn route_key(&mut self, key: LogicalKey) {
        let Some(kind) = self.scopes.top_kind() else {
            return;
        };

        match self.scopes.route(key) {
            Routed::Moved { index } => {
                if kind == ScopeKind::Root {
                    let tab = index as u8;
                    self.keymap.sync_tab(tab);
                    self.toolkit.activate_tab(tab);
                }
                debug!("ui-nav: focus moved scope={:?} index={}", kind, index);
                self.pending_redraw = true;
            }
            Routed::Unchanged | Routed::Ignored => {}
            Routed::Activate(tag) => self.handle_action(kind, Some(tag), UiAction::Activate),
            Routed::Cancel(tag) => self.handle_action(kind, tag, UiAction::Cancel),
            Routed::Adjust { key, tag } => {
                if let ItemTag::Slider(_) = tag {
                    let step = self.config.slider_step;
                    let value = if key == LogicalKey::Right {
                        self.slider_value.saturating_add(step).min(SLIDER_MAX)
                    } else {
                        self.slider_value.saturating_sub(step)
                    };
                    if value != self.slider_value {
                        self.handle_action(kind, Some(tag), UiAction::ValueChanged(value));
                    }
                }
            }
        }
    }
}
