/// Create a container (when `container_kind` is set) plus one child per tag.
///
/// Widgets created before a failure are handed back to the toolkit.
fn build_scope<TK, I>(
    toolkit: &mut TK,
    kind: ScopeKind,
    container_kind: Option<WidgetKind>,
    item_kind: WidgetKind,
    tags: I,
) -> Result<FocusScope<ScopeKind, ItemTag>, ScopeError>
where
    TK: Toolkit,
    I: IntoIterator<Item = ItemTag>,
{
    let container = match container_kind {
        Some(container_kind) => Some(
            toolkit
                .create(container_kind, None)
                .map_err(|_| ScopeError::Toolkit)?,
        ),
        None => None,
    };
    let mut scope = FocusScope::new(kind, container);

    for tag in tags {
        let item = match toolkit.create(item_kind, container) {
            Ok(item) => item,
            Err(_) => {
                scope.release(toolkit);
                return Err(ScopeError::Toolkit);
            }
        };
        if let Err(err) = scope.push_item(item, tag) {
            toolkit.destroy(item);
            scope.release(toolkit);
            return Err(err);
        }
    }

    Ok(scope)
}

impl<SD, CFG, TK, IN> ShellApp<SD, CFG, TK, IN>
where
    SD: ItemEnumerator + SaveStore,
    CFG: ConfigStore,
    TK: Toolkit,
    IN: RawInputSource,
{
    fn open_scope<I>(
        &mut self,
        kind: ScopeKind,
        container_kind: WidgetKind,
        item_kind: WidgetKind,
        tags: I,
        hide_parent: bool,
    ) -> Result<(), ScopeError>
    where
        I: IntoIterator<Item = ItemTag>,
    {
        let result = build_scope(
            &mut self.toolkit,
            kind,
            Some(container_kind),
            item_kind,
            tags,
        )
        .and_then(|scope| {
            let scope = if hide_parent {
                scope.hiding_parent()
            } else {
                scope
            };
            let first = scope.items().first().map(|entry| entry.item);
            self.scopes.push_scope(&mut self.toolkit, scope, first)
        });

        match result {
            Ok(()) => {
                debug!(
                    "ui-nav: opened scope={:?} state={:?} depth={}",
                    kind,
                    kind.nav_state(),
                    self.scopes.depth()
                );
                self.pending_redraw = true;
            }
            Err(err) => error!("ui-nav: failed to open scope={:?} err={:?}", kind, err),
        }
        result
    }

    /// Single-button message box on top of the current screen.
    fn open_dialog(&mut self, kind: ScopeKind) -> Result<(), ScopeError> {
        self.open_scope(
            kind,
            WidgetKind::Dialog,
            WidgetKind::ListButton,
            [ItemTag::Dismiss],
            false,
        )
    }

    /// Overlay without navigable items; closes on execution completion.
    fn open_overlay(&mut self, kind: ScopeKind) -> Result<(), ScopeError> {
        self.open_scope(kind, WidgetKind::Overlay, WidgetKind::ListButton, [], true)
    }

    fn open_consoles(&mut self) -> Result<(), ScopeError> {
        self.open_scope(
            ScopeKind::Consoles,
            WidgetKind::List,
            WidgetKind::ListButton,
            Console::ALL.map(ItemTag::Console),
            true,
        )
    }

    fn open_settings(&mut self) -> Result<(), ScopeError> {
        self.open_scope(
            ScopeKind::Settings,
            WidgetKind::List,
            WidgetKind::ListButton,
            SettingOption::ALL.map(ItemTag::Setting),
            true,
        )
    }

    /// Enumerate `category` and show its entries, or the matching empty dialog.
    fn open_listing(&mut self, category: Category) -> Result<(), ScopeError> {
        let (kind, empty) = match category {
            Category::Games(console) => (ScopeKind::Games(console), EmptyReason::NoGames),
            Category::Apps => (ScopeKind::Apps, EmptyReason::NoApps),
            Category::Firmware => (ScopeKind::Firmware, EmptyReason::NoFirmware),
        };

        if self
            .storage
            .list_items(category, &mut self.listing)
            .is_err()
        {
            warn!("ui-nav: enumeration failed category={:?}", category);
            self.listing.reset(category);
            return self.open_dialog(ScopeKind::Empty(EmptyReason::StorageUnavailable));
        }

        if self.listing.is_empty() {
            debug!("ui-nav: empty enumeration category={:?}", category);
            return self.open_dialog(ScopeKind::Empty(empty));
        }
        if self.listing.was_truncated() {
            warn!(
                "ui-nav: enumeration capped category={:?} cap={}",
                category,
                category.cap()
            );
        }

        let count = self.listing.len() as u16;
        self.open_scope(
            kind,
            WidgetKind::List,
            WidgetKind::ListButton,
            (0..count).map(ItemTag::Entry),
            true,
        )
    }

    fn open_game_options(&mut self, console: Console) -> Result<(), ScopeError> {
        let Some(name) = self
            .selected_entry
            .and_then(|index| self.listing.get(index as usize))
        else {
            return Ok(());
        };
        let has_save = self.storage.has_save(name, console);
        debug!(
            "ui-nav: game options console={:?} has_save={}",
            console, has_save
        );

        let options: &[GameOption] = if has_save {
            &[
                GameOption::NewGame,
                GameOption::ResumeGame,
                GameOption::DeleteSave,
            ]
        } else {
            &[GameOption::NewGame]
        };
        self.open_scope(
            ScopeKind::GameOptions(console),
            WidgetKind::Dialog,
            WidgetKind::ListButton,
            options.iter().copied().map(ItemTag::GameOption),
            false,
        )
    }

    fn open_on_game(&mut self, console: Console) -> Result<(), ScopeError> {
        self.open_scope(
            ScopeKind::OnGame(console),
            WidgetKind::Overlay,
            WidgetKind::ListButton,
            OnGameOption::ALL.map(ItemTag::OnGame),
            true,
        )
    }

    fn open_slider(&mut self, target: SliderTarget) -> Result<(), ScopeError> {
        let value = match self.config_store.get_config(target.config_key()) {
            Ok(value) => value.min(SLIDER_MAX),
            Err(_) => {
                warn!("settings: read failed key={:?}", target.config_key());
                FALLBACK_SLIDER_VALUE
            }
        };

        self.open_scope(
            ScopeKind::Slider(target),
            WidgetKind::Dialog,
            WidgetKind::Slider,
            [ItemTag::Slider(target)],
            false,
        )?;
        self.slider_value = value;
        if let Some(entry) = self.scopes.focused() {
            self.toolkit.set_value(entry.item, value);
        }
        Ok(())
    }

    /// Close the top scope and give focus back to what was underneath.
    fn close_top(&mut self) {
        if let Some(kind) = self.scopes.pop_scope(&mut self.toolkit) {
            debug!(
                "ui-nav: closed scope={:?} back to={:?}",
                kind,
                self.scopes.top_kind()
            );
            self.pending_redraw = true;
        }
    }

    fn find_item(&self, tag: ItemTag) -> Option<NavigableItem> {
        self.scopes
            .top()?
            .items()
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.item)
    }

    fn selected_name(&self) -> Option<&str> {
        self.selected_entry
            .and_then(|index| self.listing.get(index as usize))
    }
}
