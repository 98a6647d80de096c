//! Fixed-capacity widget arena with generation-checked handles.

use log::error;

use super::{NavigableItem, Toolkit, WidgetKind};
use crate::settings::Theme;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArenaError {
    Exhausted,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u16,
    live: bool,
    visible: bool,
    kind: WidgetKind,
    parent: Option<NavigableItem>,
    value: u8,
}

impl Slot {
    const EMPTY: Self = Self {
        generation: 0,
        live: false,
        visible: false,
        kind: WidgetKind::Tile,
        parent: None,
        value: 0,
    };
}

/// Headless toolkit that only tracks widget lifetimes and visibility.
#[derive(Debug)]
pub struct WidgetArena<const N: usize> {
    slots: [Slot; N],
    active_tab: u8,
    theme: Theme,
}

impl<const N: usize> WidgetArena<N> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
            active_tab: 0,
            theme: Theme::Light,
        }
    }

    pub fn is_live(&self, item: NavigableItem) -> bool {
        self.slots
            .get(item.slot() as usize)
            .is_some_and(|slot| slot.live && slot.generation == item.generation())
    }

    pub fn is_visible(&self, item: NavigableItem) -> bool {
        self.is_live(item) && self.slot(item).visible
    }

    pub fn kind(&self, item: NavigableItem) -> WidgetKind {
        self.slot(item).kind
    }

    pub fn value(&self, item: NavigableItem) -> u8 {
        self.slot(item).value
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live).count()
    }

    pub fn active_tab(&self) -> u8 {
        self.active_tab
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn slot(&self, item: NavigableItem) -> &Slot {
        let slot = &self.slots[item.slot() as usize];
        assert!(
            slot.live && slot.generation == item.generation(),
            "stale widget handle {:?}",
            item
        );
        slot
    }

    fn slot_mut(&mut self, item: NavigableItem) -> &mut Slot {
        let slot = &mut self.slots[item.slot() as usize];
        assert!(
            slot.live && slot.generation == item.generation(),
            "stale widget handle {:?}",
            item
        );
        slot
    }
}

impl<const N: usize> Default for WidgetArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Toolkit for WidgetArena<N> {
    type Error = ArenaError;

    fn create(
        &mut self,
        kind: WidgetKind,
        parent: Option<NavigableItem>,
    ) -> Result<NavigableItem, Self::Error> {
        if let Some(parent) = parent {
            let _ = self.slot(parent);
        }

        let Some(index) = self.slots.iter().position(|slot| !slot.live) else {
            error!("toolkit: widget arena exhausted capacity={}", N);
            return Err(ArenaError::Exhausted);
        };

        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.live = true;
        slot.visible = true;
        slot.kind = kind;
        slot.parent = parent;
        slot.value = 0;

        Ok(NavigableItem::new(index as u16, slot.generation))
    }

    fn destroy(&mut self, item: NavigableItem) {
        self.slot_mut(item).live = false;

        for index in 0..N {
            let child = self.slots[index];
            if child.live && child.parent == Some(item) {
                self.destroy(NavigableItem::new(index as u16, child.generation));
            }
        }
    }

    fn set_visible(&mut self, item: NavigableItem, visible: bool) {
        self.slot_mut(item).visible = visible;
    }

    fn activate_tab(&mut self, tab: u8) {
        self.active_tab = tab;
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn set_value(&mut self, item: NavigableItem, value: u8) {
        self.slot_mut(item).value = value;
    }
}
