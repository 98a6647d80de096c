//! Widget toolkit capability set.
//!
//! The shell never draws. It asks the toolkit for opaque item handles,
//! toggles their visibility, and hands them back when a scope closes.

pub mod arena;

use crate::settings::Theme;

/// Opaque handle to a toolkit-owned widget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NavigableItem {
    slot: u16,
    generation: u16,
}

impl NavigableItem {
    pub const fn new(slot: u16, generation: u16) -> Self {
        Self { slot, generation }
    }

    pub const fn slot(self) -> u16 {
        self.slot
    }

    pub const fn generation(self) -> u16 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WidgetKind {
    Tile,
    List,
    ListButton,
    Dialog,
    Slider,
    Overlay,
}

pub trait Toolkit {
    type Error;

    fn create(
        &mut self,
        kind: WidgetKind,
        parent: Option<NavigableItem>,
    ) -> Result<NavigableItem, Self::Error>;

    /// Release `item` and every widget parented to it.
    ///
    /// Passing a handle that was already destroyed is a caller bug.
    fn destroy(&mut self, item: NavigableItem);

    fn set_visible(&mut self, item: NavigableItem, visible: bool);

    fn activate_tab(&mut self, _tab: u8) {}

    fn apply_theme(&mut self, _theme: Theme) {}

    fn set_value(&mut self, _item: NavigableItem, _value: u8) {}
}
