//! Storage-facing collaborators: item enumeration and save persistence.

use heapless::{String, Vec};

pub const ITEM_NAME_BYTES: usize = 100;
pub const GAME_LIST_CAP: usize = 100;
pub const APP_LIST_CAP: usize = 100;
pub const FIRMWARE_LIST_CAP: usize = 30;

/// Largest per-category cap, used to size the shared listing buffer.
const LISTING_CAP: usize = GAME_LIST_CAP;

pub type ItemName = String<ITEM_NAME_BYTES>;

/// Emulated systems, discriminant is the console id carried on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Console {
    Nes = 1,
    GameBoy = 2,
    GameBoyColor = 3,
    MasterSystem = 4,
    GameGear = 5,
}

impl Console {
    pub const ALL: [Console; 5] = [
        Console::Nes,
        Console::GameBoy,
        Console::GameBoyColor,
        Console::MasterSystem,
        Console::GameGear,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|console| console.id() == id)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nes => "NES",
            Self::GameBoy => "GameBoy",
            Self::GameBoyColor => "GameBoy Color",
            Self::MasterSystem => "Master System",
            Self::GameGear => "Game Gear",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    Games(Console),
    Apps,
    Firmware,
}

impl Category {
    pub const fn cap(self) -> usize {
        match self {
            Self::Games(_) => GAME_LIST_CAP,
            Self::Apps => APP_LIST_CAP,
            Self::Firmware => FIRMWARE_LIST_CAP,
        }
    }
}

/// Enumeration result buffer, bounded by the category cap it was reset for.
#[derive(Debug, Default)]
pub struct Listing {
    names: Vec<ItemName, LISTING_CAP>,
    limit: usize,
    truncated: bool,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, category: Category) {
        self.names.clear();
        self.limit = category.cap().min(LISTING_CAP);
        self.truncated = false;
    }

    /// Append `name`, cutting it to [`ITEM_NAME_BYTES`] on a char boundary.
    ///
    /// Returns `false` once the category cap is reached.
    pub fn push_truncated(&mut self, name: &str) -> bool {
        if self.names.len() >= self.limit {
            self.truncated = true;
            return false;
        }

        let mut end = name.len().min(ITEM_NAME_BYTES);
        while !name.is_char_boundary(end) {
            end -= 1;
        }

        let mut stored = ItemName::new();
        // Fits by construction.
        let _ = stored.push_str(&name[..end]);
        self.names.push(stored).is_ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(ItemName::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(ItemName::as_str)
    }

    /// Whether entries were dropped at the cap during the last enumeration.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CardKind {
    Sdio,
    Sdhc,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardInfo {
    pub name: String<8>,
    pub size_mb: u32,
    pub speed_khz: u32,
    pub kind: CardKind,
}

/// Source of game, app and firmware names.
pub trait ItemEnumerator {
    type Error;

    /// Fill `out` with the names of `category` in display order.
    fn list_items(&mut self, category: Category, out: &mut Listing) -> Result<(), Self::Error>;

    /// Mounted card details, `None` when no card is available.
    fn card_info(&self) -> Option<CardInfo> {
        None
    }
}

/// Per-game save data persistence.
pub trait SaveStore {
    type Error;

    fn has_save(&mut self, name: &str, console: Console) -> bool;
    fn delete_save(&mut self, name: &str, console: Console) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CatalogError {
    Unavailable,
    SaveNotFound,
}

const MAX_STATIC_SAVES: usize = 16;

/// In-memory catalog used on hosts and during bring-up.
#[derive(Debug, Clone)]
pub struct StaticCatalog<'a> {
    games: [&'a [&'a str]; Console::ALL.len()],
    apps: &'a [&'a str],
    firmware: &'a [&'a str],
    saves: Vec<(Console, &'a str), MAX_STATIC_SAVES>,
    card: Option<CardInfo>,
    mounted: bool,
}

impl<'a> StaticCatalog<'a> {
    pub fn new() -> Self {
        Self {
            games: [&[]; Console::ALL.len()],
            apps: &[],
            firmware: &[],
            saves: Vec::new(),
            card: None,
            mounted: true,
        }
    }

    pub fn with_games(mut self, console: Console, names: &'a [&'a str]) -> Self {
        self.games[console.id() as usize - 1] = names;
        self
    }

    pub fn with_apps(mut self, names: &'a [&'a str]) -> Self {
        self.apps = names;
        self
    }

    pub fn with_firmware(mut self, names: &'a [&'a str]) -> Self {
        self.firmware = names;
        self
    }

    pub fn with_save(mut self, console: Console, name: &'a str) -> Self {
        let _ = self.saves.push((console, name));
        self
    }

    pub fn with_card(mut self, card: CardInfo) -> Self {
        self.card = Some(card);
        self
    }

    /// Simulate a missing or unreadable card.
    pub fn unmounted(mut self) -> Self {
        self.mounted = false;
        self.card = None;
        self
    }

    pub fn save_count(&self) -> usize {
        self.saves.len()
    }
}

impl Default for StaticCatalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemEnumerator for StaticCatalog<'_> {
    type Error = CatalogError;

    fn list_items(&mut self, category: Category, out: &mut Listing) -> Result<(), Self::Error> {
        out.reset(category);
        if !self.mounted {
            return Err(CatalogError::Unavailable);
        }

        let names = match category {
            Category::Games(console) => self.games[console.id() as usize - 1],
            Category::Apps => self.apps,
            Category::Firmware => self.firmware,
        };
        for name in names {
            if !out.push_truncated(name) {
                break;
            }
        }
        Ok(())
    }

    fn card_info(&self) -> Option<CardInfo> {
        self.card.clone()
    }
}

impl SaveStore for StaticCatalog<'_> {
    type Error = CatalogError;

    fn has_save(&mut self, name: &str, console: Console) -> bool {
        self.saves
            .iter()
            .any(|(saved_console, saved)| *saved_console == console && *saved == name)
    }

    fn delete_save(&mut self, name: &str, console: Console) -> Result<(), Self::Error> {
        let position = self
            .saves
            .iter()
            .position(|(saved_console, saved)| *saved_console == console && *saved == name)
            .ok_or(CatalogError::SaveNotFound)?;
        self.saves.swap_remove(position);
        Ok(())
    }
}
