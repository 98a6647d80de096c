//! Persisted user preferences abstraction.

/// Keys understood by the config collaborator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigKey {
    Theme,
    ButtonStateSave,
    Volume,
    Brightness,
}

impl ConfigKey {
    pub const COUNT: usize = 4;

    pub const fn index(self) -> usize {
        match self {
            Self::Theme => 0,
            Self::ButtonStateSave => 1,
            Self::Volume => 2,
            Self::Brightness => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn from_raw(raw: u8) -> Self {
        if raw == 0 { Self::Light } else { Self::Dark }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::Light => 0,
            Self::Dark => 1,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Abstract config persistence backend.
pub trait ConfigStore {
    type Error;

    fn get_config(&mut self, key: ConfigKey) -> Result<u8, Self::Error>;
    fn set_config(&mut self, key: ConfigKey, value: u8) -> Result<(), Self::Error>;
}

/// RAM-only config used on hosts and before storage is mounted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryConfig {
    values: [u8; ConfigKey::COUNT],
    writes: u32,
}

impl MemoryConfig {
    pub const DEFAULT_VOLUME: u8 = 50;
    pub const DEFAULT_BRIGHTNESS: u8 = 80;

    pub const fn new() -> Self {
        let mut values = [0; ConfigKey::COUNT];
        values[ConfigKey::Volume.index()] = Self::DEFAULT_VOLUME;
        values[ConfigKey::Brightness.index()] = Self::DEFAULT_BRIGHTNESS;
        Self { values, writes: 0 }
    }

    pub const fn with(mut self, key: ConfigKey, value: u8) -> Self {
        self.values[key.index()] = value;
        self
    }

    pub fn value(&self, key: ConfigKey) -> u8 {
        self.values[key.index()]
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryConfig {
    type Error = core::convert::Infallible;

    fn get_config(&mut self, key: ConfigKey) -> Result<u8, Self::Error> {
        Ok(self.values[key.index()])
    }

    fn set_config(&mut self, key: ConfigKey, value: u8) -> Result<(), Self::Error> {
        self.values[key.index()] = value;
        self.writes = self.writes.wrapping_add(1);
        Ok(())
    }
}
