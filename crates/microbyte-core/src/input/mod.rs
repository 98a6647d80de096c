//! Input abstraction layer.

pub mod keymap;

/// One sample of the button lines, bit positions fixed by the board wiring.
pub type InputBits = u16;

/// Every line released on active-low wiring.
pub const ALL_RELEASED: InputBits = InputBits::MAX;

/// Logical navigation keys consumed by the focus scopes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalKey {
    Next,
    Prev,
    Left,
    Right,
    Enter,
    Cancel,
}

/// Physical buttons, discriminant is the bit position in [`InputBits`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Button {
    Down = 0,
    Left = 1,
    Up = 2,
    Right = 3,
    B = 8,
    A = 9,
    Menu = 11,
}

pub const BUTTON_COUNT: usize = 7;

impl Button {
    /// Registered buttons in poll order.
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Down,
        Button::Left,
        Button::Up,
        Button::Right,
        Button::B,
        Button::A,
        Button::Menu,
    ];

    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Dense index used for per-button bookkeeping.
    pub const fn index(self) -> usize {
        match self {
            Self::Down => 0,
            Self::Left => 1,
            Self::Up => 2,
            Self::Right => 3,
            Self::B => 4,
            Self::A => 5,
            Self::Menu => 6,
        }
    }

    pub const fn is_asserted(self, bits: InputBits, active_low: bool) -> bool {
        let high = (bits >> self.bit()) & 0x01 == 1;
        if active_low { !high } else { high }
    }

    /// Level-encode a pressed button into `bits`.
    pub const fn press(self, bits: InputBits, active_low: bool) -> InputBits {
        let mask = 1 << self.bit();
        if active_low { bits & !mask } else { bits | mask }
    }
}

/// Polled source of raw button samples.
pub trait RawInputSource {
    type Error;

    fn sample(&mut self) -> Result<InputBits, Self::Error>;
}
