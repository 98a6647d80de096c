use embedded_hal::digital::InputPin;
use heapless::Vec;
use log::debug;

use microbyte_core::input::{ALL_RELEASED, BUTTON_COUNT, Button, InputBits, RawInputSource};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    /// Level reported for lines with no pin attached.
    const fn idle_bits(self) -> InputBits {
        if self.active_low { ALL_RELEASED } else { 0 }
    }
}

#[derive(Debug)]
pub struct ButtonSampleError<E> {
    pub button: Button,
    pub source: E,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ButtonRegisterError {
    Duplicate(Button),
}

#[derive(Debug)]
struct ButtonLine<P> {
    button: Button,
    pin: P,
}

/// Samples one GPIO per button into the raw bit vector, level for level.
#[derive(Debug)]
pub struct GpioButtons<P> {
    lines: Vec<ButtonLine<P>, BUTTON_COUNT>,
    config: ButtonConfig,
}

impl<P> GpioButtons<P>
where
    P: InputPin,
{
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            lines: Vec::new(),
            config,
        }
    }

    pub fn register(&mut self, button: Button, pin: P) -> Result<(), ButtonRegisterError> {
        if self.lines.iter().any(|line| line.button == button) {
            return Err(ButtonRegisterError::Duplicate(button));
        }
        // One slot per button, so a non-duplicate always fits.
        let _ = self.lines.push(ButtonLine { button, pin });
        debug!("input: registered button={:?} bit={}", button, button.bit());
        Ok(())
    }

    pub fn registered(&self) -> usize {
        self.lines.len()
    }
}

impl<P> RawInputSource for GpioButtons<P>
where
    P: InputPin,
{
    type Error = ButtonSampleError<P::Error>;

    fn sample(&mut self) -> Result<InputBits, Self::Error> {
        let mut bits = self.config.idle_bits();

        for line in &mut self.lines {
            let high = line.pin.is_high().map_err(|source| ButtonSampleError {
                button: line.button,
                source,
            })?;
            let mask: InputBits = 1 << line.button.bit();
            if high {
                bits |= mask;
            } else {
                bits &= !mask;
            }
        }

        Ok(bits)
    }
}
