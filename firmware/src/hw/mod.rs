//! Board bindings for the LED line and the millisecond clock.

use blinker_core::line::{LedLine, Level};
use embassy_stm32::gpio::{Flex, Speed};
use embassy_time::Instant;

/// Nucleo user LED (PA5), wired active-high.
pub struct GpioLine<'d> {
    pin: Flex<'d>,
}

impl<'d> GpioLine<'d> {
    pub fn new(pin: Flex<'d>) -> Self {
        Self { pin }
    }
}

impl LedLine for GpioLine<'_> {
    fn configure_output(&mut self) {
        self.pin.set_as_output(Speed::Low);
    }

    fn write(&mut self, level: Level) {
        match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        }
    }
}

/// Milliseconds since boot, wrapping at `u32::MAX` like the player expects.
#[allow(clippy::cast_possible_truncation)]
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}
