//! Collaborator traits for the output pin and the millisecond clock.
//!
//! The player never touches hardware directly. Firmware binds these traits to
//! a GPIO output and the executor's time driver, while host tooling and tests
//! plug in virtual lines and closures over a simulated clock.

/// Physical level driven onto the output line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Returns the opposite level.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Which physical level lights the LED for a given wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActivePolarity {
    ActiveHigh,
    ActiveLow,
}

impl ActivePolarity {
    /// Level that energizes the LED.
    #[must_use]
    pub const fn active_level(self) -> Level {
        match self {
            ActivePolarity::ActiveHigh => Level::High,
            ActivePolarity::ActiveLow => Level::Low,
        }
    }

    /// Maps a logical on/off state to the level written to the line.
    #[must_use]
    pub const fn level_for(self, lit: bool) -> Level {
        if lit {
            self.active_level()
        } else {
            self.active_level().inverted()
        }
    }
}

/// Abstraction over a single digital output.
pub trait LedLine {
    /// Configures the line as a push-pull output.
    fn configure_output(&mut self);

    /// Drives the line to `level`.
    fn write(&mut self, level: Level);
}

impl<T: LedLine + ?Sized> LedLine for &mut T {
    fn configure_output(&mut self) {
        (**self).configure_output();
    }

    fn write(&mut self, level: Level) {
        (**self).write(level);
    }
}

/// Output line that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopLine;

impl NoopLine {
    /// Creates a new no-op line.
    pub const fn new() -> Self {
        Self
    }
}

impl LedLine for NoopLine {
    fn configure_output(&mut self) {}

    fn write(&mut self, _: Level) {}
}

/// Free-running millisecond counter. Readings may wrap at `u32::MAX`.
pub trait MillisClock {
    /// Current reading in milliseconds.
    fn now_ms(&self) -> u32;
}

impl<F> MillisClock for F
where
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Milliseconds elapsed between two clock readings, tolerant of wraparound.
#[must_use]
pub const fn elapsed_ms(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}
