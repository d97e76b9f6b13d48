//! Bitmask blink patterns.
//!
//! A pattern is up to 32 on/off bits played least-significant bit first, each
//! held for a fixed number of milliseconds. Construction is infallible so the
//! values can live in `const` tables; [`Pattern::validate`] reports whether a
//! player will accept it.

use core::fmt;

pub mod presets;

pub use presets::{ALL_PRESETS, Preset};

/// Widest pattern that fits in the bitmask.
pub const MAX_PATTERN_BITS: u8 = 32;
/// Significant bits when only the bitmask is given.
pub const DEFAULT_PATTERN_LENGTH: u8 = 20;
/// Hold time per bit when only the bitmask is given.
pub const DEFAULT_MSECS_PER_BIT: u32 = 100;
/// Repetition count that loops the pattern until replaced.
pub const REPEAT_FOREVER: u8 = 0;

/// Reason a pattern cannot be played.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatternError {
    /// `length` is zero or wider than [`MAX_PATTERN_BITS`].
    InvalidLength(u8),
    /// `msecs_per_bit` is zero.
    ZeroBitDuration,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidLength(length) => {
                write!(f, "pattern length {length} outside 1..={MAX_PATTERN_BITS}")
            }
            PatternError::ZeroBitDuration => f.write_str("bit duration must be non-zero"),
        }
    }
}

/// On/off sequence with its timing and repetition budget.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pattern {
    pub bits: u32,
    pub length: u8,
    pub msecs_per_bit: u32,
    pub repetitions: u8,
}

impl Pattern {
    /// Pattern over `bits` with the default length, timing and endless repetition.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self {
            bits,
            length: DEFAULT_PATTERN_LENGTH,
            msecs_per_bit: DEFAULT_MSECS_PER_BIT,
            repetitions: REPEAT_FOREVER,
        }
    }

    /// Fully specified pattern.
    #[must_use]
    pub const fn with_timing(bits: u32, length: u8, msecs_per_bit: u32, repetitions: u8) -> Self {
        Self {
            bits,
            length,
            msecs_per_bit,
            repetitions,
        }
    }

    /// Replaces the number of significant bits.
    #[must_use]
    pub const fn length(mut self, length: u8) -> Self {
        self.length = length;
        self
    }

    /// Replaces the hold time per bit.
    #[must_use]
    pub const fn msecs_per_bit(mut self, msecs_per_bit: u32) -> Self {
        self.msecs_per_bit = msecs_per_bit;
        self
    }

    /// Replaces the repetition budget (0 loops forever).
    #[must_use]
    pub const fn repetitions(mut self, repetitions: u8) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Checks the length and timing bounds a player enforces.
    pub const fn validate(&self) -> Result<(), PatternError> {
        if self.length == 0 || self.length > MAX_PATTERN_BITS {
            return Err(PatternError::InvalidLength(self.length));
        }
        if self.msecs_per_bit == 0 {
            return Err(PatternError::ZeroBitDuration);
        }
        Ok(())
    }

    /// Returns `true` when bit `index` asks for the LED to be lit.
    ///
    /// Indices at or beyond 32 read as off.
    #[must_use]
    pub const fn bit(&self, index: u8) -> bool {
        if index >= MAX_PATTERN_BITS {
            return false;
        }
        self.bits & (1 << index) != 0
    }

    /// Returns `true` when the pattern loops until replaced.
    #[must_use]
    pub const fn repeats_forever(&self) -> bool {
        self.repetitions == REPEAT_FOREVER
    }

    /// Returns `true` when the on/off sequence and its timing match `other`.
    ///
    /// The repetition budget is not part of the comparison.
    #[must_use]
    pub const fn same_sequence(&self, other: &Pattern) -> bool {
        self.bits == other.bits
            && self.length == other.length
            && self.msecs_per_bit == other.msecs_per_bit
    }

    /// Duration of a single traversal in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> u64 {
        self.length as u64 * self.msecs_per_bit as u64
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::from(self.length.clamp(1, MAX_PATTERN_BITS));
        let masked = if width >= 32 {
            self.bits
        } else {
            self.bits & ((1 << width) - 1)
        };
        write!(
            f,
            "bits=0b{masked:0width$b} len={} ms={}",
            self.length, self.msecs_per_bit
        )?;
        if self.repeats_forever() {
            f.write_str(" reps=forever")
        } else {
            write!(f, " reps={}", self.repetitions)
        }
    }
}
