//! Non-blocking pattern playback for a single LED line.
//!
//! [`PatternPlayer`] owns the output line and a small state machine. The owner
//! calls [`PatternPlayer::step`] from its cooperative loop; every call is O(1),
//! never sleeps, and writes the line at most once. Commands never fail loudly:
//! anything the player refuses leaves its state untouched and is reported
//! through a [`CommandStatus`] the caller is free to ignore.

use crate::line::{ActivePolarity, LedLine, MillisClock, elapsed_ms};
use crate::pattern::{Pattern, PatternError};

/// Whether the active bit has been written yet or is being held.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BitPhase {
    /// The bit at the cursor still needs to be applied to the line.
    Emit,
    /// The bit was applied at `since` and is held for one window.
    Holding { since: u32 },
}

/// Position of playback within the active pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cursor {
    pub bit: u8,
    pub repetition: u8,
    pub phase: BitPhase,
}

impl Cursor {
    const fn start() -> Self {
        Self {
            bit: 0,
            repetition: 0,
            phase: BitPhase::Emit,
        }
    }
}

/// Playback state machine. The cursor only exists while a pattern is active.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackStatus {
    /// No pattern under way; the line is held by `set_on`/`set_off` or idle.
    Finished,
    /// A new pattern was accepted and starts on the next step.
    StartNew,
    Running(Cursor),
    Paused(Cursor),
}

/// Cursor-free view of [`PlaybackStatus`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackPhase {
    Finished,
    StartNew,
    Running,
    Paused,
}

impl PlaybackPhase {
    /// Lowercase label for status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PlaybackPhase::Finished => "finished",
            PlaybackPhase::StartNew => "start-new",
            PlaybackPhase::Running => "running",
            PlaybackPhase::Paused => "paused",
        }
    }
}

impl PlaybackStatus {
    #[must_use]
    pub const fn phase(self) -> PlaybackPhase {
        match self {
            PlaybackStatus::Finished => PlaybackPhase::Finished,
            PlaybackStatus::StartNew => PlaybackPhase::StartNew,
            PlaybackStatus::Running(_) => PlaybackPhase::Running,
            PlaybackStatus::Paused(_) => PlaybackPhase::Paused,
        }
    }

    #[must_use]
    pub const fn cursor(self) -> Option<Cursor> {
        match self {
            PlaybackStatus::Running(cursor) | PlaybackStatus::Paused(cursor) => Some(cursor),
            PlaybackStatus::Finished | PlaybackStatus::StartNew => None,
        }
    }

    /// Transition taken by `pause()`, if any.
    const fn paused(self) -> Option<Self> {
        match self {
            PlaybackStatus::Running(cursor) => Some(PlaybackStatus::Paused(cursor)),
            _ => None,
        }
    }

    /// Transition taken by `resume()`, if any. The paused bit is re-emitted so
    /// it is held for a full window again.
    const fn resumed(self) -> Option<Self> {
        match self {
            PlaybackStatus::Paused(cursor) => Some(PlaybackStatus::Running(Cursor {
                phase: BitPhase::Emit,
                ..cursor
            })),
            _ => None,
        }
    }
}

/// Why a command left the player untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    Locked,
    InvalidLength,
    ZeroBitDuration,
    /// `pause()` outside of `Running`.
    NotRunning,
    /// `resume()` outside of `Paused`.
    NotPaused,
}

impl Rejection {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rejection::Locked => "locked",
            Rejection::InvalidLength => "invalid-length",
            Rejection::ZeroBitDuration => "zero-bit-duration",
            Rejection::NotRunning => "not-running",
            Rejection::NotPaused => "not-paused",
        }
    }
}

impl From<PatternError> for Rejection {
    fn from(err: PatternError) -> Self {
        match err {
            PatternError::InvalidLength(_) => Rejection::InvalidLength,
            PatternError::ZeroBitDuration => Rejection::ZeroBitDuration,
        }
    }
}

/// Result of a player command. Ignoring it gives the silent behavior.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommandStatus {
    Applied,
    /// Accepted, but the identical looping pattern was already playing.
    Unchanged,
    Rejected(Rejection),
}

impl CommandStatus {
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, CommandStatus::Rejected(_))
    }
}

/// What a single [`PatternPlayer::step`] call did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// Finished or paused; nothing to do.
    Idle,
    /// Applied bit `bit`. `changed` is `true` when the line was written.
    Emitted { bit: u8, lit: bool, changed: bool },
    /// Still inside the current bit window.
    Holding,
    /// Window elapsed; the cursor moved to `bit`.
    Advanced { bit: u8 },
    /// A traversal ended and playback restarts at bit 0. `repetition` counts
    /// completed traversals (stays 0 for endless patterns).
    Wrapped { repetition: u8 },
    /// The repetition budget ran out and the line was forced off. `changed` is
    /// `true` when the LED was still lit and had to be written.
    Completed { changed: bool },
}

/// Plays [`Pattern`]s on one output line.
pub struct PatternPlayer<L, C> {
    line: L,
    clock: C,
    polarity: ActivePolarity,
    pattern: Pattern,
    status: PlaybackStatus,
    locked: bool,
    lit: bool,
}

impl<L, C> PatternPlayer<L, C>
where
    L: LedLine,
    C: MillisClock,
{
    /// Binds the player to `line` and drives it to the inactive level.
    pub fn new(mut line: L, polarity: ActivePolarity, clock: C) -> Self {
        line.configure_output();
        line.write(polarity.level_for(false));
        Self {
            line,
            clock,
            polarity,
            pattern: Pattern::default(),
            status: PlaybackStatus::Finished,
            locked: false,
            lit: false,
        }
    }

    /// Queues `pattern` for playback from its first bit.
    ///
    /// An identical looping pattern that is already playing keeps its cursor.
    /// Any explicit repetition count, or an idle player, always restarts.
    pub fn set_pattern(&mut self, pattern: Pattern) -> CommandStatus {
        if self.locked {
            return CommandStatus::Rejected(Rejection::Locked);
        }
        if let Err(err) = pattern.validate() {
            return CommandStatus::Rejected(err.into());
        }

        let restart = !self.pattern.same_sequence(&pattern)
            || pattern.repetitions > 0
            || self.status == PlaybackStatus::Finished;
        if !restart {
            return CommandStatus::Unchanged;
        }

        self.pattern = pattern;
        self.status = PlaybackStatus::StartNew;
        CommandStatus::Applied
    }

    /// Lights the LED and cancels any pattern.
    pub fn set_on(&mut self) -> CommandStatus {
        self.force(true)
    }

    /// Darkens the LED and cancels any pattern.
    pub fn set_off(&mut self) -> CommandStatus {
        self.force(false)
    }

    fn force(&mut self, lit: bool) -> CommandStatus {
        if self.locked {
            return CommandStatus::Rejected(Rejection::Locked);
        }
        self.drive(lit);
        self.status = PlaybackStatus::Finished;
        CommandStatus::Applied
    }

    /// Freezes playback at the current bit. Only effective while running.
    pub fn pause(&mut self) -> CommandStatus {
        if self.locked {
            return CommandStatus::Rejected(Rejection::Locked);
        }
        match self.status.paused() {
            Some(next) => {
                self.status = next;
                CommandStatus::Applied
            }
            None => CommandStatus::Rejected(Rejection::NotRunning),
        }
    }

    /// Continues a paused pattern from the bit it stopped on.
    pub fn resume(&mut self) -> CommandStatus {
        if self.locked {
            return CommandStatus::Rejected(Rejection::Locked);
        }
        match self.status.resumed() {
            Some(next) => {
                self.status = next;
                CommandStatus::Applied
            }
            None => CommandStatus::Rejected(Rejection::NotPaused),
        }
    }

    /// Blocks or re-enables commands. Playback already under way continues.
    pub fn lock(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Returns `true` while the line is under pattern control.
    pub fn is_busy(&self) -> bool {
        self.status != PlaybackStatus::Finished
    }

    /// Advances playback. Call from every iteration of the owner's loop.
    pub fn step(&mut self) -> StepOutcome {
        if self.status == PlaybackStatus::StartNew {
            self.status = PlaybackStatus::Running(Cursor::start());
        }
        let PlaybackStatus::Running(mut cursor) = self.status else {
            return StepOutcome::Idle;
        };

        let now = self.clock.now_ms();
        let outcome = match cursor.phase {
            BitPhase::Emit => {
                let lit = self.pattern.bit(cursor.bit);
                let changed = self.drive(lit);
                cursor.phase = BitPhase::Holding { since: now };
                StepOutcome::Emitted {
                    bit: cursor.bit,
                    lit,
                    changed,
                }
            }
            BitPhase::Holding { since } => {
                if elapsed_ms(since, now) <= self.pattern.msecs_per_bit {
                    return StepOutcome::Holding;
                }
                cursor.phase = BitPhase::Emit;
                cursor.bit += 1;
                if cursor.bit < self.pattern.length {
                    StepOutcome::Advanced { bit: cursor.bit }
                } else {
                    cursor.bit = 0;
                    if self.pattern.repeats_forever() {
                        StepOutcome::Wrapped { repetition: 0 }
                    } else {
                        cursor.repetition = cursor.repetition.saturating_add(1);
                        if cursor.repetition >= self.pattern.repetitions {
                            // Natural completion is not a user command, so the
                            // lock does not apply here.
                            self.status = PlaybackStatus::Finished;
                            let changed = self.drive(false);
                            return StepOutcome::Completed { changed };
                        }
                        StepOutcome::Wrapped {
                            repetition: cursor.repetition,
                        }
                    }
                }
            }
        };

        self.status = PlaybackStatus::Running(cursor);
        outcome
    }

    /// Writes the line if the logical state differs. Returns `true` on write.
    fn drive(&mut self, lit: bool) -> bool {
        if self.lit == lit {
            return false;
        }
        self.lit = lit;
        self.line.write(self.polarity.level_for(lit));
        true
    }

    /// Pattern most recently accepted by [`set_pattern`](Self::set_pattern).
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.status.phase()
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.status.cursor()
    }

    /// Logical output state (`true` == LED lit).
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn polarity(&self) -> ActivePolarity {
        self.polarity
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consumes the player and hands back the line and clock.
    pub fn release(self) -> (L, C) {
        (self.line, self.clock)
    }
}
