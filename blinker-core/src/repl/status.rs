//! One-line status rendering for the `status` command.

use core::fmt;

use crate::line::{LedLine, MillisClock};
use crate::pattern::Pattern;
use crate::player::{Cursor, PatternPlayer, PlaybackPhase};

/// Point-in-time view of a player.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub phase: PlaybackPhase,
    pub lit: bool,
    pub locked: bool,
    pub pattern: Pattern,
    pub cursor: Option<Cursor>,
}

impl StatusSnapshot {
    pub fn capture<L, C>(player: &PatternPlayer<L, C>) -> Self
    where
        L: LedLine,
        C: MillisClock,
    {
        Self {
            phase: player.phase(),
            lit: player.is_lit(),
            locked: player.is_locked(),
            pattern: player.pattern(),
            cursor: player.cursor(),
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !matches!(self.phase, PlaybackPhase::Finished)
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={} lit={} locked={} {}",
            self.phase.label(),
            if self.lit { "on" } else { "off" },
            if self.locked { "yes" } else { "no" },
            self.pattern,
        )?;
        if let Some(cursor) = self.cursor {
            write!(f, " bit={} rep={}", cursor.bit, cursor.repetition)?;
        }
        Ok(())
    }
}
