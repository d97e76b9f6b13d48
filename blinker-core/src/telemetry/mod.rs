//! Fixed-capacity history of playback steps.
//!
//! Hosts feed every [`StepOutcome`] into an [`EventLog`]; only outcomes that
//! change something are retained, so the log holds a compact timeline of line
//! writes, bit advances and completions without any allocation.

use heapless::HistoryBuf;

use crate::player::StepOutcome;

/// Records retained by default.
pub const EVENT_LOG_CAPACITY: usize = 64;

/// Timestamped step outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub at_ms: u32,
    pub outcome: StepOutcome,
}

impl EventRecord {
    /// Returns `Some(lit)` when this record wrote the line.
    #[must_use]
    pub const fn line_change(&self) -> Option<bool> {
        match self.outcome {
            StepOutcome::Emitted {
                lit, changed: true, ..
            } => Some(lit),
            StepOutcome::Completed { changed: true } => Some(false),
            _ => None,
        }
    }
}

/// Returns `true` for outcomes worth keeping in the history.
#[must_use]
pub const fn is_notable(outcome: StepOutcome) -> bool {
    !matches!(outcome, StepOutcome::Idle | StepOutcome::Holding)
}

/// Ring buffer of notable step outcomes, oldest entries evicted first.
pub struct EventLog<const CAPACITY: usize = EVENT_LOG_CAPACITY> {
    ring: HistoryBuf<EventRecord, CAPACITY>,
    dropped: u32,
}

impl<const CAPACITY: usize> EventLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            dropped: 0,
        }
    }

    /// Stores `outcome` if it is notable. Returns `true` when stored.
    pub fn record(&mut self, at_ms: u32, outcome: StepOutcome) -> bool {
        if !is_notable(outcome) {
            return false;
        }
        if self.ring.len() == self.ring.capacity() {
            self.dropped = self.dropped.saturating_add(1);
        }
        self.ring.write(EventRecord { at_ms, outcome });
        true
    }

    /// Records in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// Line writes in chronological order as `(at_ms, lit)`.
    pub fn line_changes(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        self.oldest_first()
            .filter_map(|record| record.line_change().map(|lit| (record.at_ms, lit)))
    }

    #[must_use]
    pub fn latest(&self) -> Option<&EventRecord> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records evicted because the ring was full.
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.ring.clear();
        self.dropped = 0;
    }
}

impl<const CAPACITY: usize> Default for EventLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
