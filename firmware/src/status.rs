#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! The LED task owns the player, so it mirrors the interesting bits of each
//! [`StatusSnapshot`] into atomics that any other task can read without
//! touching the player.

use blinker_core::player::PlaybackPhase;
use blinker_core::repl::status::StatusSnapshot;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// Sentinel stored when no cursor is active.
const NO_BIT: u8 = u8::MAX;

/// Encoded [`PlaybackPhase`] of the player.
static PHASE: AtomicU8 = AtomicU8::new(0);
/// Whether the LED is currently lit.
static LIT: AtomicBool = AtomicBool::new(false);
/// Whether the player ignores commands.
static LOCKED: AtomicBool = AtomicBool::new(false);
/// Active bit index (`NO_BIT` when idle).
static BIT: AtomicU8 = AtomicU8::new(NO_BIT);
/// Raw bits of the active pattern.
static PATTERN_BITS: AtomicU32 = AtomicU32::new(0);

/// Copy of the mirrored player state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusMirror {
    pub phase: PlaybackPhase,
    pub lit: bool,
    pub locked: bool,
    pub bit: Option<u8>,
    pub pattern_bits: u32,
}

const fn encode_phase(phase: PlaybackPhase) -> u8 {
    match phase {
        PlaybackPhase::Finished => 0,
        PlaybackPhase::StartNew => 1,
        PlaybackPhase::Running => 2,
        PlaybackPhase::Paused => 3,
    }
}

const fn decode_phase(raw: u8) -> PlaybackPhase {
    match raw {
        1 => PlaybackPhase::StartNew,
        2 => PlaybackPhase::Running,
        3 => PlaybackPhase::Paused,
        _ => PlaybackPhase::Finished,
    }
}

/// Stores a snapshot taken by the LED task.
pub fn record(snapshot: &StatusSnapshot) {
    PHASE.store(encode_phase(snapshot.phase), Ordering::Relaxed);
    LIT.store(snapshot.lit, Ordering::Relaxed);
    LOCKED.store(snapshot.locked, Ordering::Relaxed);
    let bit = snapshot.cursor.map_or(NO_BIT, |cursor| cursor.bit);
    BIT.store(bit, Ordering::Relaxed);
    PATTERN_BITS.store(snapshot.pattern.bits, Ordering::Relaxed);
}

/// Returns the most recently recorded state.
pub fn load() -> StatusMirror {
    let bit = match BIT.load(Ordering::Relaxed) {
        NO_BIT => None,
        value => Some(value),
    };
    StatusMirror {
        phase: decode_phase(PHASE.load(Ordering::Relaxed)),
        lit: LIT.load(Ordering::Relaxed),
        locked: LOCKED.load(Ordering::Relaxed),
        bit,
        pattern_bits: PATTERN_BITS.load(Ordering::Relaxed),
    }
}
