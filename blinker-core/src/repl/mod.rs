//! Text command surface shared between firmware and emulator targets.
//!
//! The grammar lives in [`grammar`] and parses without allocation, so it stays
//! compatible with `no_std`.

pub mod commands;
pub mod grammar;
pub mod status;
