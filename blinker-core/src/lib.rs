#![no_std]

// Pattern playback logic for a single status LED.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware and timekeeping are reached only through the
// traits in [`line`].

pub mod demo;
pub mod line;
pub mod pattern;
pub mod player;
pub mod repl;
pub mod telemetry;
