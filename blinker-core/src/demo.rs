//! Showcase schedule that cycles through every preset.
//!
//! The schedule is an example of application-level pattern selection: it
//! advances one step every [`DEMO_STEP_INTERVAL_MS`] and hands out the pattern
//! for a step exactly once, when the step becomes current.

use crate::line::elapsed_ms;
use crate::pattern::{Pattern, presets};

/// Time spent on each demo step.
pub const DEMO_STEP_INTERVAL_MS: u32 = 5_000;

/// Pattern shown before the schedule is first polled.
pub const DEMO_BOOT_PATTERN: Pattern = presets::WIFI_ERROR;

/// Two-bit flash at 50 ms per bit.
pub const FAST_FLASH: Pattern = Pattern::with_timing(0x01, 2, 50, 0);

/// One 100 ms flash, then dark.
pub const SINGLE_FLASH: Pattern = Pattern::with_timing(0b1, 1, 100, 1);

/// Patterns in the order the demo plays them.
pub const DEMO_STEPS: [Pattern; 10] = [
    presets::MQTT_CONNECTING,
    presets::MQTT_ERROR,
    presets::SPEED_FAST,
    presets::SPEED_MEDIUM,
    presets::SPEED_SLOW,
    presets::SPEED_VERY_SLOW,
    presets::WIFI_CONNECTING,
    presets::WIFI_ERROR,
    FAST_FLASH,
    SINGLE_FLASH,
];

/// Duration of one full pass through [`DEMO_STEPS`].
pub const DEMO_CYCLE_MS: u32 = DEMO_STEP_INTERVAL_MS * DEMO_STEPS.len() as u32;

/// Time-driven cursor over [`DEMO_STEPS`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DemoSchedule {
    step: usize,
    announced: Option<usize>,
    step_started_at: u32,
}

impl DemoSchedule {
    /// Starts the schedule at step 0 with its first interval anchored at `now_ms`.
    #[must_use]
    pub const fn new(now_ms: u32) -> Self {
        Self {
            step: 0,
            announced: None,
            step_started_at: now_ms,
        }
    }

    /// Index of the current step.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Returns the pattern for the current step the first time it is polled.
    ///
    /// At most one interval is consumed per call, so a caller that polls late
    /// walks through the skipped steps one poll at a time.
    pub fn poll(&mut self, now_ms: u32) -> Option<Pattern> {
        if elapsed_ms(self.step_started_at, now_ms) > DEMO_STEP_INTERVAL_MS {
            self.step_started_at = now_ms;
            self.step = (self.step + 1) % DEMO_STEPS.len();
        }

        if self.announced == Some(self.step) {
            return None;
        }
        self.announced = Some(self.step);
        Some(DEMO_STEPS[self.step])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_announces_step_zero() {
        let mut schedule = DemoSchedule::new(0);
        assert_eq!(schedule.poll(0), Some(presets::MQTT_CONNECTING));
        assert_eq!(schedule.poll(10), None);
        assert_eq!(schedule.poll(DEMO_STEP_INTERVAL_MS), None);
    }

    #[test]
    fn advances_after_each_interval_and_wraps() {
        let mut schedule = DemoSchedule::new(0);
        let mut now = 0;
        let mut announced = 0;
        for expected in DEMO_STEPS.iter().chain(DEMO_STEPS.iter().take(1)) {
            let pattern = loop {
                if let Some(pattern) = schedule.poll(now) {
                    break pattern;
                }
                now += 1;
            };
            assert_eq!(&pattern, expected, "step {announced}");
            announced += 1;
        }
        assert_eq!(schedule.step(), 0);
    }

    #[test]
    fn tail_steps_are_quick_and_single_flashes() {
        assert_eq!(FAST_FLASH.validate(), Ok(()));
        assert!(FAST_FLASH.repeats_forever());
        assert_eq!(SINGLE_FLASH.repetitions, 1);
        assert_eq!(SINGLE_FLASH.period_ms(), 100);
    }

    #[test]
    fn survives_clock_wrap() {
        let start = u32::MAX - 100;
        let mut schedule = DemoSchedule::new(start);
        assert!(schedule.poll(start).is_some());
        let later = start.wrapping_add(DEMO_STEP_INTERVAL_MS + 1);
        assert_eq!(schedule.poll(later), Some(DEMO_STEPS[1]));
    }
}
