use std::cell::Cell;
use std::rc::Rc;

use blinker_core::line::{ActivePolarity, LedLine, Level};
use blinker_core::pattern::{Pattern, presets};
use blinker_core::player::{
    BitPhase, CommandStatus, PatternPlayer, PlaybackPhase, StepOutcome,
};
use blinker_core::telemetry::EventLog;

type SimClock = Rc<Cell<u32>>;
type Player = PatternPlayer<RecordingLine, Box<dyn Fn() -> u32>>;

/// Output line that timestamps every write with the simulated clock.
struct RecordingLine {
    clock: SimClock,
    writes: Vec<(u32, Level)>,
}

impl LedLine for RecordingLine {
    fn configure_output(&mut self) {}

    fn write(&mut self, level: Level) {
        self.writes.push((self.clock.get(), level));
    }
}

fn player_at(start: u32, polarity: ActivePolarity) -> (Player, SimClock) {
    let clock: SimClock = Rc::new(Cell::new(start));
    let line = RecordingLine {
        clock: Rc::clone(&clock),
        writes: Vec::new(),
    };
    let reader = Rc::clone(&clock);
    let player = PatternPlayer::new(
        line,
        polarity,
        Box::new(move || reader.get()) as Box<dyn Fn() -> u32>,
    );
    (player, clock)
}

fn player() -> (Player, SimClock) {
    player_at(0, ActivePolarity::ActiveHigh)
}

/// Steps once per millisecond until the clock reads `until` (inclusive).
fn run_until(player: &mut Player, clock: &SimClock, until: u32) -> Vec<(u32, StepOutcome)> {
    let mut outcomes = Vec::new();
    loop {
        outcomes.push((clock.get(), player.step()));
        if clock.get() == until {
            break;
        }
        clock.set(clock.get().wrapping_add(1));
    }
    outcomes
}

/// Line writes after construction, as `(at_ms, level)`.
fn writes_since_boot(player: &Player) -> &[(u32, Level)] {
    &player.line().writes[1..]
}

#[test]
fn wifi_connecting_pulses_on_bits_zero_and_four() {
    let (mut player, clock) = player();
    player.set_pattern(presets::WIFI_CONNECTING);

    // With a 1 ms loop each 100 ms bit occupies 102 ms: the window must be
    // exceeded, then the next bit is emitted on the following call.
    run_until(&mut player, &clock, 2_200);

    assert_eq!(
        writes_since_boot(&player),
        &[
            (0, Level::High),
            (102, Level::Low),
            (408, Level::High),
            (510, Level::Low),
            (2_040, Level::High),
            (2_142, Level::Low),
        ]
    );
    assert!(player.is_busy());
}

#[test]
fn emitted_bits_follow_the_pattern_in_order() {
    let patterns = [
        Pattern::with_timing(0b1011_0010, 8, 7, 0),
        Pattern::with_timing(0xDEAD_BEEF, 32, 3, 0),
        Pattern::with_timing(0b10, 2, 1, 0),
        presets::MQTT_ERROR,
    ];

    for pattern in patterns {
        let (mut player, clock) = player();
        player.set_pattern(pattern);
        let traversals = 3;
        let until = u32::from(pattern.length) * (pattern.msecs_per_bit + 2) * traversals;
        let outcomes = run_until(&mut player, &clock, until);

        let mut expected_bit = 0_u8;
        let mut last_emit: Option<u32> = None;
        for (at, outcome) in outcomes {
            if let StepOutcome::Emitted { bit, lit, .. } = outcome {
                assert_eq!(bit, expected_bit, "{pattern}");
                assert_eq!(lit, pattern.bit(bit), "{pattern} bit {bit}");
                if let Some(previous) = last_emit {
                    let spacing = at - previous;
                    assert!(
                        spacing > pattern.msecs_per_bit && spacing <= pattern.msecs_per_bit + 2,
                        "{pattern}: bit {bit} spaced {spacing} ms"
                    );
                }
                last_emit = Some(at);
                expected_bit = (expected_bit + 1) % pattern.length;
            }
        }
        assert!(last_emit.is_some());
    }
}

#[test]
fn at_most_one_write_per_step_when_called_rarely() {
    let (mut player, clock) = player();
    player.set_pattern(Pattern::with_timing(0b0101, 4, 10, 0));

    let mut times = Vec::new();
    for at in (0..2_000).step_by(250) {
        clock.set(at);
        let before = player.line().writes.len();
        player.step();
        let after = player.line().writes.len();
        assert!(after - before <= 1, "multiple writes at {at}");
        times.push((at, player.cursor().map(|cursor| cursor.bit)));
    }

    // Each late call either advances the cursor or emits the bit, never both.
    assert_eq!(
        &times[..5],
        &[
            (0, Some(0)),
            (250, Some(1)),
            (500, Some(1)),
            (750, Some(2)),
            (1_000, Some(2)),
        ]
    );
}

#[test]
fn identical_looping_pattern_keeps_cursor() {
    let (mut twin, twin_clock) = player();
    let (mut player, clock) = player();
    twin.set_pattern(presets::SPEED_MEDIUM);
    player.set_pattern(presets::SPEED_MEDIUM);

    run_until(&mut twin, &twin_clock, 750);
    run_until(&mut player, &clock, 750);
    let cursor = player.cursor();

    player.set_pattern(presets::SPEED_MEDIUM);
    assert_eq!(player.cursor(), cursor);
    assert_eq!(player.phase(), PlaybackPhase::Running);

    run_until(&mut twin, &twin_clock, 3_000);
    run_until(&mut player, &clock, 3_000);
    assert_eq!(player.cursor(), twin.cursor());
    assert_eq!(player.line().writes, twin.line().writes);
}

#[test]
fn finished_player_restarts_identical_pattern() {
    let (mut player, clock) = player();
    player.set_pattern(presets::SPEED_FAST);
    run_until(&mut player, &clock, 300);
    player.set_off();
    assert!(!player.is_busy());

    player.set_pattern(presets::SPEED_FAST);
    assert_eq!(player.phase(), PlaybackPhase::StartNew);
    clock.set(1_000);
    player.step();
    assert_eq!(player.cursor().map(|cursor| cursor.bit), Some(0));
}

#[test]
fn explicit_repetitions_always_restart() {
    let (mut player, clock) = player();
    let pattern = Pattern::with_timing(0b0110, 4, 20, 5);
    player.set_pattern(pattern);
    run_until(&mut player, &clock, 60);
    assert_eq!(player.cursor().map(|cursor| cursor.bit), Some(2));

    player.set_pattern(pattern);
    assert_eq!(player.phase(), PlaybackPhase::StartNew);
    player.step();
    assert_eq!(player.cursor().map(|cursor| cursor.bit), Some(0));
}

#[test]
fn repetition_budget_ends_exactly_after_last_traversal() {
    let (mut player, clock) = player();
    // Three traversals of four lit 10 ms bits; each bit spans 12 ms at a 1 ms loop.
    player.set_pattern(Pattern::with_timing(0b1111, 4, 10, 3));

    let last_emit = (2 * 4 + 3) * 12;
    let completion = last_emit + 11;
    run_until(&mut player, &clock, completion - 1);
    assert!(player.is_busy());
    assert!(player.is_lit());
    assert_eq!(player.cursor().map(|cursor| cursor.repetition), Some(2));

    clock.set(completion);
    assert_eq!(player.step(), StepOutcome::Completed { changed: true });
    assert!(!player.is_busy());
    assert!(!player.is_lit());

    run_until(&mut player, &clock, completion + 1_000);
    assert_eq!(
        writes_since_boot(&player),
        &[(0, Level::High), (completion, Level::Low)]
    );
}

#[test]
fn completion_on_a_dark_bit_does_not_write_the_line() {
    let (mut player, clock) = player();
    player.set_pattern(Pattern::with_timing(0b01, 2, 10, 1));

    let mut log: EventLog = EventLog::new();
    for (at, outcome) in run_until(&mut player, &clock, 100) {
        log.record(at, outcome);
    }

    assert_eq!(
        log.latest().map(|record| (record.at_ms, record.outcome)),
        Some((23, StepOutcome::Completed { changed: false }))
    );
    let written: Vec<(u32, bool)> = writes_since_boot(&player)
        .iter()
        .map(|&(at, level)| (at, level == Level::High))
        .collect();
    assert_eq!(written, vec![(0, true), (12, false)]);
    assert_eq!(log.line_changes().collect::<Vec<_>>(), written);
}

#[test]
fn single_flash_lights_for_one_window() {
    let (mut player, clock) = player();
    player.set_pattern(Pattern::with_timing(0b1, 1, 50, 1));

    run_until(&mut player, &clock, 500);
    assert_eq!(
        writes_since_boot(&player),
        &[(0, Level::High), (51, Level::Low)]
    );
    assert!(!player.is_busy());
    assert_eq!(player.phase(), PlaybackPhase::Finished);
}

#[test]
fn locked_player_ignores_commands_but_keeps_playing() {
    let (mut player, clock) = player();
    player.set_pattern(presets::SPEED_VERY_SLOW);
    run_until(&mut player, &clock, 50);
    player.lock(true);

    let busy = player.is_busy();
    let lit = player.is_lit();
    let writes = player.line().writes.len();
    player.set_off();
    player.set_on();
    player.set_pattern(presets::WIFI_ERROR);
    player.pause();
    player.resume();
    assert_eq!(player.is_busy(), busy);
    assert_eq!(player.is_lit(), lit);
    assert_eq!(player.line().writes.len(), writes);
    assert_eq!(player.pattern(), presets::SPEED_VERY_SLOW);

    // Ten lit bits, then the pattern turns the LED off on its own.
    run_until(&mut player, &clock, 10 * 102 + 5);
    assert!(!player.is_lit());

    player.lock(false);
    player.set_on();
    assert!(player.is_lit());
    assert!(!player.is_busy());
}

#[test]
fn lock_does_not_block_natural_completion() {
    let (mut player, clock) = player();
    player.set_pattern(Pattern::with_timing(0b1, 1, 30, 2));
    player.step();
    player.lock(true);

    run_until(&mut player, &clock, 200);
    assert!(!player.is_busy());
    assert!(!player.is_lit());
    assert_eq!(
        player.line().writes.last().map(|&(_, level)| level),
        Some(Level::Low)
    );
}

#[test]
fn pause_freezes_output_and_resume_rearms_the_bit() {
    let (mut player, clock) = player();
    player.set_pattern(Pattern::with_timing(0b01, 2, 100, 0));
    run_until(&mut player, &clock, 40);
    assert!(player.is_lit());

    player.pause();
    let cursor = player.cursor();
    let writes = player.line().writes.len();
    for at in (41..5_000).step_by(7) {
        clock.set(at);
        assert_eq!(player.step(), StepOutcome::Idle);
    }
    assert_eq!(player.cursor(), cursor);
    assert_eq!(player.line().writes.len(), writes);
    assert!(player.is_lit());

    clock.set(5_000);
    player.resume();
    assert_eq!(
        player.step(),
        StepOutcome::Emitted {
            bit: 0,
            lit: true,
            changed: false
        }
    );
    assert_eq!(
        player.cursor().map(|cursor| cursor.phase),
        Some(BitPhase::Holding { since: 5_000 })
    );

    // A full window is held again before bit 1 takes over.
    run_until(&mut player, &clock, 5_100);
    assert!(player.is_lit());
    run_until(&mut player, &clock, 5_102);
    assert!(!player.is_lit());
}

#[test]
fn paused_player_keeps_identical_pattern_and_restarts_on_a_new_one() {
    let (mut player, clock) = player();
    player.set_pattern(presets::SPEED_MEDIUM);
    run_until(&mut player, &clock, 250);
    player.pause();
    let cursor = player.cursor();
    let writes = player.line().writes.len();

    assert_eq!(
        player.set_pattern(presets::SPEED_MEDIUM),
        CommandStatus::Unchanged
    );
    assert_eq!(player.phase(), PlaybackPhase::Paused);
    run_until(&mut player, &clock, 1_000);
    assert_eq!(player.cursor(), cursor);
    assert_eq!(player.line().writes.len(), writes);

    assert_eq!(
        player.set_pattern(presets::SPEED_SLOW),
        CommandStatus::Applied
    );
    assert_eq!(player.phase(), PlaybackPhase::StartNew);
    assert_eq!(player.cursor(), None);
    player.step();
    assert_eq!(player.cursor().map(|cursor| cursor.bit), Some(0));
}

#[test]
fn set_on_and_off_override_patterns() {
    let (mut player, clock) = player();
    player.set_pattern(presets::SPEED_FAST);
    run_until(&mut player, &clock, 10);

    player.set_off();
    assert!(!player.is_busy());
    assert!(!player.is_lit());
    run_until(&mut player, &clock, 1_000);
    assert!(!player.is_lit());

    player.set_on();
    run_until(&mut player, &clock, 2_000);
    assert!(player.is_lit());
    assert_eq!(
        player.line().writes.last().copied(),
        Some((1_000, Level::High))
    );
}

#[test]
fn active_low_wiring_inverts_levels() {
    let (mut player, clock) = player_at(0, ActivePolarity::ActiveLow);
    assert_eq!(player.line().writes, vec![(0, Level::High)]);

    player.set_pattern(Pattern::with_timing(0b01, 2, 10, 1));
    run_until(&mut player, &clock, 100);
    assert_eq!(
        writes_since_boot(&player),
        &[(0, Level::Low), (12, Level::High)]
    );
}

#[test]
fn playback_survives_clock_wraparound() {
    let start = u32::MAX - 150;
    let (mut player, clock) = player_at(start, ActivePolarity::ActiveHigh);
    player.set_pattern(Pattern::with_timing(0b01, 2, 100, 0));

    run_until(&mut player, &clock, start.wrapping_add(300));
    assert_eq!(
        writes_since_boot(&player),
        &[
            (start, Level::High),
            (start.wrapping_add(102), Level::Low),
            (start.wrapping_add(204), Level::High),
        ]
    );
}
