use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use blinker_core::demo::{DEMO_CYCLE_MS, DEMO_STEPS, DemoSchedule};
use blinker_core::line::{ActivePolarity, NoopLine};
use blinker_core::pattern::{Pattern, Preset};
use blinker_core::player::{CommandStatus, PatternPlayer};
use blinker_core::repl::commands::{CommandError, CommandExecutor, CommandOutcome};
use blinker_core::repl::grammar::{Command, PatternRequest};
use blinker_core::telemetry::EventLog;
use crossterm::style::Stylize;

/// Longest stretch of virtual time a single `advance` may cover.
const MAX_ADVANCE: Duration = Duration::from_secs(600);

/// The emulated board sinks its LED, so a low level lights it.
const EMULATED_POLARITY: ActivePolarity = ActivePolarity::ActiveLow;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "pattern",
        "pattern <preset>|<bits> [len=<1-32>] [ms=<n>] [reps=<n>]  - start a pattern",
    ),
    ("on", "on | off                      - hold the LED, stopping any pattern"),
    ("lock", "lock | unlock                 - ignore or accept further commands"),
    ("pause", "pause | resume                - freeze or continue the running pattern"),
    ("advance", "advance <n>[ms|s]             - run the virtual clock forward"),
    ("status", "status                        - show player state"),
    ("presets", "presets                       - list named patterns"),
    ("help", "help [topic]                  - show help for a command"),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionProfile {
    Interactive,
    Demo,
}

impl SessionProfile {
    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("interactive") {
            Ok(Self::Interactive)
        } else if tag.eq_ignore_ascii_case("demo") {
            Ok(Self::Demo)
        } else {
            Err(format!("Unknown session profile `{tag}`"))
        }
    }
}

type VirtualClock = Box<dyn Fn() -> u32>;

pub struct Session {
    executor: CommandExecutor<NoopLine, VirtualClock>,
    clock: Rc<Cell<u32>>,
    events: EventLog,
    styled: bool,
}

impl Session {
    pub fn new(styled: bool) -> Self {
        let clock = Rc::new(Cell::new(0_u32));
        let reader = Rc::clone(&clock);
        let virtual_clock: VirtualClock = Box::new(move || reader.get());
        let player = PatternPlayer::new(NoopLine::new(), EMULATED_POLARITY, virtual_clock);

        Self {
            executor: CommandExecutor::new(player),
            clock,
            events: EventLog::new(),
            styled,
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        if trimmed.eq_ignore_ascii_case("help") {
            return handle_help(None);
        }
        if let Some(rest) = trimmed.strip_prefix("help ") {
            return handle_help(Some(rest.trim()));
        }

        let was_lit = self.executor.player().is_lit();
        match self.executor.execute(trimmed) {
            Ok(CommandOutcome::Control { command, status }) => {
                let mut lines = vec![describe_control(command, status)];
                // `on`/`off` write the line outside of `step()`.
                let lit = self.executor.player().is_lit();
                if lit != was_lit {
                    lines.push(self.render_transition(self.clock.get(), lit));
                }
                lines
            }
            Ok(CommandOutcome::Status(snapshot)) => vec![
                format!("OK {snapshot}"),
                format!(
                    "clock=+{}ms events={} dropped={}",
                    self.clock.get(),
                    self.events.len(),
                    self.events.dropped()
                ),
            ],
            Ok(CommandOutcome::Presets(presets)) => describe_presets(presets),
            Ok(CommandOutcome::Advance(duration)) => self.advance(duration),
            Err(CommandError::Parse(err)) => vec![format!("ERR syntax {err}")],
        }
    }

    /// Replays one full demo cycle, printing each step and every LED transition.
    pub fn run_demo(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut schedule = DemoSchedule::new(self.clock.get());
        let end = self.clock.get().wrapping_add(DEMO_CYCLE_MS);

        while self.clock.get() != end {
            if let Some(pattern) = schedule.poll(self.clock.get()) {
                self.executor
                    .apply(Command::SetPattern(PatternRequest::Custom(pattern)));
                lines.push(format!(
                    "+{}ms demo step {}/{} {pattern}",
                    self.clock.get(),
                    schedule.step() + 1,
                    DEMO_STEPS.len()
                ));
            }
            lines.extend(self.tick());
        }
        lines.push(format!("OK demo cycle finished at +{}ms", self.clock.get()));
        lines
    }

    fn advance(&mut self, duration: Duration) -> Vec<String> {
        if duration > MAX_ADVANCE {
            return vec![format!(
                "ERR advance limited to {}s",
                MAX_ADVANCE.as_secs()
            )];
        }
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);

        let mut lines = Vec::new();
        for _ in 0..millis {
            lines.extend(self.tick());
        }
        lines.push(format!("OK clock=+{}ms", self.clock.get()));
        lines
    }

    /// Steps the player at the current instant, then moves the clock on by 1 ms.
    /// Returns the rendered transition when the step wrote the line.
    fn tick(&mut self) -> Option<String> {
        let now = self.clock.get();
        let outcome = self.executor.player_mut().step();
        let stored = self.events.record(now, outcome);
        self.clock.set(now.wrapping_add(1));
        if !stored {
            return None;
        }
        let record = self.events.latest()?;
        let lit = record.line_change()?;
        Some(self.render_transition(record.at_ms, lit))
    }

    fn render_transition(&self, at_ms: u32, lit: bool) -> String {
        format!("+{at_ms}ms LED {}", self.led_glyph(lit))
    }

    fn led_glyph(&self, lit: bool) -> String {
        match (self.styled, lit) {
            (false, true) => "on".to_string(),
            (false, false) => "off".to_string(),
            (true, true) => format!("{} on", "●".yellow().bold()),
            (true, false) => format!("{} off", "○".dark_grey()),
        }
    }
}

fn handle_help(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) if !target.is_empty() => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        _ => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_control(command: Command, status: CommandStatus) -> String {
    let label = match command {
        Command::SetPattern(PatternRequest::Preset(preset)) => {
            format!("pattern {}", preset.name())
        }
        Command::SetPattern(PatternRequest::Custom(pattern)) => format!("pattern {pattern}"),
        other => other.keyword().to_string(),
    };
    match status {
        CommandStatus::Applied => format!("OK {label}"),
        CommandStatus::Unchanged => format!("OK {label} (unchanged)"),
        CommandStatus::Rejected(reason) => format!("ERR {label} rejected ({})", reason.label()),
    }
}

fn describe_presets(presets: &[Preset]) -> Vec<String> {
    presets
        .iter()
        .map(|preset| {
            let pattern: Pattern = preset.pattern();
            format!("{:<16} {pattern}", preset.name())
        })
        .collect()
}
