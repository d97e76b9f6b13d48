#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! LED control surface bridging firmware tasks with `blinker-core`.
//!
//! A single task owns the [`LedController`] and therefore the player; every
//! other task reaches it by pushing [`Command`]s into the [`CommandQueue`].

use blinker_core::line::{LedLine, MillisClock};
use blinker_core::pattern::Pattern;
use blinker_core::player::{CommandStatus, PatternPlayer, StepOutcome};
use blinker_core::repl::commands::{CommandExecutor, CommandOutcome};
use blinker_core::repl::status::StatusSnapshot;
pub use blinker_core::repl::grammar::{Command, PatternRequest};
#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Duration;

use crate::status;

/// Depth of the command queue feeding the LED task.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Loop period of the LED task between `step()` calls.
pub const STEP_TICK: Duration = Duration::from_millis(1);

/// How often the demo task polls its schedule.
pub const DEMO_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How often the status task reports the mirrored player state.
pub const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(10);

#[cfg(target_os = "none")]
type LedMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type LedMutex = NoopRawMutex;

/// Queue used to hand commands to the LED task.
pub type CommandQueue = Channel<LedMutex, Command, COMMAND_QUEUE_DEPTH>;

/// Convenience sender type alias for the LED command queue.
pub type CommandSender<'a> = Sender<'a, LedMutex, Command, COMMAND_QUEUE_DEPTH>;

/// Convenience receiver type alias for the LED command queue.
pub type CommandReceiver<'a> = Receiver<'a, LedMutex, Command, COMMAND_QUEUE_DEPTH>;

/// Wraps a pattern so it can travel through the command queue.
pub const fn pattern_command(pattern: Pattern) -> Command {
    Command::SetPattern(PatternRequest::Custom(pattern))
}

/// Player plus the logging and status mirroring the firmware wants around it.
pub struct LedController<L, C> {
    executor: CommandExecutor<L, C>,
}

impl<L, C> LedController<L, C>
where
    L: LedLine,
    C: MillisClock,
{
    pub fn new(player: PatternPlayer<L, C>) -> Self {
        let controller = Self {
            executor: CommandExecutor::new(player),
        };
        controller.publish();
        controller
    }

    pub fn player(&self) -> &PatternPlayer<L, C> {
        self.executor.player()
    }

    /// Applies one command and logs the result.
    pub fn handle(&mut self, command: Command) -> CommandOutcome {
        let outcome = self.executor.apply(command);
        match outcome {
            CommandOutcome::Control { command, status } => log_control(command, status),
            CommandOutcome::Status(snapshot) => log_snapshot(&snapshot),
            CommandOutcome::Presets(_) | CommandOutcome::Advance(_) => {
                log_ignored(command.keyword());
            }
        }
        self.publish();
        outcome
    }

    /// Applies every command waiting in the queue. Returns how many ran.
    pub fn drain(&mut self, receiver: &CommandReceiver<'_>) -> usize {
        let mut handled = 0;
        while let Ok(command) = receiver.try_receive() {
            self.handle(command);
            handled += 1;
        }
        handled
    }

    /// Runs one playback step.
    pub fn tick(&mut self) -> StepOutcome {
        let outcome = self.executor.player_mut().step();
        if matches!(outcome, StepOutcome::Idle | StepOutcome::Holding) {
            return outcome;
        }
        if matches!(outcome, StepOutcome::Completed { .. }) {
            log_completed();
        }
        self.publish();
        outcome
    }

    fn publish(&self) {
        status::record(&StatusSnapshot::capture(self.executor.player()));
    }
}

const fn status_label(status: CommandStatus) -> &'static str {
    match status {
        CommandStatus::Applied => "applied",
        CommandStatus::Unchanged => "unchanged",
        CommandStatus::Rejected(reason) => reason.label(),
    }
}

fn log_control(command: Command, status: CommandStatus) {
    if let Command::SetPattern(request) = command {
        log_pattern(request.pattern(), status);
    } else if status.is_rejected() {
        log_rejected(command.keyword(), status_label(status));
    } else {
        log_command(command.keyword(), status_label(status));
    }
}

#[cfg(target_os = "none")]
fn log_pattern(pattern: Pattern, status: CommandStatus) {
    if status.is_rejected() {
        defmt::warn!(
            "led: pattern {=u32:#x} len={=u8} ms={=u32} rejected ({=str})",
            pattern.bits,
            pattern.length,
            pattern.msecs_per_bit,
            status_label(status)
        );
    } else {
        defmt::info!(
            "led: pattern {=u32:#x} len={=u8} ms={=u32} reps={=u8} {=str}",
            pattern.bits,
            pattern.length,
            pattern.msecs_per_bit,
            pattern.repetitions,
            status_label(status)
        );
    }
}

#[cfg(not(target_os = "none"))]
fn log_pattern(pattern: Pattern, status: CommandStatus) {
    println!("led: pattern {pattern} {}", status_label(status));
}

#[cfg(target_os = "none")]
fn log_command(keyword: &'static str, status: &'static str) {
    defmt::info!("led: {=str} {=str}", keyword, status);
}

#[cfg(not(target_os = "none"))]
fn log_command(keyword: &'static str, status: &'static str) {
    println!("led: {keyword} {status}");
}

#[cfg(target_os = "none")]
fn log_rejected(keyword: &'static str, reason: &'static str) {
    defmt::warn!("led: {=str} rejected ({=str})", keyword, reason);
}

#[cfg(not(target_os = "none"))]
fn log_rejected(keyword: &'static str, reason: &'static str) {
    println!("led: {keyword} rejected ({reason})");
}

#[cfg(target_os = "none")]
fn log_ignored(keyword: &'static str) {
    defmt::warn!("led: {=str} has no effect on firmware", keyword);
}

#[cfg(not(target_os = "none"))]
fn log_ignored(keyword: &'static str) {
    println!("led: {keyword} has no effect on firmware");
}

#[cfg(target_os = "none")]
fn log_snapshot(snapshot: &StatusSnapshot) {
    defmt::info!("led: {}", defmt::Display2Format(snapshot));
}

#[cfg(not(target_os = "none"))]
fn log_snapshot(snapshot: &StatusSnapshot) {
    println!("led: {snapshot}");
}

#[cfg(target_os = "none")]
fn log_completed() {
    defmt::info!("led: pattern complete, LED off");
}

#[cfg(not(target_os = "none"))]
fn log_completed() {
    println!("led: pattern complete, LED off");
}
