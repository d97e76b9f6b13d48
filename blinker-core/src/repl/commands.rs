//! Command dispatcher.
//!
//! Glues parsed commands to a [`PatternPlayer`]. The player keeps its silent
//! rejection semantics; the dispatcher simply passes the resulting
//! [`CommandStatus`] back so an interactive host can show it.

use core::fmt;
use core::time::Duration;

use crate::line::{LedLine, MillisClock};
use crate::pattern::{ALL_PRESETS, Preset};
use crate::player::{CommandStatus, PatternPlayer};

use super::grammar::{self, Command, GrammarError};
use super::status::StatusSnapshot;

/// Command execution successes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommandOutcome {
    /// A player command ran; `status` says whether it took effect.
    Control {
        command: Command,
        status: CommandStatus,
    },
    Status(StatusSnapshot),
    Presets(&'static [Preset]),
    /// The host should run its clock forward by this much.
    Advance(Duration),
}

/// Errors surfaced while executing a command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError<'a> {
    Parse(GrammarError<'a>),
}

impl<'a> From<GrammarError<'a>> for CommandError<'a> {
    fn from(error: GrammarError<'a>) -> Self {
        Self::Parse(error)
    }
}

impl fmt::Display for CommandError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(err) => err.fmt(f),
        }
    }
}

/// Parses command lines and applies them to the owned player.
pub struct CommandExecutor<L, C> {
    player: PatternPlayer<L, C>,
}

impl<L, C> CommandExecutor<L, C>
where
    L: LedLine,
    C: MillisClock,
{
    pub fn new(player: PatternPlayer<L, C>) -> Self {
        Self { player }
    }

    pub fn player(&self) -> &PatternPlayer<L, C> {
        &self.player
    }

    /// Mutable access for the host loop that drives `step()`.
    pub fn player_mut(&mut self) -> &mut PatternPlayer<L, C> {
        &mut self.player
    }

    pub fn into_player(self) -> PatternPlayer<L, C> {
        self.player
    }

    /// Parses and applies one line.
    pub fn execute<'a>(&mut self, line: &'a str) -> Result<CommandOutcome, CommandError<'a>> {
        let command = grammar::parse(line)?;
        Ok(self.apply(command))
    }

    /// Applies an already parsed command.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let player = &mut self.player;
        let status = match command {
            Command::SetPattern(request) => player.set_pattern(request.pattern()),
            Command::On => player.set_on(),
            Command::Off => player.set_off(),
            Command::Lock => {
                player.lock(true);
                CommandStatus::Applied
            }
            Command::Unlock => {
                player.lock(false);
                CommandStatus::Applied
            }
            Command::Pause => player.pause(),
            Command::Resume => player.resume(),
            Command::Status => return CommandOutcome::Status(StatusSnapshot::capture(player)),
            Command::Presets => return CommandOutcome::Presets(&ALL_PRESETS),
            Command::Advance(by) => return CommandOutcome::Advance(by),
        };
        CommandOutcome::Control { command, status }
    }
}
