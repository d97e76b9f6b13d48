#![allow(clippy::module_name_repetitions)]

//! Parser for the line-oriented LED control language.
//!
//! The grammar is small enough to parse straight off the `&str` with `winnow`
//! combinators, which keeps it allocation free for the firmware target:
//!
//! ```text
//! pattern <preset-name>
//! pattern <bits> [len=<n>] [ms=<n>] [reps=<n>]
//! on | off | lock | unlock | pause | resume | status | presets
//! advance <n>[ms|s]
//! ```

use core::fmt;
use core::time::Duration;

use winnow::ascii::{dec_uint, space0, space1};
use winnow::combinator::{alt, opt, preceded, separated_pair};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::pattern::{Pattern, Preset};

type PResult<O> = Result<O, ErrMode<ContextError>>;

/// Grammar errors, borrowing the offending text from the input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarError<'a> {
    /// The line held nothing but whitespace.
    Empty,
    UnknownCommand(&'a str),
    UnknownPreset(&'a str),
    UnknownOption(&'a str),
    /// A value did not fit the field it was assigned to.
    OutOfRange { key: &'static str, value: u32 },
    /// A token of the given shape was expected at byte `offset`.
    Expected { expected: &'static str, offset: usize },
    /// The command parsed but text remained after it.
    Trailing(&'a str),
}

impl fmt::Display for GrammarError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Empty => f.write_str("empty command"),
            GrammarError::UnknownCommand(word) => write!(f, "unknown command `{word}`"),
            GrammarError::UnknownPreset(word) => write!(f, "unknown preset `{word}`"),
            GrammarError::UnknownOption(word) => write!(f, "unknown option `{word}`"),
            GrammarError::OutOfRange { key, value } => {
                write!(f, "{key}={value} is out of range")
            }
            GrammarError::Expected { expected, offset } => {
                write!(f, "expected {expected} at column {offset}")
            }
            GrammarError::Trailing(rest) => write!(f, "unexpected trailing input `{rest}`"),
        }
    }
}

/// Pattern selected by a `pattern` command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatternRequest {
    Preset(Preset),
    Custom(Pattern),
}

impl PatternRequest {
    #[must_use]
    pub const fn pattern(self) -> Pattern {
        match self {
            PatternRequest::Preset(preset) => preset.pattern(),
            PatternRequest::Custom(pattern) => pattern,
        }
    }
}

/// Structured commands produced by the parser.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    SetPattern(PatternRequest),
    On,
    Off,
    Lock,
    Unlock,
    Pause,
    Resume,
    Status,
    Presets,
    /// Host-side request to run the clock forward.
    Advance(Duration),
}

impl Command {
    /// Leading keyword, as typed.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Command::SetPattern(_) => "pattern",
            Command::On => "on",
            Command::Off => "off",
            Command::Lock => "lock",
            Command::Unlock => "unlock",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Status => "status",
            Command::Presets => "presets",
            Command::Advance(_) => "advance",
        }
    }
}

/// Parses one command line.
pub fn parse(line: &str) -> Result<Command, GrammarError<'_>> {
    let source = line.trim();
    if source.is_empty() {
        return Err(GrammarError::Empty);
    }
    let mut input = source;

    let keyword = run(word, &mut input, source, "command")?;
    let command = match_keyword(keyword, &mut input, source)?;

    let _ = run(space0, &mut input, source, "end of line")?;
    if !input.is_empty() {
        return Err(GrammarError::Trailing(input));
    }
    Ok(command)
}

fn match_keyword<'a>(
    keyword: &'a str,
    input: &mut &'a str,
    source: &'a str,
) -> Result<Command, GrammarError<'a>> {
    const SIMPLE: [(&str, Command); 8] = [
        ("on", Command::On),
        ("off", Command::Off),
        ("lock", Command::Lock),
        ("unlock", Command::Unlock),
        ("pause", Command::Pause),
        ("resume", Command::Resume),
        ("status", Command::Status),
        ("presets", Command::Presets),
    ];

    if keyword.eq_ignore_ascii_case("pattern") {
        return pattern_request(input, source).map(Command::SetPattern);
    }
    if keyword.eq_ignore_ascii_case("advance") {
        let _ = run(space1, input, source, "whitespace")?;
        return run(duration, input, source, "duration").map(Command::Advance);
    }
    SIMPLE
        .iter()
        .find(|(name, _)| keyword.eq_ignore_ascii_case(name))
        .map(|(_, command)| *command)
        .ok_or(GrammarError::UnknownCommand(keyword))
}

fn pattern_request<'a>(
    input: &mut &'a str,
    source: &'a str,
) -> Result<PatternRequest, GrammarError<'a>> {
    let _ = run(space1, input, source, "whitespace")?;

    if !input.starts_with(|c: char| c.is_ascii_digit()) {
        let name = run(word, input, source, "preset name")?;
        return Preset::from_name(name)
            .map(PatternRequest::Preset)
            .ok_or(GrammarError::UnknownPreset(name));
    }

    let mut pattern = Pattern::new(run(bits_literal, input, source, "bit mask")?);
    while !input.trim_start().is_empty() {
        let _ = run(space1, input, source, "whitespace")?;
        let (key, value) = run(option, input, source, "key=value")?;
        pattern = apply_option(pattern, key, value)?;
    }
    Ok(PatternRequest::Custom(pattern))
}

fn apply_option(pattern: Pattern, key: &str, value: u32) -> Result<Pattern, GrammarError<'_>> {
    let narrow = |field: &'static str| {
        u8::try_from(value).map_err(|_| GrammarError::OutOfRange { key: field, value })
    };

    if key.eq_ignore_ascii_case("len") || key.eq_ignore_ascii_case("length") {
        Ok(pattern.length(narrow("len")?))
    } else if key.eq_ignore_ascii_case("ms") {
        Ok(pattern.msecs_per_bit(value))
    } else if key.eq_ignore_ascii_case("reps") || key.eq_ignore_ascii_case("repetitions") {
        Ok(pattern.repetitions(narrow("reps")?))
    } else {
        Err(GrammarError::UnknownOption(key))
    }
}

/// Runs `parser`, reporting failures as `expected` at the current column.
fn run<'a, O>(
    mut parser: impl Parser<&'a str, O, ErrMode<ContextError>>,
    input: &mut &'a str,
    source: &'a str,
    expected: &'static str,
) -> Result<O, GrammarError<'a>> {
    let offset = source.len() - input.len();
    parser
        .parse_next(input)
        .map_err(|_| GrammarError::Expected { expected, offset })
}

fn word<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    })
    .parse_next(input)
}

fn number(input: &mut &str) -> PResult<u32> {
    dec_uint.parse_next(input)
}

fn bits_literal(input: &mut &str) -> PResult<u32> {
    alt((
        preceded(alt(("0b", "0B")), take_while(1.., ('0', '1')))
            .try_map(|digits: &str| u32::from_str_radix(digits, 2)),
        preceded(
            alt(("0x", "0X")),
            take_while(1.., |c: char| c.is_ascii_hexdigit()),
        )
        .try_map(|digits: &str| u32::from_str_radix(digits, 16)),
        number,
    ))
    .parse_next(input)
}

fn option<'a>(input: &mut &'a str) -> PResult<(&'a str, u32)> {
    separated_pair(word, "=", number).parse_next(input)
}

fn duration(input: &mut &str) -> PResult<Duration> {
    (number, opt(alt(("ms", "s"))))
        .map(|(value, unit)| match unit {
            Some("s") => Duration::from_secs(u64::from(value)),
            _ => Duration::from_millis(u64::from(value)),
        })
        .parse_next(input)
}
