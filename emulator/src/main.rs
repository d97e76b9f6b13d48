mod session;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process;

use session::{Session, SessionProfile};

fn main() -> io::Result<()> {
    let profile = parse_profile(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: blinker-emulator [--profile <interactive|demo>]");
        process::exit(2);
    });

    let stdout = io::stdout();
    let mut session = Session::new(stdout.is_terminal());
    let mut writer = stdout.lock();

    if profile == SessionProfile::Demo {
        writeln!(writer, "LED Blinker Emulator demo: one cycle of virtual time.")?;
        return print_lines(&mut writer, session.run_demo());
    }

    writeln!(
        writer,
        "LED Blinker Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    prompt(&mut writer)?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        if is_exit(input) {
            writeln!(writer, "Session closed.")?;
            return Ok(());
        }
        print_lines(&mut writer, session.handle_command(input))?;
        prompt(&mut writer)?;
    }
    writeln!(writer)
}

fn prompt(writer: &mut impl Write) -> io::Result<()> {
    write!(writer, "> ")?;
    writer.flush()
}

fn print_lines(writer: &mut impl Write, lines: Vec<String>) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

fn is_exit(input: &str) -> bool {
    ["exit", "quit"]
        .iter()
        .any(|word| input.eq_ignore_ascii_case(word))
}

fn parse_profile(args: impl Iterator<Item = String>) -> Result<SessionProfile, String> {
    let args: Vec<String> = args.collect();
    match args.as_slice() {
        [] => Ok(SessionProfile::Interactive),
        [flag, tag] if flag == "--profile" => SessionProfile::from_tag(tag),
        [arg] => arg
            .strip_prefix("--profile=")
            .ok_or_else(|| format!("Unexpected argument `{arg}`"))
            .and_then(SessionProfile::from_tag),
        _ => Err("Expected a single `--profile <name>` option".to_string()),
    }
}
