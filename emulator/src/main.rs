mod interactive;
mod render;
mod replay;

use std::env;
use std::io::{self, Write};
use std::process;

use speedtrap_core::config::DEFAULT_TRAP_CONFIG;

use replay::Pass;

const USAGE: &str = "Usage: speedtrap-emulator | speedtrap-emulator --replay <entry-ms> <exit-ms> [...]";

#[derive(Debug, Eq, PartialEq)]
enum Mode {
    Interactive,
    Replay(Vec<Pass>),
}

fn main() -> io::Result<()> {
    let mode = parse_mode(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let config = DEFAULT_TRAP_CONFIG;
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {err}");
        process::exit(1);
    }

    match mode {
        Mode::Interactive => interactive::run(config),
        Mode::Replay(passes) => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            let reports = replay::replay(&config, &passes);
            if reports.is_empty() {
                writeln!(writer, "No captures completed.")?;
            }
            for report in &reports {
                writeln!(writer, "{}", replay::describe(report))?;
            }
            Ok(())
        }
    }
}

fn parse_mode<I>(args: I) -> Result<Mode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    match args.next() {
        None => Ok(Mode::Interactive),
        Some(arg) if arg == "--replay" => {
            let values: Vec<String> = args.collect();
            replay::parse_passes(&values).map(Mode::Replay)
        }
        Some(arg) => Err(format!("Unknown argument `{arg}`")),
    }
}
