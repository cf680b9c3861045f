//! Interactive driver for the wait event device.
//!
//! Reads commands from stdin:
//! - `cat <attr>`
//! - `echo <value> > <attr>` or `store <attr> <value>`
//! - `interrupt benign|fatal`
//! - `quit`

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use wait_event::{Attribute, Config, ControlError, Interrupt, WaitEventDevice};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the pause after each wakeup, in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,
}

enum Command {
    Show(Attribute),
    Store(Attribute, String),
    Interrupt(Interrupt),
    Quit,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    wait_event::logging::init()?;
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(pause_ms) = args.pause_ms {
        config.pause_ms = pause_ms;
        config.validate()?;
    }

    let device = WaitEventDevice::start(config)?;
    println!("attributes: condition, thread_status, stats, trigger_wakeup");
    println!("try: echo 1 > trigger_wakeup");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Show(attr)) => match device.control().show(attr) {
                Ok(text) => print!("{text}"),
                Err(err) => eprintln!("{err}"),
            },
            Ok(Command::Store(attr, value)) => {
                if let Err(err) = device.control().store(attr, &value) {
                    eprintln!("{err}");
                }
            }
            Ok(Command::Interrupt(kind)) => device.interrupt(kind),
            Ok(Command::Quit) => break,
            Err(msg) => eprintln!("{msg}"),
        }
        stdout.flush()?;
    }

    device.stop();
    Ok(())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["cat", attr] => Ok(Command::Show(attribute(attr)?)),
        ["echo", value, ">", attr] => Ok(Command::Store(attribute(attr)?, format!("{value}\n"))),
        ["store", attr, value] => Ok(Command::Store(attribute(attr)?, format!("{value}\n"))),
        ["interrupt", "benign"] => Ok(Command::Interrupt(Interrupt::Benign)),
        ["interrupt", "fatal"] => Ok(Command::Interrupt(Interrupt::Fatal)),
        ["quit"] | ["exit"] => Ok(Command::Quit),
        _ => Err(format!("unrecognized command: {line}")),
    }
}

fn attribute(name: &str) -> Result<Attribute, String> {
    name.parse().map_err(|err: ControlError| err.to_string())
}
