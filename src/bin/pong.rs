use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use pong::{
    audio::TerminalBell,
    logging::{self, Sink},
    tui::{App, MenuEntry, Opponent, Session},
    Config, Result,
};

#[derive(Parser)]
#[command(name = "pong")]
#[command(about = "Play Pong in the terminal against a friend or the computer", long_about = None)]
struct Cli {
    /// JSON config laid over the interactive defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed seed for serves
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the predicted ball path shown
    #[arg(long)]
    trajectory: bool,

    /// Write logs here (the terminal is busy with the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let sink = cli.log_file.as_deref().map_or(Sink::Off, Sink::File);
    logging::init(sink, "info")?;

    let mut config = match &cli.config {
        Some(path) => Config::load_over(path, Config::interactive())?,
        None => Config::interactive(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let entries = vec![
        MenuEntry {
            label: "Vs. Player",
            opponent: Opponent::Human,
        },
        MenuEntry {
            label: "Vs. Comp",
            opponent: Opponent::Computer,
        },
    ];
    let audio = Box::new(TerminalBell::new(io::stdout(), config.bell));

    let mut session = Session::start()?;
    let mut app = App::new(config, entries, audio, session.key_releases())
        .with_trajectory(cli.trajectory);
    let result = app.run(session.terminal());
    drop(session);
    result?;

    println!("Thanks for playing terminal.pong!");
    if let Some(last) = app.last_result() {
        println!("Final Score: {} - {}", last.scores[0], last.scores[1]);
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("pong: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
