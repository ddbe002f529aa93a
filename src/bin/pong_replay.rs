use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use pong::{
    audio::TerminalBell,
    logging::{self, Sink},
    network::Network,
    tui::{App, MenuEntry, Opponent, Session},
    Config, Result,
};

#[derive(Parser)]
#[command(name = "pong-replay")]
#[command(about = "Play against a trained network", long_about = None)]
struct Cli {
    /// Network saved by pong-train
    #[arg(default_value = "winner.json")]
    policy: PathBuf,

    /// JSON config laid over the replay defaults
    #[arg(long)]
    config: Option<PathBuf>,

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
        Some(path) => Config::load_over(path, Config::replay())?,
        None => Config::replay(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let network = Network::load(&cli.policy)?;
    log::info!(
        "loaded {} ({} hidden nodes)",
        cli.policy.display(),
        network.hidden()
    );

    let entries = vec![MenuEntry {
        label: "Vs. Trained AI",
        opponent: Opponent::Network(network),
    }];
    let audio = Box::new(TerminalBell::new(io::stdout(), config.bell));

    let mut session = Session::start()?;
    let mut app = App::new(config, entries, audio, session.key_releases())
        .with_trajectory(cli.trajectory);
    let result = app.run(session.terminal());
    drop(session);
    result?;

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
            eprintln!("pong-replay: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
