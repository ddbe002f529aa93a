use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use pong::{
    logging::{self, Sink},
    training::{Trainer, Watcher},
    tui::{Session, WatchWindow},
    Config, Error, Result,
};

#[derive(Parser)]
#[command(name = "pong-train")]
#[command(about = "Evolve a paddle network by playing genomes against each other", long_about = None)]
struct Cli {
    /// JSON config laid over the training defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    generations: Option<u32>,

    #[arg(long)]
    population: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Where the best network is written
    #[arg(long, default_value = "winner.json")]
    out: PathBuf,

    /// Directory for per-generation checkpoints
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Continue from a checkpoint file
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Show every match in the terminal, one at a time
    #[arg(long)]
    watch: bool,

    /// Worker threads for match evaluation (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Write logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let sink = match (&cli.log_file, cli.watch) {
        (Some(path), _) => Sink::File(path),
        (None, true) => Sink::Off,
        (None, false) => Sink::Stderr,
    };
    logging::init(sink, "info")?;

    let mut config = match &cli.config {
        Some(path) => Config::load_over(path, Config::training())?,
        None => Config::training(),
    };
    if let Some(generations) = cli.generations {
        config.training.generations = generations;
    }
    if let Some(population) = cli.population {
        config.training.population = population;
    }
    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|err| Error::InvalidConfig(format!("thread pool: {err}")))?;
    }

    let mut trainer = match &cli.resume {
        Some(checkpoint) => Trainer::resume(config, checkpoint)?,
        None => {
            log::info!("training from seed {seed}");
            Trainer::new(config, seed)?
        }
    };
    if let Some(dir) = cli.checkpoint_dir {
        trainer = trainer.checkpoint_into(dir);
    }

    let winner = if cli.watch {
        let mut session = Session::start()?;
        let mut window = WatchWindow::new(session.terminal(), 60);
        trainer.run(Some(&mut window as &mut dyn Watcher))?
    } else {
        trainer.run(None)?
    };

    match winner {
        Some(genome) => {
            log::info!("best genome {} with fitness {:.2}", genome.id, genome.fitness);
            genome.network.save(&cli.out)?;
            println!("saved best network to {}", cli.out.display());
        }
        None => println!("training stopped before a generation finished"),
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("pong-train: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
