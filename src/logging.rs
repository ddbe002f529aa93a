use std::{fs::File, path::Path};

use env_logger::{Builder, Env, Target};

use crate::error::Result;

/// Where log records go.
#[derive(Debug, Clone, Copy)]
pub enum Sink<'a> {
    Stderr,
    /// A file; required while a terminal UI owns the screen.
    File(&'a Path),
    /// Nothing is logged.
    Off,
}

/// Installs the global logger. `RUST_LOG` overrides `default_filter`.
pub fn init(sink: Sink<'_>, default_filter: &str) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    match sink {
        Sink::Stderr => {
            builder.target(Target::Stderr);
        }
        Sink::File(path) => {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        Sink::Off => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    // a second init from tests is harmless
    let _ = builder.try_init();
    Ok(())
}
