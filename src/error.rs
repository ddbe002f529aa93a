use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures outside the simulation core: files, terminal, configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("could not set up the terminal: {0}")]
    Terminal(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 2 for anything that stops the program from starting, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io(_) => 1,
            Error::Json { .. }
            | Error::MissingFile(_)
            | Error::InvalidConfig(_)
            | Error::Terminal(_) => 2,
        }
    }
}
