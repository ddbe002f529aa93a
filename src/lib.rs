//! Pong with a deterministic simulation core shared by three drivers:
//! interactive play, neuro-evolution training and replay of a trained network.

pub mod audio;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod logging;
pub mod network;
pub mod policy;
pub mod render;
pub mod sim;
pub mod training;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};
