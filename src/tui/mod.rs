//! Terminal front end: menus, the play field and the training view.

mod app;
mod canvas;
pub mod input;
pub mod layout;
pub mod theme;
mod watch;

use std::io;

use ratatui::DefaultTerminal;

pub use app::{App, MenuEntry, Opponent, RoundResult};
pub use watch::WatchWindow;

use crate::error::{Error, Result};

/// Raw mode and the alternate screen for as long as this lives.
pub struct Session {
    terminal: DefaultTerminal,
    key_releases: bool,
}

impl Session {
    pub fn start() -> Result<Self> {
        let terminal = ratatui::try_init().map_err(Error::Terminal)?;
        let key_releases = input::enable_key_releases(&mut io::stdout());
        log::debug!("terminal ready, key releases reported: {key_releases}");
        Ok(Self {
            terminal,
            key_releases,
        })
    }

    pub fn terminal(&mut self) -> &mut DefaultTerminal {
        &mut self.terminal
    }

    pub fn key_releases(&self) -> bool {
        self.key_releases
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.key_releases {
            if let Err(err) = input::disable_key_releases(&mut io::stdout()) {
                log::warn!("could not restore keyboard mode: {err}");
            }
        }
        ratatui::restore();
    }
}
