use std::io::Write;

use crate::config::BellMode;
use crate::sim::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    WallBounce,
    PaddleHit,
    Score,
}

impl Sound {
    pub fn for_event(event: Event) -> Sound {
        match event {
            Event::WallBounce => Sound::WallBounce,
            Event::PaddleHit(_) => Sound::PaddleHit,
            Event::Score(_) => Sound::Score,
        }
    }
}

/// Fire-and-forget sound output.
pub trait AudioSink {
    fn play(&mut self, sound: Sound);

    /// Starts the looping background track.
    fn start_music(&mut self) {}

    fn stop_music(&mut self) {}
}

/// Used for headless training.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: Sound) {}
}

/// Rings the terminal bell. A terminal has no way to loop a track, so music
/// is only logged.
pub struct TerminalBell<W: Write> {
    out: W,
    mode: BellMode,
    music: bool,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W, mode: BellMode) -> Self {
        Self {
            out,
            mode,
            music: false,
        }
    }

    fn rings(&self, sound: Sound) -> bool {
        match self.mode {
            BellMode::Off => false,
            BellMode::Score => sound == Sound::Score,
            BellMode::All => true,
        }
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, sound: Sound) {
        log::trace!("sound {:?}", sound);
        if self.rings(sound) {
            // a lost bell is not worth interrupting the frame for
            let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
        }
    }

    fn start_music(&mut self) {
        if !self.music {
            self.music = true;
            log::debug!("background music on");
        }
    }

    fn stop_music(&mut self) {
        if self.music {
            self.music = false;
            log::debug!("background music off");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Side;

    #[test]
    fn events_map_to_sounds() {
        assert_eq!(Sound::for_event(Event::WallBounce), Sound::WallBounce);
        assert_eq!(Sound::for_event(Event::PaddleHit(Side::Left)), Sound::PaddleHit);
        assert_eq!(Sound::for_event(Event::Score(Side::Right)), Sound::Score);
    }

    #[test]
    fn score_mode_rings_only_on_points() {
        let mut bell = TerminalBell::new(Vec::new(), BellMode::Score);
        bell.play(Sound::WallBounce);
        bell.play(Sound::PaddleHit);
        bell.play(Sound::Score);
        assert_eq!(bell.out, b"\x07");
    }

    #[test]
    fn off_mode_is_silent() {
        let mut bell = TerminalBell::new(Vec::new(), BellMode::Off);
        bell.play(Sound::Score);
        assert!(bell.out.is_empty());
    }
}
