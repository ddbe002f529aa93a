use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::Alignment,
    style::Style,
    widgets::{Block, BorderType, Borders, Clear},
    DefaultTerminal,
};

use super::{canvas::render_scene, layout::framed_field, theme::GameTheme};
use crate::{
    render::{draw_match, Overlay, Scene, Surface},
    sim::Match,
    training::Watcher,
};

/// Shows training matches live, one frame per tick.
pub struct WatchWindow<'a> {
    terminal: &'a mut DefaultTerminal,
    theme: GameTheme,
    scene: Scene,
    frame_time: Duration,
    last_frame: Instant,
}

impl<'a> WatchWindow<'a> {
    pub fn new(terminal: &'a mut DefaultTerminal, fps: u32) -> Self {
        Self {
            terminal,
            theme: GameTheme::default(),
            scene: Scene::new(),
            frame_time: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last_frame: Instant::now(),
        }
    }

    /// Polls input until the next frame is due. False means quit.
    fn wait_for_frame(&mut self) -> bool {
        loop {
            let wait = self.frame_time.saturating_sub(self.last_frame.elapsed());
            match event::poll(wait) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => return false,
                        KeyCode::Char('d') => self.theme = self.theme.next(),
                        _ => {}
                    },
                    Ok(_) => {}
                    Err(err) => {
                        log::error!("reading terminal events failed: {err}");
                        return false;
                    }
                },
                Ok(false) => break,
                Err(err) => {
                    log::error!("polling terminal events failed: {err}");
                    return false;
                }
            }
        }
        self.last_frame = Instant::now();
        true
    }
}

impl Watcher for WatchWindow<'_> {
    fn frame(&mut self, game: &Match, generation: u32) -> bool {
        if !self.wait_for_frame() {
            return false;
        }

        let overlay = Overlay {
            trajectory: false,
            generation: Some(generation),
            hits: true,
        };
        self.scene.clear();
        draw_match(game, &overlay, &mut self.scene);
        self.scene.present();

        let colors = self.theme.colors();
        let scene = &self.scene;
        let field = game.field;
        let drawn = self.terminal.draw(|frame| {
            let game_area = framed_field(frame.area(), &field);
            let block = Block::default()
                .title(" training  |  q: stop ")
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .style(Style::default().fg(colors.border).bg(colors.background))
                .title_alignment(Alignment::Center);
            frame.render_widget(Clear, game_area);
            render_scene(frame, game_area, block, scene, &field, &colors);
        });
        if let Err(err) = drawn {
            log::error!("drawing the training view failed: {err}");
            return false;
        }
        true
    }
}
