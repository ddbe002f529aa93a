//! Drawing in field coordinates.
//!
//! The simulation knows nothing about terminals: a frame is a list of filled
//! rectangles, ellipses, lines and text in the 800×500 field space (y grows
//! downwards), handed to whatever [`Surface`] the front end provides.

use glam::Vec2;

use crate::sim::{predict, Match, Side};

/// Semantic colour roles, mapped to real colours by the front end's theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Paddle,
    Ball,
    Divider,
    Score,
    Trajectory,
    HitCounter,
    Text,
}

/// Horizontal anchoring of a text run relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Centre,
    Right,
}

pub trait Surface {
    /// `min` is the top-left corner.
    fn fill_rect(&mut self, min: Vec2, size: Vec2, ink: Ink);
    fn fill_ellipse(&mut self, centre: Vec2, radii: Vec2, ink: Ink);
    fn line(&mut self, from: Vec2, to: Vec2, ink: Ink);
    fn text(&mut self, at: Vec2, text: &str, align: Align, ink: Ink);
    fn present(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect { min: Vec2, size: Vec2, ink: Ink },
    Ellipse { centre: Vec2, radii: Vec2, ink: Ink },
    Line { from: Vec2, to: Vec2, ink: Ink },
    Text { at: Vec2, text: String, align: Align, ink: Ink },
}

/// A recorded frame. Drawing appends, `present` closes the frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    frames: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for Scene {
    fn fill_rect(&mut self, min: Vec2, size: Vec2, ink: Ink) {
        self.primitives.push(Primitive::Rect { min, size, ink });
    }

    fn fill_ellipse(&mut self, centre: Vec2, radii: Vec2, ink: Ink) {
        self.primitives.push(Primitive::Ellipse { centre, radii, ink });
    }

    fn line(&mut self, from: Vec2, to: Vec2, ink: Ink) {
        self.primitives.push(Primitive::Line { from, to, ink });
    }

    fn text(&mut self, at: Vec2, text: &str, align: Align, ink: Ink) {
        self.primitives.push(Primitive::Text {
            at,
            text: text.to_string(),
            align,
            ink,
        });
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

/// Optional extras drawn on top of the match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlay {
    pub trajectory: bool,
    pub generation: Option<u32>,
    pub hits: bool,
}

const SCORE_GAP: f32 = 20.0;
const HUD_TOP: f32 = 10.0;

/// Draws one frame of `game`. Does not call `present`.
pub fn draw_match(game: &Match, overlay: &Overlay, surface: &mut dyn Surface) {
    let field = &game.field;
    let mid = field.width / 2.0;

    surface.line(Vec2::new(mid, 0.0), Vec2::new(mid, field.height), Ink::Divider);

    for side in Side::BOTH {
        let paddle = game.paddle(side);
        surface.fill_rect(
            Vec2::new(paddle.left(), paddle.top()),
            Vec2::new(paddle.width, paddle.length),
            Ink::Paddle,
        );
    }

    let ball = &game.ball;
    surface.fill_ellipse(ball.centre, Vec2::splat(ball.size / 2.0), Ink::Ball);

    surface.text(
        Vec2::new(mid - SCORE_GAP, HUD_TOP),
        &game.score(Side::Left).to_string(),
        Align::Right,
        Ink::Score,
    );
    surface.text(
        Vec2::new(mid + SCORE_GAP, HUD_TOP),
        &game.score(Side::Right).to_string(),
        Align::Left,
        Ink::Score,
    );

    if overlay.trajectory {
        for (from, to) in predict(ball.centre, ball.vel, field).segments() {
            surface.line(from, to, Ink::Trajectory);
        }
    }
    if let Some(generation) = overlay.generation {
        surface.text(
            Vec2::new(10.0, HUD_TOP),
            &format!("Gen: {generation}"),
            Align::Left,
            Ink::Text,
        );
    }
    if overlay.hits {
        surface.text(
            Vec2::new(field.width / 4.0, HUD_TOP),
            &format!("Hits: {}", game.total_hits()),
            Align::Left,
            Ink::HitCounter,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn frame_has_divider_paddles_ball_and_scores() {
        let mut game = Match::new(&Config::interactive(), 0);
        game.scores = [3, 7];
        let mut scene = Scene::new();
        draw_match(&game, &Overlay::default(), &mut scene);

        let rects = scene
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count();
        assert_eq!(rects, 2);
        assert!(scene.primitives().contains(&Primitive::Ellipse {
            centre: Vec2::new(400.0, 250.0),
            radii: Vec2::splat(7.5),
            ink: Ink::Ball,
        }));
        assert_eq!(scene.texts().collect::<Vec<_>>(), ["3", "7"]);
        assert_eq!(scene.frames(), 0);
    }

    #[test]
    fn left_paddle_is_drawn_from_its_top_left_corner() {
        let game = Match::new(&Config::interactive(), 0);
        let mut scene = Scene::new();
        draw_match(&game, &Overlay::default(), &mut scene);
        assert!(scene.primitives().contains(&Primitive::Rect {
            min: Vec2::new(15.0, 200.0),
            size: Vec2::new(20.0, 100.0),
            ink: Ink::Paddle,
        }));
    }

    #[test]
    fn overlay_adds_trajectory_and_counters() {
        let mut game = Match::new(&Config::interactive(), 0);
        game.paddles[0].hits = 2;
        game.paddles[1].hits = 3;
        let overlay = Overlay {
            trajectory: true,
            generation: Some(4),
            hits: true,
        };
        let mut scene = Scene::new();
        draw_match(&game, &overlay, &mut scene);

        let trajectory = scene
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Line { ink: Ink::Trajectory, .. }))
            .count();
        assert!(trajectory >= 1);
        let texts: Vec<_> = scene.texts().collect();
        assert!(texts.contains(&"Gen: 4"));
        assert!(texts.contains(&"Hits: 5"));
    }

    #[test]
    fn present_counts_frames() {
        let mut scene = Scene::new();
        scene.present();
        scene.present();
        assert_eq!(scene.frames(), 2);
    }
}
