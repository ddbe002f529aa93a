use glam::Vec2;

use crate::config::PaddleConfig;

/// Which way a paddle is asked to move. Screen coordinates: up is toward y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub centre: Vec2,
    pub width: f32,
    pub length: f32,
    pub speed: f32,
    pub hits: u32,
    home: Vec2,
}

impl Paddle {
    pub fn new(home: Vec2, config: &PaddleConfig) -> Self {
        Self {
            centre: home,
            width: config.width,
            length: config.length,
            speed: config.speed,
            hits: 0,
            home,
        }
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn top(&self) -> f32 {
        self.centre.y - self.length / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.centre.y + self.length / 2.0
    }

    pub fn left(&self) -> f32 {
        self.centre.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.centre.x + self.width / 2.0
    }

    /// Whether one step in `direction` keeps the paddle inside `0..=field_height`.
    pub fn can_move(&self, direction: Direction, field_height: f32) -> bool {
        match direction {
            Direction::Up => self.top() - self.speed >= 0.0,
            Direction::Down => self.bottom() + self.speed <= field_height,
        }
    }

    /// Moves one step. Bounds are the caller's concern, see [`Paddle::can_move`].
    pub fn move_by(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.centre.y -= self.speed,
            Direction::Down => self.centre.y += self.speed,
        }
    }

    pub fn reset(&mut self) {
        self.centre = self.home;
    }

    pub fn reset_hits(&mut self) {
        self.hits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paddle_at(y: f32) -> Paddle {
        Paddle::new(Vec2::new(25.0, y), &PaddleConfig::default())
    }

    #[test]
    fn edges_follow_the_centre() {
        let paddle = paddle_at(250.0);
        assert_eq!(paddle.top(), 200.0);
        assert_eq!(paddle.bottom(), 300.0);
        assert_eq!(paddle.left(), 15.0);
        assert_eq!(paddle.right(), 35.0);
    }

    #[test]
    fn move_does_not_clamp() {
        let mut paddle = paddle_at(50.0);
        paddle.move_by(Direction::Up);
        assert_eq!(paddle.top(), -7.0);
    }

    #[test]
    fn can_move_checks_the_resulting_position() {
        let paddle = paddle_at(57.0);
        assert!(paddle.can_move(Direction::Up, 500.0));
        let paddle = paddle_at(56.0);
        assert!(!paddle.can_move(Direction::Up, 500.0));
        let paddle = paddle_at(443.0);
        assert!(paddle.can_move(Direction::Down, 500.0));
        assert!(!paddle_at(444.0).can_move(Direction::Down, 500.0));
    }

    #[test]
    fn reset_returns_home() {
        let mut paddle = paddle_at(250.0);
        paddle.move_by(Direction::Down);
        paddle.move_by(Direction::Down);
        paddle.reset();
        assert_eq!(paddle.centre, Vec2::new(25.0, 250.0));
    }
}
