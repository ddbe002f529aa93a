use glam::Vec2;
use rand::Rng;

use crate::config::BallConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub centre: Vec2,
    pub vel: Vec2,
    /// Side of the bounding box
    pub size: f32,
    pub max_vel: f32,
    serve_y_range: i32,
    serve_allows_zero: bool,
}

impl Ball {
    pub fn new(centre: Vec2, vel: Vec2, config: &BallConfig) -> Self {
        Self {
            centre,
            vel,
            size: config.size,
            max_vel: config.max_vel,
            serve_y_range: config.serve_y_range,
            serve_allows_zero: config.serve_allows_zero,
        }
    }

    pub fn top(&self) -> f32 {
        self.centre.y - self.size / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.centre.y + self.size / 2.0
    }

    pub fn left(&self) -> f32 {
        self.centre.x - self.size / 2.0
    }

    pub fn right(&self) -> f32 {
        self.centre.x + self.size / 2.0
    }

    pub fn move_once(&mut self) {
        self.centre += self.vel;
    }

    /// Re-centres the ball with a fresh vertical speed. `x_vel` is left to the caller.
    pub fn reset<R: Rng>(&mut self, centre: Vec2, rng: &mut R) {
        self.centre = centre;
        self.vel.y = self.serve_y_vel(rng);
    }

    pub fn serve_y_vel<R: Rng>(&self, rng: &mut R) -> f32 {
        let range = self.serve_y_range;
        loop {
            let y = rng.random_range(-range..=range);
            if y != 0 || self.serve_allows_zero {
                return y as f32;
            }
        }
    }

    /// Sends the ball horizontally at full speed, `sign` > 0 meaning right.
    pub fn launch(&mut self, sign: f32) {
        self.vel.x = sign.signum() * self.max_vel;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn box_is_centred() {
        let ball = Ball::new(Vec2::new(400.0, 250.0), Vec2::ZERO, &BallConfig::default());
        assert_eq!(ball.left(), 392.5);
        assert_eq!(ball.right(), 407.5);
        assert_eq!(ball.top(), 242.5);
        assert_eq!(ball.bottom(), 257.5);
    }

    #[test]
    fn move_adds_velocity() {
        let mut ball = Ball::new(
            Vec2::new(400.0, 250.0),
            Vec2::new(-7.0, 2.0),
            &BallConfig::default(),
        );
        ball.move_once();
        assert_eq!(ball.centre, Vec2::new(393.0, 252.0));
    }

    #[test]
    fn serves_stay_in_range_and_skip_zero_when_asked() {
        let config = BallConfig {
            serve_allows_zero: false,
            ..BallConfig::default()
        };
        let ball = Ball::new(Vec2::ZERO, Vec2::ZERO, &config);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let y = ball.serve_y_vel(&mut rng);
            assert!(y != 0.0);
            assert!((-3.0..=3.0).contains(&y));
        }
    }

    #[test]
    fn reset_keeps_horizontal_speed() {
        let mut ball = Ball::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(7.0, 5.5),
            &BallConfig::default(),
        );
        let mut rng = Pcg32::seed_from_u64(1);
        ball.reset(Vec2::new(400.0, 250.0), &mut rng);
        assert_eq!(ball.centre, Vec2::new(400.0, 250.0));
        assert_eq!(ball.vel.x, 7.0);
        assert!(ball.vel.y.abs() <= 3.0);
    }
}
