//! Straight-line prediction of where the ball will cross a paddle's plane.

use glam::Vec2;

use crate::config::FieldConfig;

/// Predicted path: one segment, or two when the ball meets a wall first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub start: Vec2,
    pub first: Vec2,
    pub bounce: Option<Vec2>,
}

impl Trajectory {
    /// Predicted vertical position at the end of the path.
    pub fn y(&self) -> f32 {
        self.end().y
    }

    pub fn end(&self) -> Vec2 {
        self.bounce.unwrap_or(self.first)
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> {
        let first = (self.start, self.first);
        let second = self.bounce.map(|end| (self.first, end));
        std::iter::once(first).chain(second)
    }
}

/// Projects `pos` along `vel` until it reaches either the target paddle's
/// x-plane or a wall, whichever is nearer. Returns the end point and whether
/// the wall came first.
fn project(pos: Vec2, vel: Vec2, field: &FieldConfig) -> (Vec2, bool) {
    let x_steps = if vel.x > 0.0 {
        (field.width - field.paddle_offset - pos.x) / vel.x
    } else {
        (pos.x - field.paddle_offset) / -vel.x
    };

    let y_steps = if vel.y > 0.0 {
        (field.height - pos.y) / vel.y
    } else if vel.y < 0.0 {
        pos.y / -vel.y
    } else {
        // Level flight always reaches the paddle. Using zero here would make
        // min() pick the wall branch.
        x_steps
    };

    let steps = x_steps.min(y_steps);
    (pos + vel * steps, x_steps > y_steps)
}

/// Predicts the ball's path toward the paddle it is moving at, allowing one bounce.
pub fn predict(pos: Vec2, vel: Vec2, field: &FieldConfig) -> Trajectory {
    let (first, hit_wall) = project(pos, vel, field);
    let bounce = hit_wall.then(|| project(first, Vec2::new(vel.x, -vel.y), field).0);
    Trajectory {
        start: pos,
        first,
        bounce,
    }
}
