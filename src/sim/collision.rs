//! Wall, goal and paddle collisions.
//!
//! Checks run in a fixed order each tick: walls, then goals, then the single
//! paddle the ball is travelling toward. Only the ball is mutated here; score
//! and hit bookkeeping is done by the caller from the returned events.

use glam::Vec2;
use rand::Rng;

use super::{ball::Ball, paddle::Paddle};
use crate::config::{FieldConfig, PaddleEdge, PhysicsConfig, ServeDirection, WallBounce};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Horizontal direction pointing at this side of the field.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Player number shown to humans.
    pub fn player(self) -> u8 {
        self.index() as u8 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    WallBounce,
    /// The given side won the point
    Score(Side),
    PaddleHit(Side),
}

/// Reflects the ball off the top or bottom wall. Returns true on a bounce.
pub fn bounce_off_walls(ball: &mut Ball, field: &FieldConfig, mode: WallBounce) -> bool {
    let bottom = match mode {
        WallBounce::LookAhead => ball.bottom() + ball.vel.y,
        WallBounce::PostMove => ball.bottom(),
    };
    if ball.top() <= 0.0 || bottom >= field.height {
        ball.vel.y = -ball.vel.y;
        return true;
    }
    false
}

/// The side that wins the point if the ball has fully left the field.
pub fn scorer(ball: &Ball, field: &FieldConfig) -> Option<Side> {
    if ball.right() <= 0.0 {
        Some(Side::Right)
    } else if ball.left() >= field.width {
        Some(Side::Left)
    } else {
        None
    }
}

/// Puts the ball back in the middle and launches it after `scorer` won a point.
pub fn serve<R: Rng>(
    ball: &mut Ball,
    scorer: Side,
    field: &FieldConfig,
    direction: ServeDirection,
    rng: &mut R,
) {
    ball.reset(field_centre(field), rng);
    let toward = match direction {
        ServeDirection::TowardScorer => scorer,
        ServeDirection::TowardConceder => scorer.opponent(),
    };
    ball.launch(toward.sign());
}

pub fn field_centre(field: &FieldConfig) -> Vec2 {
    Vec2::new((field.width / 2.0).floor(), (field.height / 2.0).floor())
}

/// The paddle the ball is heading for.
pub fn approached_side(ball: &Ball) -> Side {
    if ball.vel.x < 0.0 {
        Side::Left
    } else {
        Side::Right
    }
}

pub fn touches_paddle(ball: &Ball, paddle: &Paddle, side: Side, physics: &PhysicsConfig) -> bool {
    let cy = ball.centre.y;
    let within_length = match physics.paddle_edge {
        PaddleEdge::Forgiving => paddle.top() <= cy && cy <= paddle.bottom() + physics.forgiveness,
        PaddleEdge::Exact => paddle.top() <= cy && cy <= paddle.top() + paddle.length,
    };
    if !within_length {
        return false;
    }
    match side {
        Side::Left => paddle.right() >= ball.left(),
        Side::Right => {
            let reach = match physics.paddle_edge {
                PaddleEdge::Forgiving => ball.centre.x + ball.size,
                PaddleEdge::Exact => ball.left() + ball.size,
            };
            paddle.left() <= reach
        }
    }
}

/// Sends the ball back with a vertical speed set by where it struck the paddle.
///
/// A hit dead centre leaves `y_vel` at zero; a hit at either end gives
/// `|y_vel| == max_vel`, upward on the top half and downward on the bottom half.
pub fn deflect(ball: &mut Ball, paddle: &Paddle) {
    ball.launch(-ball.vel.x);
    let offset = paddle.centre.y - ball.centre.y;
    ball.vel.y = -(offset / (paddle.length / 2.0)) * ball.max_vel;
}

/// Runs every collision check for one tick and reports what happened.
pub fn resolve<R: Rng>(
    ball: &mut Ball,
    paddles: &[Paddle; 2],
    field: &FieldConfig,
    physics: &PhysicsConfig,
    rng: &mut R,
    events: &mut Vec<Event>,
) {
    if bounce_off_walls(ball, field, physics.wall_bounce) {
        events.push(Event::WallBounce);
    }

    if let Some(side) = scorer(ball, field) {
        serve(ball, side, field, physics.serve_direction, rng);
        events.push(Event::Score(side));
    }

    let side = approached_side(ball);
    let paddle = &paddles[side.index()];
    if touches_paddle(ball, paddle, side, physics) {
        deflect(ball, paddle);
        events.push(Event::PaddleHit(side));
    }
}
