//! Paddle controllers.
//!
//! Humans, the built-in opponent and trained networks all drive a paddle
//! through [`Policy`], called once per tick with a read-only [`View`].

mod external;
mod heuristic;
mod keyboard;

pub use external::{Activate, NetworkPolicy};
pub use heuristic::HeuristicPolicy;
pub use keyboard::{Action, KeyQuery, KeyboardPolicy};

use crate::config::FieldConfig;
use crate::sim::{Ball, Event, Match, Paddle, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    Up,
    Down,
    #[default]
    Hold,
}

impl Decision {
    /// Output slot order used by networks: 0 up, 1 down, 2 hold.
    /// Anything else is treated as hold.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Decision::Up,
            1 => Decision::Down,
            _ => Decision::Hold,
        }
    }

    /// Picks the strongest output. Empty or non-finite outputs mean hold.
    pub fn from_outputs(outputs: &[f32]) -> Self {
        if outputs.is_empty() || outputs.iter().any(|v| !v.is_finite()) {
            return Decision::Hold;
        }
        let mut best = 0;
        for (i, value) in outputs.iter().enumerate() {
            if *value > outputs[best] {
                best = i;
            }
        }
        Decision::from_index(best)
    }
}

/// The three numbers a learned policy sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Top edge of the controlled paddle
    pub paddle_y: f32,
    pub ball_y: f32,
    pub horizontal_distance: f32,
}

impl Observation {
    pub fn as_array(&self) -> [f32; 3] {
        [self.paddle_y, self.ball_y, self.horizontal_distance]
    }
}

/// Read-only slice of the match handed to a policy.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub side: Side,
    pub paddle: &'a Paddle,
    pub ball: &'a Ball,
    pub field: &'a FieldConfig,
    pub tick: u64,
}

impl<'a> View<'a> {
    pub fn of(game: &'a Match, side: Side) -> Self {
        Self {
            side,
            paddle: game.paddle(side),
            ball: &game.ball,
            field: &game.field,
            tick: game.tick,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation {
            paddle_y: self.paddle.top(),
            ball_y: self.ball.centre.y,
            horizontal_distance: (self.paddle.left() - self.ball.centre.x).abs(),
        }
    }
}

pub trait Policy {
    fn decide(&mut self, view: &View<'_>) -> Decision;

    /// Called with every event of a tick after it has been simulated.
    fn observe(&mut self, _event: Event, _tick: u64) {}

    /// Called when the match restarts.
    fn reset(&mut self) {}
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn decide(&mut self, view: &View<'_>) -> Decision {
        (**self).decide(view)
    }

    fn observe(&mut self, event: Event, tick: u64) {
        (**self).observe(event, tick)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// A paddle that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Policy for Idle {
    fn decide(&mut self, _view: &View<'_>) -> Decision {
        Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn argmax_maps_slots_to_decisions() {
        assert_eq!(Decision::from_outputs(&[0.9, 0.1, 0.2]), Decision::Up);
        assert_eq!(Decision::from_outputs(&[0.1, 0.9, 0.2]), Decision::Down);
        assert_eq!(Decision::from_outputs(&[0.1, 0.2, 0.9]), Decision::Hold);
    }

    #[test]
    fn out_of_domain_outputs_hold() {
        assert_eq!(Decision::from_outputs(&[]), Decision::Hold);
        assert_eq!(Decision::from_outputs(&[f32::NAN, 1.0, 0.0]), Decision::Hold);
        assert_eq!(Decision::from_outputs(&[0.0, 0.0, 0.0, 5.0]), Decision::Hold);
        assert_eq!(Decision::from_index(7), Decision::Hold);
    }

    #[test]
    fn observation_uses_paddle_top_and_face() {
        let game = Match::new(&Config::interactive(), 0);
        let obs = View::of(&game, Side::Right).observation();
        assert_eq!(obs.paddle_y, 200.0);
        assert_eq!(obs.ball_y, 250.0);
        assert_eq!(obs.horizontal_distance, 365.0);
    }
}
