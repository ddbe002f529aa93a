use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{
    ball::Ball,
    collision::{self, Event, Side},
    paddle::{Direction, Paddle},
};
use crate::config::{Config, FieldConfig, Opening, PhysicsConfig};
use crate::policy::Decision;

/// What became of a paddle's decision this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Asked to move but the step would have left the field
    Blocked,
    Held,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub events: Vec<Event>,
    pub moves: [Option<MoveOutcome>; 2],
}

impl StepReport {
    pub fn outcome(&self, side: Side) -> MoveOutcome {
        self.moves[side.index()].unwrap_or(MoveOutcome::Held)
    }

    pub fn scored(&self) -> Option<Side> {
        self.events.iter().find_map(|event| match event {
            Event::Score(side) => Some(*side),
            _ => None,
        })
    }
}

/// Everything one match mutates: both paddles, the ball, scores and the clock.
#[derive(Debug, Clone)]
pub struct Match {
    pub field: FieldConfig,
    pub physics: PhysicsConfig,
    pub paddles: [Paddle; 2],
    pub ball: Ball,
    pub scores: [u32; 2],
    pub tick: u64,
    rng: Pcg32,
    opening: Opening,
}

impl Match {
    pub fn new(config: &Config, seed: u64) -> Self {
        let field = config.field;
        let centre = collision::field_centre(&field);
        let paddles = [
            Paddle::new(Vec2::new(field.paddle_offset, centre.y), &config.paddle),
            Paddle::new(
                Vec2::new(field.width - field.paddle_offset, centre.y),
                &config.paddle,
            ),
        ];
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::new(centre, Vec2::ZERO, &config.ball);
        ball.vel = opening_velocity(&ball, config.ball.opening, &mut rng);

        Self {
            field,
            physics: config.physics,
            paddles,
            ball,
            scores: [0, 0],
            tick: 0,
            rng,
            opening: config.ball.opening,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        &mut self.paddles[side.index()]
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    pub fn total_hits(&self) -> u32 {
        self.paddles.iter().map(|paddle| paddle.hits).sum()
    }

    /// Applies a decision to one paddle, refusing steps that would leave the field.
    pub fn apply(&mut self, side: Side, decision: Decision) -> MoveOutcome {
        let direction = match decision {
            Decision::Up => Direction::Up,
            Decision::Down => Direction::Down,
            Decision::Hold => return MoveOutcome::Held,
        };
        let height = self.field.height;
        let paddle = self.paddle_mut(side);
        if paddle.can_move(direction, height) {
            paddle.move_by(direction);
            MoveOutcome::Moved
        } else {
            MoveOutcome::Blocked
        }
    }

    /// Advances the match by one tick.
    pub fn step(&mut self, decisions: [Decision; 2]) -> StepReport {
        let mut report = StepReport::default();
        for side in Side::BOTH {
            report.moves[side.index()] = Some(self.apply(side, decisions[side.index()]));
        }

        self.ball.move_once();
        collision::resolve(
            &mut self.ball,
            &self.paddles,
            &self.field,
            &self.physics,
            &mut self.rng,
            &mut report.events,
        );

        for event in &report.events {
            match *event {
                Event::Score(side) => {
                    self.scores[side.index()] += 1;
                    if self.physics.reset_paddles_on_point {
                        self.paddles.iter_mut().for_each(Paddle::reset);
                    }
                }
                Event::PaddleHit(side) => self.paddle_mut(side).hits += 1,
                Event::WallBounce => {}
            }
        }

        self.tick += 1;
        report
    }

    /// Back to the opening position: scores, hits, paddles and ball.
    pub fn reset(&mut self) {
        self.scores = [0, 0];
        self.tick = 0;
        for paddle in &mut self.paddles {
            paddle.reset();
            paddle.reset_hits();
        }
        self.ball.centre = collision::field_centre(&self.field);
        self.ball.vel = opening_velocity(&self.ball, self.opening, &mut self.rng);
    }
}

fn opening_velocity(ball: &Ball, opening: Opening, rng: &mut Pcg32) -> Vec2 {
    match opening {
        Opening::Flat => Vec2::new(-ball.max_vel, 0.0),
        Opening::Random => Vec2::new(ball.max_vel, ball.serve_y_vel(rng)),
    }
}
