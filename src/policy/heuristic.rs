use super::{Decision, Policy, View};
use crate::config::Config;
use crate::sim::{predict, Event};

/// Built-in opponent: chases the predicted crossing point of the ball.
///
/// After any paddle hit it waits `delay_ticks` before reacting again, and it
/// ignores predictions within `deadband` of its own centre.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    delay_ticks: u64,
    deadband: f32,
    last_hit: Option<u64>,
}

impl HeuristicPolicy {
    pub fn new(delay_ticks: u64, deadband: f32) -> Self {
        Self {
            delay_ticks,
            deadband,
            last_hit: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ai_delay_ticks(), config.ai.deadband)
    }

    fn reacting(&self, tick: u64) -> bool {
        match self.last_hit {
            Some(hit) => tick.saturating_sub(hit) >= self.delay_ticks,
            None => true,
        }
    }
}

impl Policy for HeuristicPolicy {
    fn decide(&mut self, view: &View<'_>) -> Decision {
        if !self.reacting(view.tick) {
            return Decision::Hold;
        }
        let target = predict(view.ball.centre, view.ball.vel, view.field).y();
        let centre = view.paddle.centre.y;
        if target < centre - self.deadband {
            Decision::Up
        } else if target > centre + self.deadband {
            Decision::Down
        } else {
            Decision::Hold
        }
    }

    fn observe(&mut self, event: Event, tick: u64) {
        if let Event::PaddleHit(_) = event {
            self.last_hit = Some(tick);
        }
    }

    fn reset(&mut self) {
        self.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::{Match, Side};

    fn game_with_ball(pos: Vec2, vel: Vec2) -> Match {
        let mut game = Match::new(&Config::interactive(), 0);
        game.ball.centre = pos;
        game.ball.vel = vel;
        game
    }

    #[test]
    fn moves_toward_predicted_crossing() {
        let mut ai = HeuristicPolicy::new(30, 5.0);
        let game = game_with_ball(Vec2::new(400.0, 100.0), Vec2::new(7.0, 0.0));
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Up);
        let game = game_with_ball(Vec2::new(400.0, 400.0), Vec2::new(7.0, 0.0));
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Down);
    }

    #[test]
    fn holds_inside_the_deadband() {
        let mut ai = HeuristicPolicy::new(30, 5.0);
        let game = game_with_ball(Vec2::new(400.0, 254.0), Vec2::new(7.0, 0.0));
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Hold);
    }

    #[test]
    fn waits_after_a_paddle_hit() {
        let mut ai = HeuristicPolicy::new(30, 5.0);
        let mut game = game_with_ball(Vec2::new(400.0, 100.0), Vec2::new(7.0, 0.0));
        ai.observe(Event::PaddleHit(Side::Left), 10);
        game.tick = 39;
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Hold);
        game.tick = 40;
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Up);
        ai.observe(Event::PaddleHit(Side::Right), 40);
        ai.reset();
        assert_eq!(ai.decide(&View::of(&game, Side::Right)), Decision::Up);
    }

    #[test]
    fn delay_converts_from_milliseconds() {
        let mut config = Config::interactive();
        assert_eq!(HeuristicPolicy::from_config(&config).delay_ticks, 30);
        config.tick_rate = Some(120);
        assert_eq!(HeuristicPolicy::from_config(&config).delay_ticks, 60);
    }
}
