use glam::Vec2;
use pong::{
    audio::SilentAudio,
    game_loop::{MatchController, Phase, Termination},
    policy::{Decision, Idle},
    sim::{predict, Event, Match, Side},
    Config,
};
use proptest::prelude::*;

const HOLD: [Decision; 2] = [Decision::Hold, Decision::Hold];

fn decision(n: u8) -> Decision {
    Decision::from_index(n as usize)
}

#[test]
fn ball_crosses_the_left_edge_and_is_served_again() {
    let config = Config::interactive();
    let mut game = Match::new(&config, 42);
    // left paddle out of the way
    game.paddles[0].centre.y = 50.0;
    assert_eq!(game.ball.centre, Vec2::new(400.0, 250.0));
    assert_eq!(game.ball.vel, Vec2::new(-7.0, 0.0));

    let mut ticks = 0;
    let scorer = loop {
        let report = game.step(HOLD);
        ticks += 1;
        if let Some(side) = report.scored() {
            assert_eq!(report.events, [Event::Score(side)]);
            break side;
        }
        assert!(report.events.is_empty(), "unexpected {:?}", report.events);
        assert!(ticks < 100);
    };

    assert_eq!(ticks, 59);
    assert_eq!(scorer, Side::Right);
    assert_eq!(game.scores, [0, 1]);
    assert_eq!(game.ball.centre, Vec2::new(400.0, 250.0));
    assert_eq!(game.ball.vel.x, 7.0);
    assert!((-3.0..=3.0).contains(&game.ball.vel.y));
}

#[test]
fn top_wall_reverses_vertical_velocity() {
    for config in [Config::interactive(), Config::training()] {
        let mut game = Match::new(&config, 1);
        game.ball.centre = Vec2::new(400.0, 10.0);
        game.ball.vel = Vec2::new(-7.0, -3.0);
        let report = game.step(HOLD);
        assert_eq!(report.events, [Event::WallBounce]);
        assert_eq!(game.ball.vel.y, 3.0);
    }
}

fn hit_left_paddle_at(y: f32) -> Match {
    let mut game = Match::new(&Config::interactive(), 1);
    game.ball.centre = Vec2::new(50.0, y);
    game.ball.vel = Vec2::new(-7.0, 0.0);
    game.step(HOLD);
    let report = game.step(HOLD);
    assert_eq!(report.events, [Event::PaddleHit(Side::Left)]);
    game
}

#[test]
fn centre_hit_leaves_the_ball_level() {
    let game = hit_left_paddle_at(250.0);
    assert_eq!(game.ball.vel, Vec2::new(7.0, 0.0));
    assert_eq!(game.paddles[0].hits, 1);
}

#[test]
fn edge_hits_deflect_at_full_speed() {
    let top = hit_left_paddle_at(200.0);
    assert_eq!(top.ball.vel.y, -7.0);
    let bottom = hit_left_paddle_at(300.0);
    assert_eq!(bottom.ball.vel.y, 7.0);
}

#[test]
fn level_prediction_is_a_straight_line() {
    let field = Config::interactive().field;
    let a = predict(Vec2::new(400.0, 250.0), Vec2::new(7.0, 0.0), &field);
    let b = predict(Vec2::new(400.0, 250.0), Vec2::new(7.0, 0.0), &field);
    assert_eq!(a, b);
    assert_eq!(a.end(), Vec2::new(775.0, 250.0));
    assert_eq!(a.bounce, None);

    let left = predict(Vec2::new(400.0, 120.0), Vec2::new(-7.0, 0.0), &field);
    assert_eq!(left.end(), Vec2::new(25.0, 120.0));
}

#[test]
fn winning_score_ends_the_round_and_restart_resets_it() {
    let mut config = Config::interactive();
    config.rules.win_score = Some(1);
    let mut controller = MatchController::new(
        Match::new(&config, 8),
        config.rules,
        Box::new(Idle),
        Box::new(Idle),
    );
    controller.game_mut().paddles[0].centre.y = 50.0;

    let ended = controller.run_headless(&mut SilentAudio, |_, _| {});
    assert_eq!(ended, Termination::WinScore(Side::Right));
    assert_eq!(controller.phase(), Phase::RoundOver { winner: Some(Side::Right) });

    controller.restart();
    let game = controller.game();
    assert_eq!(game.scores, [0, 0]);
    for paddle in &game.paddles {
        assert_eq!(paddle.centre, paddle.home());
    }
    assert_eq!(controller.phase(), Phase::Playing);
}

proptest! {
    #[test]
    fn horizontal_speed_never_changes(
        seed in any::<u64>(),
        training in any::<bool>(),
        moves in prop::collection::vec((0u8..3, 0u8..3), 1..600),
    ) {
        let config = if training { Config::training() } else { Config::interactive() };
        let mut game = Match::new(&config, seed);
        for (left, right) in moves {
            game.step([decision(left), decision(right)]);
            prop_assert_eq!(game.ball.vel.x.abs(), config.ball.max_vel);
            for paddle in &game.paddles {
                prop_assert!(paddle.top() >= 0.0 && paddle.bottom() <= config.field.height);
            }
        }
    }

    #[test]
    fn prediction_is_reproducible_and_stays_on_the_field(
        x in 30.0f32..770.0,
        y in 0.0f32..500.0,
        right in any::<bool>(),
        vy in -7.0f32..7.0,
    ) {
        let field = Config::interactive().field;
        let vel = Vec2::new(if right { 7.0 } else { -7.0 }, vy);
        let first = predict(Vec2::new(x, y), vel, &field);
        let second = predict(Vec2::new(x, y), vel, &field);
        prop_assert_eq!(first, second);
        prop_assert!(first.y() >= -1e-3 && first.y() <= field.height + 1e-3);
    }
}
