use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Play field geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Distance from each side edge to the paddle centre line
    pub paddle_offset: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            paddle_offset: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub width: f32,
    pub length: f32,
    pub speed: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            length: 100.0,
            speed: 7.0,
        }
    }
}

/// Serve at the very start of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opening {
    /// Ball heads left with no vertical speed
    Flat,
    /// Ball heads right with a random vertical speed
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Side of the ball's bounding box
    pub size: f32,
    pub max_vel: f32,
    /// Serves draw `y_vel` from `-serve_y_range..=serve_y_range`
    pub serve_y_range: i32,
    pub serve_allows_zero: bool,
    pub opening: Opening,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            size: 15.0,
            max_vel: 7.0,
            serve_y_range: 3,
            serve_allows_zero: true,
            opening: Opening::Flat,
        }
    }
}

/// When the top/bottom walls reflect the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallBounce {
    /// `bottom + y_vel >= height`: bounces one tick early at the bottom
    LookAhead,
    /// `bottom >= height`
    PostMove,
}

/// How generous the paddle hit box is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddleEdge {
    /// 5 units of slack below the paddle; the right paddle reaches from the ball centre
    Forgiving,
    /// Ball centre must lie on the paddle; the right paddle meets the ball's right edge
    Exact,
}

/// Which way the ball leaves centre after a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServeDirection {
    TowardScorer,
    TowardConceder,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub wall_bounce: WallBounce,
    pub paddle_edge: PaddleEdge,
    pub serve_direction: ServeDirection,
    pub reset_paddles_on_point: bool,
    /// Extra reach below the paddle for `PaddleEdge::Forgiving`
    pub forgiveness: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            wall_bounce: WallBounce::LookAhead,
            paddle_edge: PaddleEdge::Forgiving,
            serve_direction: ServeDirection::TowardScorer,
            reset_paddles_on_point: false,
            forgiveness: 5.0,
        }
    }
}

/// Built-in trajectory following opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Paddle speed given to the computer player
    pub level: f32,
    /// Reaction time after any paddle hit, in milliseconds
    pub move_delay_ms: u64,
    pub deadband: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            level: 7.0,
            move_delay_ms: 500,
            deadband: 5.0,
        }
    }
}

/// Conditions that end a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub win_score: Option<u32>,
    pub end_on_score: bool,
    pub hit_cap: Option<u32>,
    pub tick_budget: Option<u64>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            win_score: Some(10),
            end_on_score: false,
            hit_cap: None,
            tick_budget: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BellMode {
    Off,
    Score,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub population: usize,
    pub generations: u32,
    pub elites: usize,
    pub tournament: usize,
    /// Probability that a single weight is perturbed
    pub mutation_rate: f32,
    /// Largest perturbation applied to a weight
    pub mutation_strength: f32,
    pub hidden: usize,
    pub fitness_threshold: Option<f32>,
    pub blocked_move_penalty: f32,
    pub hold_penalty: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population: 20,
            generations: 50,
            elites: 2,
            tournament: 3,
            mutation_rate: 0.2,
            mutation_strength: 0.5,
            hidden: 6,
            fitness_threshold: None,
            blocked_move_penalty: 1.0,
            hold_penalty: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub field: FieldConfig,
    pub paddle: PaddleConfig,
    pub ball: BallConfig,
    pub physics: PhysicsConfig,
    pub ai: AiConfig,
    pub rules: MatchRules,
    /// Simulation ticks per second; `None` runs as fast as possible
    pub tick_rate: Option<u32>,
    pub seed: Option<u64>,
    pub bell: BellMode,
    pub training: TrainingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::interactive()
    }
}

impl Config {
    /// Human play: look-ahead wall bounce, forgiving paddles, first to 10.
    pub fn interactive() -> Self {
        Self {
            field: FieldConfig::default(),
            paddle: PaddleConfig::default(),
            ball: BallConfig::default(),
            physics: PhysicsConfig::default(),
            ai: AiConfig::default(),
            rules: MatchRules::default(),
            tick_rate: Some(60),
            seed: None,
            bell: BellMode::Score,
            training: TrainingConfig::default(),
        }
    }

    /// Network training: post-move bounce, exact paddles, round ends on the first point or 50 hits.
    pub fn training() -> Self {
        let mut config = Self::interactive();
        config.ball.serve_allows_zero = false;
        config.ball.opening = Opening::Random;
        config.physics.wall_bounce = WallBounce::PostMove;
        config.physics.paddle_edge = PaddleEdge::Exact;
        config.rules = MatchRules {
            win_score: None,
            end_on_score: true,
            hit_cap: Some(50),
            tick_budget: None,
        };
        config.tick_rate = None;
        config.bell = BellMode::Off;
        config
    }

    /// A human against a trained network, with the geometry the network was trained on.
    pub fn replay() -> Self {
        let mut config = Self::training();
        config.rules = MatchRules::default();
        config.tick_rate = Some(60);
        config.bell = BellMode::Score;
        config
    }

    /// Read a JSON config; missing fields fall back to `Config::default()`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_over(path, Self::default())
    }

    /// Read a JSON config laid over `preset`: only the fields present in the
    /// file replace the preset's values.
    pub fn load_over(path: &Path, preset: Config) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let json_err = |source: serde_json::Error| Error::Json {
            path: path.to_path_buf(),
            source,
        };
        let text = fs::read_to_string(path)?;
        let overlay: Value = serde_json::from_str(&text).map_err(json_err)?;
        let mut merged = serde_json::to_value(preset).map_err(json_err)?;
        merge(&mut merged, overlay);
        let config: Config = serde_json::from_value(merged).map_err(json_err)?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let field = &self.field;
        if field.width <= 0.0 || field.height <= 0.0 {
            return Err(Error::InvalidConfig("field must have a positive size".into()));
        }
        if self.paddle.length <= 0.0 || self.paddle.length > field.height {
            return Err(Error::InvalidConfig(format!(
                "paddle length {} does not fit a field of height {}",
                self.paddle.length, field.height
            )));
        }
        if self.ball.max_vel <= 0.0 {
            return Err(Error::InvalidConfig("ball max_vel must be positive".into()));
        }
        if self.ball.serve_y_range < 0 {
            return Err(Error::InvalidConfig("serve_y_range must not be negative".into()));
        }
        if !self.ball.serve_allows_zero && self.ball.serve_y_range < 1 {
            return Err(Error::InvalidConfig(
                "serve_y_range must be at least 1 when zero serves are excluded".into(),
            ));
        }
        if !self.paddle.speed.is_finite() || self.paddle.speed <= 0.0 {
            return Err(Error::InvalidConfig("paddle speed must be positive".into()));
        }
        if !self.ai.level.is_finite() || self.ai.level <= 0.0 {
            return Err(Error::InvalidConfig("ai level must be positive".into()));
        }
        if self.training.mutation_strength.is_nan() || self.training.mutation_strength < 0.0 {
            return Err(Error::InvalidConfig(
                "mutation_strength must not be negative".into(),
            ));
        }
        if self.training.population < 2 {
            return Err(Error::InvalidConfig("population needs at least two genomes".into()));
        }
        if self.training.elites > self.training.population {
            return Err(Error::InvalidConfig("more elites than genomes".into()));
        }
        if self.tick_rate == Some(0) {
            return Err(Error::InvalidConfig("tick_rate must be positive".into()));
        }
        Ok(())
    }

    /// Wall-clock length of one tick when running paced.
    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_rate
            .map(|rate| Duration::from_secs_f64(1.0 / rate as f64))
    }

    /// Ticks per simulated second, used for timers even when the loop runs uncapped.
    pub fn ticks_per_second(&self) -> u32 {
        self.tick_rate.unwrap_or(60)
    }

    pub fn ai_delay_ticks(&self) -> u64 {
        self.ai.move_delay_ms * self.ticks_per_second() as u64 / 1000
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
