//! Deterministic simulation core.
//!
//! Fixed tick, seeded RNG, no rendering or terminal dependencies.

pub mod ball;
pub mod collision;
pub mod paddle;
pub mod step;
pub mod trajectory;

pub use ball::Ball;
pub use collision::{Event, Side};
pub use paddle::{Direction, Paddle};
pub use step::{Match, MoveOutcome, StepReport};
pub use trajectory::{predict, Trajectory};
