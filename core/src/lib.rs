pub mod constants;
pub mod error;
pub mod input;
pub mod leaderboard;
pub mod rng;
pub mod session;
pub mod sim;
pub mod tape;
pub mod verify;

pub use error::{ConfigError, CueError, RuleCode, TapeError};
pub use input::{InputLatch, SteerKey};
pub use leaderboard::Leaderboard;
pub use session::{GameHooks, NoHooks, Session};
pub use sim::{Command, FrameReport, Game, GamePhase, StepSignal, Viewport, WorldSnapshot};
pub use tape::FrameInput;
pub use verify::{verify_tape, RunJournal};
