use serde::Serialize;

use crate::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, MAX_VIEWPORT_DIMENSION, MIN_VIEWPORT_HEIGHT,
    MIN_VIEWPORT_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH,
};
use crate::error::{ConfigError, RuleCode};
use crate::tape::{decode_input_byte, FrameInput};

pub mod collision;
mod game;
mod world;

pub use game::Game;

/// Playfield bounds, fixed for the lifetime of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Viewport {
    width: i32,
    height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Result<Self, ConfigError> {
        if width < MIN_VIEWPORT_WIDTH || height < MIN_VIEWPORT_HEIGHT {
            return Err(ConfigError::ViewportTooSmall { width, height });
        }
        if width > MAX_VIEWPORT_DIMENSION || height > MAX_VIEWPORT_DIMENSION {
            return Err(ConfigError::ViewportTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Largest y the player's top edge may take.
    #[inline]
    pub fn player_max_y(&self) -> i32 {
        self.height - PLAYER_HEIGHT
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub dy: i32,
}

impl Player {
    pub fn centered(viewport: Viewport) -> Self {
        Self {
            x: viewport.width() / 4,
            y: (viewport.height() / 2).clamp(0, viewport.player_max_y()),
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            dy: 0,
        }
    }
}

/// An obstacle column with an open band from `gap_y` to `gap_y + gap_height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: i32,
    pub width: i32,
    pub gap_y: i32,
    pub gap_height: i32,
    pub passed: bool,
}

impl Obstacle {
    #[inline]
    pub fn gap_bottom(&self) -> i32 {
        self.gap_y + self.gap_height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pickup {
    pub gap_id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Idle,
    Running,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Restart,
}

/// Tells the driver whether to schedule another tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSignal {
    Continue,
    Halt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameOverReport {
    pub score: u32,
    pub coins: u32,
    pub frame_count: u32,
    pub leaderboard_rank: Option<usize>,
    pub leaderboard: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub signal: StepSignal,
    /// False when the step was a no-op because the game is not running.
    pub ticked: bool,
    pub spawned_gap: Option<u32>,
    pub coins_collected: u32,
    pub obstacles_passed: u32,
    pub game_over: Option<GameOverReport>,
}

impl FrameReport {
    pub(crate) fn halted() -> Self {
        Self {
            signal: StepSignal::Halt,
            ticked: false,
            spawned_gap: None,
            coins_collected: 0,
            obstacles_passed: 0,
            game_over: None,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorldSnapshot {
    pub phase: GamePhase,
    pub frame_count: u32,
    pub score: u32,
    pub coins: u32,
    pub background_x: i32,
    pub viewport: Viewport,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
    pub leaderboard: Vec<u32>,
}

impl WorldSnapshot {
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Running)
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReplayResult {
    pub final_score: u32,
    pub final_coins: u32,
    pub frame_count: u32,
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayViolation {
    Rule { frame_count: u32, rule: RuleCode },
    InputAfterGameOver { frame_count: u32 },
}

/// Starts a fresh run and feeds it every input. Undecodable bytes steer nowhere.
pub fn replay(seed: u32, viewport: Viewport, inputs: &[u8]) -> ReplayResult {
    let mut game = Game::new(seed, viewport);
    game.command(Command::Start);

    for input in inputs {
        game.step(decode_input_byte(*input).unwrap_or_default());
    }

    game.result()
}

pub fn replay_strict(
    seed: u32,
    viewport: Viewport,
    inputs: &[FrameInput],
) -> Result<ReplayResult, ReplayViolation> {
    let mut game = Game::new(seed, viewport);
    game.command(Command::Start);
    game.validate_invariants()
        .map_err(|rule| ReplayViolation::Rule {
            frame_count: game.frame_count(),
            rule,
        })?;

    for input in inputs {
        let report = game.step(*input);
        if !report.ticked {
            return Err(ReplayViolation::InputAfterGameOver {
                frame_count: game.frame_count(),
            });
        }

        game.validate_invariants()
            .map_err(|rule| ReplayViolation::Rule {
                frame_count: game.frame_count(),
                rule,
            })?;
    }

    Ok(game.result())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_rejects_out_of_range_dimensions() {
        assert!(matches!(
            Viewport::new(199, 600),
            Err(ConfigError::ViewportTooSmall { .. })
        ));
        assert!(matches!(
            Viewport::new(800, 100),
            Err(ConfigError::ViewportTooSmall { .. })
        ));
        assert!(matches!(
            Viewport::new(800, 300),
            Err(ConfigError::ViewportTooSmall { .. })
        ));
        assert!(matches!(
            Viewport::new(70_000, 600),
            Err(ConfigError::ViewportTooLarge { .. })
        ));
        assert!(Viewport::new(800, 600).is_ok());
    }

    #[test]
    fn player_starts_centered() {
        let viewport = Viewport::new(800, 600).unwrap();
        let player = Player::centered(viewport);
        assert_eq!(player.x, 200);
        assert_eq!(player.y, 300);
        assert_eq!(player.dy, 0);
    }

    #[test]
    fn replay_is_deterministic() {
        let viewport = Viewport::new(1_280, 720).unwrap();
        let inputs: Vec<u8> = (0..600u32).map(|i| ((i / 40) % 3) as u8).collect();
        assert_eq!(
            replay(0xC0FF_EE11, viewport, &inputs),
            replay(0xC0FF_EE11, viewport, &inputs)
        );
    }

    #[test]
    fn strict_replay_rejects_input_after_game_over() {
        let viewport = Viewport::new(800, 600).unwrap();
        // Seed 0xDEADBEEF opens the first band at y=162, so a fish pinned to the
        // ceiling hits the first column.
        let inputs = vec![FrameInput::Up; 400];

        let crashed = replay_strict(0xDEAD_BEEF, viewport, &inputs[..102]).unwrap();
        assert!(crashed.game_over);
        assert_eq!(crashed.frame_count, 102);

        assert_eq!(
            replay_strict(0xDEAD_BEEF, viewport, &inputs),
            Err(ReplayViolation::InputAfterGameOver { frame_count: 102 })
        );
    }
}
