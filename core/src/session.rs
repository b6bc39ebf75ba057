use crate::error::CueError;
use crate::sim::{Command, FrameReport, Game, WorldSnapshot};
use crate::tape::FrameInput;

/// Presentation collaborators driven by a [`Session`].
pub trait GameHooks {
    /// Plays the pickup sound. Failures are logged by the session and never reach the game.
    fn play_pickup_cue(&mut self) -> Result<(), CueError>;

    /// Called once each time a run ends, with the leaderboard after the run was recorded.
    fn show_leaderboard(&mut self, scores: &[u32]);

    fn render(&mut self, _world: &WorldSnapshot) {}
}

/// Hooks that do nothing. Used for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl GameHooks for NoHooks {
    fn play_pickup_cue(&mut self) -> Result<(), CueError> {
        Ok(())
    }

    fn show_leaderboard(&mut self, _scores: &[u32]) {}
}

/// A game wired to its collaborators.
#[derive(Debug)]
pub struct Session<H> {
    game: Game,
    hooks: H,
    failed_cues: u32,
}

impl<H: GameHooks> Session<H> {
    pub fn new(game: Game, hooks: H) -> Self {
        Self {
            game,
            hooks,
            failed_cues: 0,
        }
    }

    pub fn command(&mut self, command: Command) -> bool {
        self.game.command(command)
    }

    pub fn step(&mut self, input: FrameInput) -> FrameReport {
        let report = self.game.step(input);
        if !report.ticked {
            return report;
        }

        for _ in 0..report.coins_collected {
            if let Err(err) = self.hooks.play_pickup_cue() {
                self.failed_cues += 1;
                tracing::warn!(error = %err, frame = self.game.frame_count(), "pickup cue failed");
            }
        }

        if let Some(game_over) = &report.game_over {
            self.hooks.show_leaderboard(&game_over.leaderboard);
        }

        self.hooks.render(&self.game.snapshot());
        report
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Pickup cues that failed over the session's lifetime.
    pub fn failed_cues(&self) -> u32 {
        self.failed_cues
    }

    pub fn into_parts(self) -> (Game, H) {
        (self.game, self.hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GamePhase, Viewport};

    #[derive(Default)]
    struct Recorder {
        cues: u32,
        boards: Vec<Vec<u32>>,
        frames: Vec<u32>,
        mute: bool,
    }

    impl GameHooks for Recorder {
        fn play_pickup_cue(&mut self) -> Result<(), CueError> {
            if self.mute {
                return Err(CueError::Unavailable);
            }
            self.cues += 1;
            Ok(())
        }

        fn show_leaderboard(&mut self, scores: &[u32]) {
            self.boards.push(scores.to_vec());
        }

        fn render(&mut self, world: &WorldSnapshot) {
            self.frames.push(world.frame_count);
        }
    }

    fn session(seed: u32, hooks: Recorder) -> Session<Recorder> {
        let viewport = Viewport::new(800, 600).unwrap();
        let mut session = Session::new(Game::new(seed, viewport), hooks);
        assert!(session.command(Command::Start));
        session
    }

    /// Rides the ceiling until the first column ends the run.
    fn play_until_crash(session: &mut Session<Recorder>) {
        for _ in 0..10_000 {
            if session.step(FrameInput::Up).game_over.is_some() {
                return;
            }
        }
        panic!("run never ended");
    }

    #[test]
    fn renders_once_per_executed_tick() {
        let mut session = session(1, Recorder::default());
        for _ in 0..5 {
            session.step(FrameInput::None);
        }
        assert_eq!(session.hooks().frames, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn idle_steps_render_nothing() {
        let viewport = Viewport::new(800, 600).unwrap();
        let mut session = Session::new(Game::new(1, viewport), Recorder::default());
        session.step(FrameInput::Up);
        assert!(session.hooks().frames.is_empty());
    }

    #[test]
    fn shows_leaderboard_once_per_game_over() {
        let mut session = session(0xDEAD_BEEF, Recorder::default());
        play_until_crash(&mut session);
        assert_eq!(session.game().phase(), GamePhase::GameOver);
        assert_eq!(session.game().frame_count(), 102);

        for _ in 0..10 {
            session.step(FrameInput::None);
        }
        assert_eq!(session.hooks().boards, vec![vec![0]]);

        assert!(session.command(Command::Restart));
        play_until_crash(&mut session);
        let boards = &session.hooks().boards;
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[1].len(), 2);
    }

    #[test]
    fn cue_failures_are_swallowed() {
        let quiet = Recorder {
            mute: true,
            ..Recorder::default()
        };
        let mut session = session(0xC0FF_EE11, quiet);

        // Hold the fish in the middle of every band so it keeps collecting.
        for _ in 0..2_000 {
            let target = session
                .game()
                .obstacles()
                .iter()
                .find(|obstacle| !obstacle.passed)
                .map(|obstacle| obstacle.gap_y + obstacle.gap_height / 2);
            let center = session.game().player().y + session.game().player().height / 2;
            let input = match target {
                Some(mid) if mid < center - 3 => FrameInput::Up,
                Some(mid) if mid > center + 3 => FrameInput::Down,
                _ => FrameInput::None,
            };
            if session.step(input).game_over.is_some() {
                break;
            }
        }

        let coins = session.game().coins();
        assert_eq!(session.failed_cues(), coins);
        assert_eq!(session.hooks().cues, 0);
    }

    #[test]
    fn working_cue_plays_per_coin() {
        let mut session = session(0xC0FF_EE11, Recorder::default());
        for _ in 0..600 {
            if session.step(FrameInput::None).game_over.is_some() {
                break;
            }
        }
        assert_eq!(session.hooks().cues, session.game().coins());
        assert_eq!(session.failed_cues(), 0);
    }
}
