use super::*;
use crate::constants::{GAP_EXTRA_MIN, GAP_SPACING, OBSTACLE_WIDTH, SPAWN_CADENCE_FRAMES};
use crate::leaderboard::Leaderboard;
use crate::rng::SeededRng;
use world::World;


/// Simulation context: one player, its run tallies, the entity store and the state machine.
#[derive(Clone, Debug)]
pub struct Game {
    phase: GamePhase,
    score: u32,
    coins: u32,
    frame_count: u32,
    world: World,
    rng: SeededRng,
    leaderboard: Leaderboard,
}

impl Game {
    pub fn new(seed: u32, viewport: Viewport) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            coins: 0,
            frame_count: 0,
            world: World::new(viewport),
            rng: SeededRng::new(seed),
            leaderboard: Leaderboard::default(),
        }
    }

    /// Applies a control command. Returns false when the command does not apply to the current phase.
    pub fn command(&mut self, command: Command) -> bool {
        let applies = matches!(
            (self.phase, command),
            (GamePhase::Idle, Command::Start) | (GamePhase::GameOver, Command::Restart)
        );
        if !applies {
            tracing::debug!(?command, phase = ?self.phase, "ignoring command");
            return false;
        }

        self.reset_run();
        self.phase = GamePhase::Running;
        tracing::debug!(?command, rng_state = self.rng.state(), "run started");
        true
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.coins = 0;
        self.frame_count = 0;
        self.world.reset();
    }

    /// Advances one tick. A no-op that signals halt unless the game is running.
    pub fn step(&mut self, input: FrameInput) -> FrameReport {
        if !matches!(self.phase, GamePhase::Running) {
            return FrameReport::halted();
        }

        self.world.advance(input);

        let spawned_gap = self
            .frame_count
            .is_multiple_of(SPAWN_CADENCE_FRAMES)
            .then(|| self.world.spawn_gap(&mut self.rng));

        let hits = collision::detect(
            &self.world.player,
            &self.world.obstacles,
            &self.world.pickups,
        );

        let coins_collected = self.world.collect(&hits.pickups);
        self.coins += coins_collected;

        if hits.crashed() {
            self.frame_count += 1;
            let game_over = self.finish_run();
            return FrameReport {
                signal: StepSignal::Halt,
                ticked: true,
                spawned_gap,
                coins_collected,
                obstacles_passed: 0,
                game_over: Some(game_over),
            };
        }

        let obstacles_passed = self.world.mark_passed();
        self.score += obstacles_passed;
        self.frame_count += 1;

        FrameReport {
            signal: StepSignal::Continue,
            ticked: true,
            spawned_gap,
            coins_collected,
            obstacles_passed,
            game_over: None,
        }
    }

    fn finish_run(&mut self) -> GameOverReport {
        self.phase = GamePhase::GameOver;
        let leaderboard_rank = self.leaderboard.record(self.score);
        tracing::debug!(
            score = self.score,
            coins = self.coins,
            frames = self.frame_count,
            ?leaderboard_rank,
            "run ended"
        );

        GameOverReport {
            score: self.score,
            coins: self.coins,
            frame_count: self.frame_count,
            leaderboard_rank,
            leaderboard: self.leaderboard.scores().to_vec(),
        }
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Running)
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn coins(&self) -> u32 {
        self.coins
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.world.viewport
    }

    /// Current generator state. Seeding a new game with it reproduces the next run exactly.
    #[inline]
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    #[inline]
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.world.player
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.world.obstacles
    }

    #[inline]
    pub fn pickups(&self) -> &[Pickup] {
        &self.world.pickups
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            phase: self.phase,
            frame_count: self.frame_count,
            score: self.score,
            coins: self.coins,
            background_x: self.world.background_x,
            viewport: self.world.viewport,
            player: self.world.player,
            obstacles: self.world.obstacles.clone(),
            pickups: self.world.pickups.clone(),
            leaderboard: self.leaderboard.scores().to_vec(),
        }
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        ReplayResult {
            final_score: self.score,
            final_coins: self.coins,
            frame_count: self.frame_count,
            game_over: matches!(self.phase, GamePhase::GameOver),
        }
    }

    pub fn validate_invariants(&self) -> Result<(), RuleCode> {
        let viewport = self.world.viewport;
        let player = &self.world.player;

        if player.y < 0 || player.y > viewport.player_max_y() {
            return Err(RuleCode::PlayerBounds);
        }
        if player.x != viewport.width() / 4
            || player.width != PLAYER_WIDTH
            || player.height != PLAYER_HEIGHT
        {
            return Err(RuleCode::PlayerAnchor);
        }

        if matches!(self.phase, GamePhase::Idle)
            && (self.frame_count != 0
                || self.score != 0
                || self.coins != 0
                || !self.world.obstacles.is_empty()
                || !self.world.pickups.is_empty())
        {
            return Err(RuleCode::IdleStateNotEmpty);
        }

        let scores = self.leaderboard.scores();
        if scores.len() > self.leaderboard.capacity() {
            return Err(RuleCode::LeaderboardCapacity);
        }
        if scores.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(RuleCode::LeaderboardOrder);
        }

        for obstacle in &self.world.obstacles {
            let geometry_valid = obstacle.width == OBSTACLE_WIDTH
                && obstacle.x + obstacle.width > 0
                && obstacle.x <= viewport.width()
                && obstacle.gap_y >= 0
                && obstacle.gap_height >= GAP_SPACING + GAP_EXTRA_MIN
                && obstacle.gap_bottom() <= viewport.height();
            if !geometry_valid {
                return Err(RuleCode::ObstacleGeometry);
            }

            let behind_player = obstacle.x + obstacle.width < player.x;
            if obstacle.passed && !behind_player {
                return Err(RuleCode::ObstaclePassedState);
            }
            // Scoring is skipped on the crash tick, so unpassed-but-behind is only wrong while running.
            if matches!(self.phase, GamePhase::Running) && !obstacle.passed && behind_player {
                return Err(RuleCode::ObstaclePassedState);
            }
        }

        if self
            .world
            .obstacles
            .windows(2)
            .any(|pair| pair[0].id >= pair[1].id)
        {
            return Err(RuleCode::GapIdOrder);
        }

        if self
            .world
            .pickups
            .iter()
            .any(|pickup| pickup.gap_id >= self.world.next_gap_id)
        {
            return Err(RuleCode::PickupOrphaned);
        }

        Ok(())
    }
}
