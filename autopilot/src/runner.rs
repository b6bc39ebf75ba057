use crate::bots::{bot_fingerprint, create_bot, AutopilotBot};
use anyhow::{anyhow, Context, Result};
use fishdash_core::sim::{Command, Game, Viewport};
use fishdash_core::tape::{encode_input_byte, serialize_tape, FrameInput};
use fishdash_core::{verify_tape, CueError, GameHooks, Session};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub seed: u32,
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub max_frames: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_coins: u32,
    pub final_rng_state: u32,
    pub game_over: bool,
    pub up_frames: u32,
    pub down_frames: u32,
    pub idle_frames: u32,
    pub cues_played: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
    pub tape: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeriesReport {
    pub bot_id: String,
    pub seed: u32,
    pub runs: Vec<RunMetrics>,
    pub leaderboard: Vec<u32>,
    /// Set when a run reached the frame cap alive, which leaves nothing to restart.
    pub stopped_early: bool,
    #[serde(skip)]
    pub tapes: Vec<Vec<u8>>,
}

/// Headless collaborators: counts cues and remembers the last leaderboard shown.
#[derive(Debug, Default)]
struct RunHooks {
    cues: u32,
    leaderboard: Vec<u32>,
}

impl GameHooks for RunHooks {
    fn play_pickup_cue(&mut self) -> Result<(), CueError> {
        self.cues += 1;
        Ok(())
    }

    fn show_leaderboard(&mut self, scores: &[u32]) {
        tracing::info!(?scores, "leaderboard");
        self.leaderboard = scores.to_vec();
    }
}

pub fn run_bot(
    bot_id: &str,
    seed: u32,
    viewport: Viewport,
    max_frames: u32,
) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    let mut session = Session::new(Game::new(seed, viewport), RunHooks::default());
    session.command(Command::Start);
    play_run(bot.as_mut(), &mut session, seed, max_frames)
}

/// Plays consecutive runs in one session, restarting after every game over.
pub fn run_series(
    bot_id: &str,
    seed: u32,
    viewport: Viewport,
    runs: usize,
    max_frames: u32,
) -> Result<SeriesReport> {
    if runs == 0 {
        return Err(anyhow!("series needs at least one run"));
    }

    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    let mut session = Session::new(Game::new(seed, viewport), RunHooks::default());
    let mut report = SeriesReport {
        bot_id: bot_id.to_string(),
        seed,
        runs: Vec::with_capacity(runs),
        leaderboard: Vec::new(),
        stopped_early: false,
        tapes: Vec::with_capacity(runs),
    };

    for run in 0..runs {
        // Restarting does not touch the generator, so its state is this run's seed.
        let run_seed = session.game().rng_state();
        let command = if run == 0 { Command::Start } else { Command::Restart };
        if !session.command(command) {
            return Err(anyhow!("session refused {command:?} before run {run}"));
        }

        let artifact = play_run(bot.as_mut(), &mut session, run_seed, max_frames)
            .with_context(|| format!("series run {run} failed"))?;
        let game_over = artifact.metrics.game_over;
        report.runs.push(artifact.metrics);
        report.tapes.push(artifact.tape);

        if !game_over {
            tracing::info!(run, max_frames, "run reached the frame cap alive, ending series");
            report.stopped_early = run + 1 < runs;
            break;
        }
    }

    report.leaderboard = session.hooks().leaderboard.clone();
    Ok(report)
}

fn play_run(
    bot: &mut (dyn AutopilotBot + Send),
    session: &mut Session<RunHooks>,
    seed: u32,
    max_frames: u32,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    bot.reset(seed);
    let game = session.game();
    game.validate_invariants()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let viewport = game.viewport();
    let cues_before = session.hooks().cues;
    let mut inputs = Vec::with_capacity(max_frames as usize);
    let mut up_frames = 0u32;
    let mut down_frames = 0u32;

    while session.game().is_running() && session.game().frame_count() < max_frames {
        let input = bot.next_input(&session.game().snapshot());
        match input {
            FrameInput::Up => up_frames += 1,
            FrameInput::Down => down_frames += 1,
            FrameInput::None => {}
        }
        inputs.push(encode_input_byte(input));
        session.step(input);
    }

    let game = session.game();
    let result = game.result();
    let tape = serialize_tape(
        seed,
        viewport,
        &inputs,
        result.final_score,
        result.final_coins,
    );
    verify_tape(&tape, max_frames.max(result.frame_count).max(1))
        .map_err(|err| anyhow!("generated tape failed verification: {err}"))?;

    tracing::debug!(
        bot = bot.id(),
        seed,
        frames = result.frame_count,
        score = result.final_score,
        coins = result.final_coins,
        "run finished"
    );

    let frame_count = inputs.len() as u32;
    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            bot_fingerprint: bot_fingerprint(bot.id()).unwrap_or_else(|| "unknown".to_string()),
            seed,
            viewport_width: viewport.width(),
            viewport_height: viewport.height(),
            max_frames,
            frame_count: result.frame_count,
            final_score: result.final_score,
            final_coins: result.final_coins,
            final_rng_state: game.rng_state(),
            game_over: result.game_over,
            up_frames,
            down_frames,
            idle_frames: frame_count - up_frames - down_frames,
            cues_played: session.hooks().cues - cues_before,
        },
        inputs,
        tape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishdash_core::tape::parse_tape;

    fn viewport() -> Viewport {
        Viewport::new(800, 600).unwrap()
    }

    #[test]
    fn idle_run_ends_without_steering() {
        let artifact = run_bot("idle", 0xDEAD_BEEF, viewport(), 5_000).unwrap();
        assert!(artifact.metrics.game_over);
        assert_eq!(artifact.metrics.up_frames + artifact.metrics.down_frames, 0);
        assert_eq!(artifact.metrics.idle_frames, artifact.metrics.frame_count);
        assert_eq!(artifact.inputs.len() as u32, artifact.metrics.frame_count);
    }

    #[test]
    fn frame_cap_stops_a_live_run() {
        let artifact = run_bot("gap-seeker", 0xC0FF_EE11, viewport(), 90).unwrap();
        assert_eq!(artifact.metrics.frame_count, 90);
        assert!(!artifact.metrics.game_over);

        let view = parse_tape(&artifact.tape, 90).unwrap();
        assert_eq!(view.header.seed, 0xC0FF_EE11);
        assert_eq!(view.header.frame_count, 90);
    }

    #[test]
    fn rejects_unknown_bot_and_zero_cap() {
        assert!(run_bot("nobody", 1, viewport(), 10).is_err());
        assert!(run_bot("idle", 1, viewport(), 0).is_err());
        assert!(run_series("idle", 1, viewport(), 0, 10).is_err());
    }

    #[test]
    fn series_restarts_and_keeps_top_three() {
        let report = run_series("idle", 0x5EED_5EED, viewport(), 4, 5_000).unwrap();
        assert_eq!(report.runs.len(), 4);
        assert_eq!(report.tapes.len(), 4);
        assert!(!report.stopped_early);
        assert_eq!(report.leaderboard.len(), 3);
        assert!(report.leaderboard.windows(2).all(|pair| pair[0] >= pair[1]));

        // Every run after the first starts where the previous one left the generator.
        for pair in report.runs.windows(2) {
            assert_eq!(pair[1].seed, pair[0].final_rng_state);
        }
        for tape in &report.tapes {
            verify_tape(tape, 5_000).unwrap();
        }
    }

    #[test]
    fn series_stops_when_a_run_survives_the_cap() {
        let report = run_series("gap-seeker", 0x0000_0042, viewport(), 3, 60).unwrap();
        assert_eq!(report.runs.len(), 1);
        assert!(report.stopped_early);
        assert!(report.leaderboard.is_empty());
    }
}
