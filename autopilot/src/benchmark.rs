//! Bots x seeds tournament. Every pairing plays a restart series in its own
//! session, and each bot is ranked by the podium its runs would leave on a
//! shared leaderboard.

use crate::bots::{bot_fingerprint, bot_ids, create_bot};
use crate::runner::{run_series, SeriesReport};
use crate::util::{seed_to_hex, write_file, write_json};
use anyhow::{bail, ensure, Context, Result};
use fishdash_core::sim::Viewport;
use fishdash_core::Leaderboard;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub viewport: Viewport,
    pub runs_per_seed: usize,
    pub max_frames: u32,
    /// Worker threads; `None` lets rayon size the pool.
    pub jobs: Option<usize>,
}

/// One bot's restart series on one seed.
#[derive(Clone, Debug, Serialize)]
pub struct SeriesOutcome {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub scores: Vec<u32>,
    pub coins: u32,
    pub frames: u64,
    pub stopped_early: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BotStanding {
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub runs: usize,
    /// Best three run scores across every series, crashed or capped.
    pub podium: Vec<u32>,
    pub mean_score: f64,
    pub mean_coins: f64,
    pub mean_frames: f64,
    /// Runs that reached the frame cap without crashing.
    pub capped_runs: usize,
    pub best_seed: u32,
}

#[derive(Clone, Debug)]
pub struct BestTape {
    pub bot_id: String,
    pub seed: u32,
    pub score: u32,
    pub coins: u32,
    pub tape: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub max_frames: u32,
    pub runs_per_seed: usize,
    pub seeds: Vec<u32>,
    pub standings: Vec<BotStanding>,
    pub series: Vec<SeriesOutcome>,
    #[serde(skip)]
    pub best_tapes: Vec<BestTape>,
}

/// Comma-separated bot ids, deduplicated in order. `None` selects the whole roster.
pub fn select_bots(input: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = input else {
        return Ok(bot_ids().into_iter().map(String::from).collect());
    };

    let mut picked: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if create_bot(id).is_none() {
            bail!("unknown bot '{id}'. available: {}", bot_ids().join(", "));
        }
        if !picked.iter().any(|existing| existing == id) {
            picked.push(id.to_string());
        }
    }
    ensure!(!picked.is_empty(), "--bots named no bots");
    Ok(picked)
}

pub fn run_benchmark(config: &BenchmarkConfig) -> Result<BenchmarkReport> {
    ensure!(!config.bots.is_empty(), "benchmark needs at least one bot");
    ensure!(!config.seeds.is_empty(), "benchmark needs at least one seed");
    ensure!(config.runs_per_seed > 0, "benchmark needs at least one run per seed");
    ensure!(config.jobs != Some(0), "--jobs must be at least 1");

    let pairings: Vec<(&str, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.as_str(), *seed)))
        .collect();
    tracing::info!(
        pairings = pairings.len(),
        runs_per_seed = config.runs_per_seed,
        "starting benchmark"
    );

    // Zero threads means rayon's default.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()
        .context("failed to build benchmark thread pool")?;
    let played: Vec<SeriesReport> = pool.install(|| {
        pairings
            .par_iter()
            .map(|(bot, seed)| {
                run_series(
                    bot,
                    *seed,
                    config.viewport,
                    config.runs_per_seed,
                    config.max_frames,
                )
                .with_context(|| format!("bot={bot} seed={}", seed_to_hex(*seed)))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut standings = Vec::with_capacity(config.bots.len());
    let mut best_tapes = Vec::with_capacity(config.bots.len());
    for bot in &config.bots {
        let mine: Vec<&SeriesReport> = played.iter().filter(|report| report.bot_id == *bot).collect();
        let (standing, best) = tally(bot, &mine);
        standings.push(standing);
        best_tapes.extend(best);
    }
    standings.sort_by(|a, b| {
        b.podium
            .cmp(&a.podium)
            .then_with(|| b.mean_score.total_cmp(&a.mean_score))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    let series = played.iter().map(outcome).collect();
    Ok(BenchmarkReport {
        viewport_width: config.viewport.width(),
        viewport_height: config.viewport.height(),
        max_frames: config.max_frames,
        runs_per_seed: config.runs_per_seed,
        seeds: config.seeds.clone(),
        standings,
        series,
        best_tapes,
    })
}

fn outcome(report: &SeriesReport) -> SeriesOutcome {
    SeriesOutcome {
        bot_id: report.bot_id.clone(),
        seed: report.seed,
        seed_hex: seed_to_hex(report.seed),
        scores: report.runs.iter().map(|run| run.final_score).collect(),
        coins: report.runs.iter().map(|run| run.final_coins).sum(),
        frames: report.runs.iter().map(|run| u64::from(run.frame_count)).sum(),
        stopped_early: report.stopped_early,
    }
}

fn tally(bot_id: &str, played: &[&SeriesReport]) -> (BotStanding, Option<BestTape>) {
    let mut podium = Leaderboard::default();
    let mut best: Option<BestTape> = None;
    let mut runs = 0usize;
    let mut capped_runs = 0usize;
    let (mut score_sum, mut coin_sum, mut frame_sum) = (0u64, 0u64, 0u64);

    for report in played {
        for (run, tape) in report.runs.iter().zip(&report.tapes) {
            runs += 1;
            score_sum += u64::from(run.final_score);
            coin_sum += u64::from(run.final_coins);
            frame_sum += u64::from(run.frame_count);
            if !run.game_over {
                capped_runs += 1;
            }
            podium.record(run.final_score);

            // First run to reach a score keeps the spot.
            if best.as_ref().map_or(true, |held| run.final_score > held.score) {
                best = Some(BestTape {
                    bot_id: bot_id.to_string(),
                    seed: run.seed,
                    score: run.final_score,
                    coins: run.final_coins,
                    tape: tape.clone(),
                });
            }
        }
    }

    let divisor = runs.max(1) as f64;
    let standing = BotStanding {
        bot_id: bot_id.to_string(),
        bot_fingerprint: bot_fingerprint(bot_id).unwrap_or_else(|| "unknown".to_string()),
        runs,
        podium: podium.scores().to_vec(),
        mean_score: score_sum as f64 / divisor,
        mean_coins: coin_sum as f64 / divisor,
        mean_frames: frame_sum as f64 / divisor,
        capped_runs,
        best_seed: best.as_ref().map_or(0, |tape| tape.seed),
    };
    (standing, best)
}

/// Writes `standings.json` plus each bot's best tape. Returns the summary path.
pub fn write_benchmark(report: &BenchmarkReport, out_dir: &Path) -> Result<PathBuf> {
    for best in &report.best_tapes {
        let name = format!(
            "best-{}-{}-score{}.tape",
            best.bot_id,
            seed_to_hex(best.seed),
            best.score
        );
        write_file(&out_dir.join(name), &best.tape)?;
    }
    let summary = out_dir.join("standings.json");
    write_json(&summary, report)?;
    Ok(summary)
}
