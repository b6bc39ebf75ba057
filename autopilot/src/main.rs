use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use fishdash_autopilot::benchmark::{
    run_benchmark, select_bots, write_benchmark, BenchmarkConfig, BenchmarkReport,
};
use fishdash_autopilot::bots::{bot_ids, bot_manifest_entries, create_bot, describe_bots};
use fishdash_autopilot::config::RunnerDefaults;
use fishdash_autopilot::runner::{run_bot, run_series};
use fishdash_autopilot::util::{
    parse_seed, parse_seed_list, read_seed_file, seed_sequence, seed_to_hex, write_file,
    write_json,
};
use fishdash_core::tape::parse_tape;
use fishdash_core::verify_tape;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fishdash")]
#[command(about = "Deterministic Fish Dash runs: autopilot tapes, series, verification and benchmarks")]
struct Cli {
    /// Viewport width in pixels (defaults to FISHDASH_VIEWPORT_WIDTH or 1280)
    #[arg(long, global = true)]
    width: Option<i32>,
    /// Viewport height in pixels (defaults to FISHDASH_VIEWPORT_HEIGHT or 720)
    #[arg(long, global = true)]
    height: Option<i32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available bots
    ListBots,
    /// Export the bot manifest (including config fingerprints)
    RosterManifest {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play one run and write its verifiable tape
    Generate {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        seed: String,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play consecutive runs with restart in between and print the leaderboard
    Series {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 3)]
        runs: usize,
        #[arg(long)]
        max_frames: Option<u32>,
        /// Directory for one tape per run
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Replay a tape and check its claimed results
    VerifyTape {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        max_frames: Option<u32>,
    },
    /// Play a restart series for every bot on every seed, in parallel, and rank the bots
    Benchmark {
        /// Comma-separated bot ids (default: whole roster)
        #[arg(long)]
        bots: Option<String>,
        /// Seeds separated by commas or spaces
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 8)]
        seed_count: u32,
        #[arg(long, default_value_t = 3)]
        runs: usize,
        #[arg(long)]
        max_frames: Option<u32>,
        /// Directory for standings.json and each bot's best tape
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        width,
        height,
        command,
    } = Cli::parse();
    let defaults = RunnerDefaults::from_env();
    let viewport = defaults
        .resolve_viewport(width, height)
        .context("invalid --width/--height")?;

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:14} {description}");
            }
        }
        Commands::RosterManifest { output } => {
            let manifest = bot_manifest_entries();
            if let Some(path) = output {
                write_json(&path, &manifest)?;
                println!("wrote={}", path.display());
                println!("bots={}", manifest.len());
            } else {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
        }
        Commands::Generate {
            bot,
            seed,
            max_frames,
            output,
        } => {
            ensure_bot(&bot)?;
            let seed = parse_seed(&seed)?;
            let max_frames = max_frames.unwrap_or(defaults.max_frames);
            let artifact = run_bot(&bot, seed, viewport, max_frames)?;
            let output_path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "tapes/{}-{}-score{}-coins{}.tape",
                    bot,
                    seed_to_hex(seed).replace("0x", "seed"),
                    artifact.metrics.final_score,
                    artifact.metrics.final_coins
                ))
            });
            write_file(&output_path, &artifact.tape)?;

            println!("bot={}", artifact.metrics.bot_id);
            println!("bot_fingerprint={}", artifact.metrics.bot_fingerprint);
            println!("seed={}", seed_to_hex(seed));
            println!("viewport={}x{}", viewport.width(), viewport.height());
            println!("frames={}", artifact.metrics.frame_count);
            println!("score={}", artifact.metrics.final_score);
            println!("coins={}", artifact.metrics.final_coins);
            println!("game_over={}", artifact.metrics.game_over);
            println!("output={}", output_path.display());
        }
        Commands::Series {
            bot,
            seed,
            runs,
            max_frames,
            out_dir,
        } => {
            ensure_bot(&bot)?;
            let seed = parse_seed(&seed)?;
            let max_frames = max_frames.unwrap_or(defaults.max_frames);
            let report = run_series(&bot, seed, viewport, runs, max_frames)?;

            for (idx, run) in report.runs.iter().enumerate() {
                println!(
                    "run {}: seed={} frames={} score={} coins={} game_over={}",
                    idx + 1,
                    seed_to_hex(run.seed),
                    run.frame_count,
                    run.final_score,
                    run.final_coins,
                    run.game_over
                );
            }
            if report.stopped_early {
                println!("stopped_early=true (a run reached max_frames alive)");
            }
            println!("leaderboard:");
            for (idx, score) in report.leaderboard.iter().enumerate() {
                println!("  {}. {score}", idx + 1);
            }

            if let Some(dir) = out_dir {
                for (run, tape) in report.runs.iter().zip(&report.tapes) {
                    let path = dir.join(format!(
                        "{}-{}-score{}.tape",
                        bot,
                        seed_to_hex(run.seed).replace("0x", "seed"),
                        run.final_score
                    ));
                    write_file(&path, tape)?;
                }
                write_json(&dir.join("series.json"), &report)?;
                println!("out_dir={}", dir.display());
            }
        }
        Commands::VerifyTape { input, max_frames } => {
            let max_frames = max_frames.unwrap_or(defaults.max_frames);
            let bytes =
                fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;
            let tape = parse_tape(&bytes, max_frames)?;
            let journal = verify_tape(&bytes, max_frames)?;
            println!("input={}", input.display());
            println!("seed={}", seed_to_hex(tape.header.seed));
            println!(
                "viewport={}x{}",
                journal.viewport_width, journal.viewport_height
            );
            println!("frame_count={}", journal.frame_count);
            println!("final_score={}", journal.final_score);
            println!("final_coins={}", journal.final_coins);
            println!("game_over={}", journal.game_over);
            println!("checksum={:#010x}", journal.tape_checksum);
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            runs,
            max_frames,
            out_dir,
            jobs,
        } => {
            let config = BenchmarkConfig {
                bots: select_bots(bots.as_deref())?,
                seeds: resolve_seeds(
                    seeds.as_deref(),
                    seed_file.as_deref(),
                    seed_start.as_deref(),
                    seed_count,
                )?,
                viewport,
                runs_per_seed: runs,
                max_frames: max_frames.unwrap_or(defaults.max_frames),
                jobs,
            };
            let report = run_benchmark(&config)?;
            print_standings(&report);

            if let Some(dir) = out_dir {
                let summary = write_benchmark(&report, &dir)?;
                println!("summary={}", summary.display());
            }
        }
    }

    Ok(())
}

fn ensure_bot(bot: &str) -> Result<()> {
    if create_bot(bot).is_none() {
        let available = bot_ids().join(", ");
        return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
    }
    Ok(())
}

fn print_standings(report: &BenchmarkReport) {
    println!(
        "viewport={}x{} max_frames={} runs_per_seed={} seeds={}",
        report.viewport_width,
        report.viewport_height,
        report.max_frames,
        report.runs_per_seed,
        report.seeds.len()
    );
    for (idx, standing) in report.standings.iter().enumerate() {
        println!(
            "  {}. {:14} podium={:?} mean_score={:.1} mean_coins={:.1} mean_frames={:.0} capped={}/{}",
            idx + 1,
            standing.bot_id,
            standing.podium,
            standing.mean_score,
            standing.mean_coins,
            standing.mean_frames,
            standing.capped_runs,
            standing.runs,
        );
    }
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return read_seed_file(path);
    }
    if let Some(list) = seeds {
        return parse_seed_list(list);
    }

    let start = match seed_start {
        Some(start) => parse_seed(start)?,
        None => 0xF15D_0001,
    };
    Ok(seed_sequence(start, seed_count))
}
