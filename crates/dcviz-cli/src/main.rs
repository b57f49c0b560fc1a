// crates/dcviz-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dcviz_core::{Algorithm, PlaybackConfig, Player, SleepTimer, Snapshot, INTERVAL_DEFAULT_MS};
use dcviz_trace::{
    closest_pair::{ClosestPair, POINTS},
    generator::{random_operands, random_points, random_values, rng_from},
    inversions::{CountingStrategy, InversionInput, Inversions, SIZE},
    io::write_actions_jsonl,
    karatsuba::{Karatsuba, KaratsubaInput, DIGITS},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "dcviz",
    about = "Step through divide-and-conquer algorithms",
    long_about = "Step through divide-and-conquer algorithms.\n\nEach subcommand builds the full action log of one run, then replays it one action at a time, one subcall at a time, or on a timer.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Closest pair of random points in the unit square
    ClosestPair {
        /// Number of points (clamped to [2, 60])
        #[arg(long)]
        size: Option<usize>,

        #[command(flatten)]
        play: PlayArgs,
    },

    /// Count inversions of a random array with merge sort
    Inversions {
        /// Array length (clamped to [2, 30])
        #[arg(long)]
        size: Option<usize>,

        /// How each merge counts inversions
        #[arg(long, value_enum, default_value_t = StrategyOpt::Direct)]
        strategy: StrategyOpt,

        #[command(flatten)]
        play: PlayArgs,
    },

    /// Multiply two integers with Karatsuba
    Karatsuba {
        /// Left operand (random if omitted; clamped to the digit count)
        #[arg(long)]
        x: Option<u128>,

        /// Right operand (random if omitted; clamped to the digit count)
        #[arg(long)]
        y: Option<u128>,

        /// Digits per operand (clamped to [1, 12])
        #[arg(long)]
        digits: Option<usize>,

        #[command(flatten)]
        play: PlayArgs,
    },
}

/// Playback options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct PlayArgs {
    /// Seed for random input (also read from DCVIZ_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// How to advance through the log
    #[arg(long, value_enum, default_value_t = ModeOpt::Step)]
    mode: ModeOpt,

    /// Auto-play period in ms for `--mode play` (clamped to [100, 1500])
    #[arg(long, default_value_t = INTERVAL_DEFAULT_MS)]
    interval_ms: u64,

    /// Print snapshots as JSON lines instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write the action log as JSON Lines to this path
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum StrategyOpt {
    /// Count while merging
    Direct,
    /// Count by binary search in the right half
    Rank,
}

impl From<StrategyOpt> for CountingStrategy {
    fn from(v: StrategyOpt) -> Self {
        match v {
            StrategyOpt::Direct => Self::Direct,
            StrategyOpt::Rank => Self::Rank,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum ModeOpt {
    /// One action per snapshot
    Step,
    /// One subcall per snapshot (lands on merge/strip/combine)
    Over,
    /// Timed auto-play, one action per tick
    Play,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::ClosestPair { size, play } => {
            let cfg = playback(&play);
            let n = POINTS.clamp_or_default(size);
            let points = random_points(n, &mut rng_from(cfg.seed));
            info!(n, seed = ?cfg.seed, "closest pair");
            drive::<ClosestPair>(points, &play, cfg)
        }
        Cmd::Inversions {
            size,
            strategy,
            play,
        } => {
            let cfg = playback(&play);
            let n = SIZE.clamp_or_default(size);
            let values = random_values(n, &mut rng_from(cfg.seed));
            let strategy = CountingStrategy::from(strategy);
            info!(n, %strategy, ?values, "inversions");
            drive::<Inversions>(InversionInput::new(values, strategy), &play, cfg)
        }
        Cmd::Karatsuba {
            x,
            y,
            digits,
            play,
        } => {
            let cfg = playback(&play);
            let digits = DIGITS.clamp_or_default(digits);
            let random = random_operands(digits, &mut rng_from(cfg.seed));
            let input = KaratsubaInput::new(x.unwrap_or(random.x), y.unwrap_or(random.y), digits);
            info!(x = %input.x, y = %input.y, digits, "karatsuba");
            drive::<Karatsuba>(input, &play, cfg)
        }
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Explicit flags first, then `DCVIZ_*` environment overrides.
fn playback(play: &PlayArgs) -> PlaybackConfig {
    PlaybackConfig {
        interval_ms: play.interval_ms,
        seed: play.seed,
    }
    .with_env()
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn emit(snap: &Snapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", snap.to_json()?);
    } else {
        println!("{snap}");
    }
    Ok(())
}

fn drive<A>(input: A::Input, play: &PlayArgs, cfg: PlaybackConfig) -> Result<()>
where
    A: Algorithm,
    A::Action: Serialize,
{
    let mut player = Player::<A, _>::with_config(input, SleepTimer::new(), cfg);

    if let Some(path) = &play.export {
        ensure_parent_dir(path)?;
        write_actions_jsonl(path, player.replay().actions())
            .with_context(|| format!("writing action log to {}", path.display()))?;
        info!(path = %path.display(), actions = player.replay().len(), "exported action log");
    }

    emit(&player.snapshot(), play.json)?;
    match play.mode {
        ModeOpt::Step => {
            while !player.replay().is_done() {
                player.step_once();
                emit(&player.snapshot(), play.json)?;
            }
        }
        ModeOpt::Over => {
            while !player.replay().is_done() {
                player.step_over();
                emit(&player.snapshot(), play.json)?;
            }
        }
        ModeOpt::Play => {
            player.run(cfg.interval_ms);
            while let Some(id) = player.timer_mut().wait() {
                if player.tick(id) {
                    emit(&player.snapshot(), play.json)?;
                }
            }
        }
    }

    let snap = player.snapshot();
    info!(
        algorithm = A::NAME,
        actions = snap.len,
        result = %snap.result,
        "replay finished"
    );
    Ok(())
}
