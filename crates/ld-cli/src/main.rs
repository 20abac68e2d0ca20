//! Lucky Sphere — headless session shell
//!
//! Usage:
//!   lucky-sphere pools                                 - Pools and remaining units
//!   lucky-sphere draw -p staff.json --pool third -n 5  - Run one draw
//!   lucky-sphere export                                - Write results sheet
//!   lucky-sphere audio --mute true --volume 0.4        - Save audio preferences
//!   lucky-sphere reset --yes                           - Clear the session
//!   lucky-sphere config                                - Print effective config

mod session;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use ld_engine::{FnListener, LogListener, TimingProfile};
use ld_file::{ColumnMap, ParticipantSource, ResultSink, SheetRowsExport, SheetRowsSource};
use ld_stage::{DrawPhase, Stage, StageEvent};
use ld_state::reset_session;

use session::{Session, SessionOptions};

#[derive(Parser)]
#[command(name = "lucky-sphere", about = "Lucky Sphere draw session shell")]
struct Cli {
    /// Directory for saved history and preferences
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Engine config file (.json, .yaml); overrides --profile
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in timing profile
    #[arg(long, global = true, value_enum, default_value = "standard")]
    profile: ProfileArg,

    /// Prize pool file (.json, .yaml); defaults to the festival line-up
    #[arg(long, global = true)]
    pools: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Standard,
    Classic,
    Rehearsal,
}

impl From<ProfileArg> for TimingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Standard => TimingProfile::Standard,
            ProfileArg::Classic => TimingProfile::Classic,
            ProfileArg::Rehearsal => TimingProfile::Rehearsal,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List prize pools with remaining units
    Pools,
    /// Run one draw
    Draw {
        /// Participant sheet (JSON rows)
        #[arg(short, long)]
        participants: PathBuf,
        /// Pool to draw from
        #[arg(long)]
        pool: String,
        /// Winners requested
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        /// Frame rate of the simulated display
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        /// Pace frames in wall-clock time instead of simulating instantly
        #[arg(long)]
        realtime: bool,
    },
    /// Export results grouped by pool
    Export {
        /// Output file; defaults to a timestamped name in the current directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// English column headers
        #[arg(long)]
        english: bool,
    },
    /// Save audio preferences
    Audio {
        #[arg(long)]
        mute: Option<bool>,
        #[arg(long)]
        volume: Option<f64>,
    },
    /// Clear all draw history (irreversible)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Print the effective engine configuration
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let seed = match &cli.command {
        Commands::Draw { seed, .. } => *seed,
        _ => None,
    };
    let opts = SessionOptions {
        data_dir: cli.data_dir,
        config: cli.config,
        profile: cli.profile.into(),
        pools: cli.pools,
        seed,
    };

    match cli.command {
        Commands::Pools => list_pools(&opts),
        Commands::Draw {
            participants,
            pool,
            count,
            fps,
            realtime,
            ..
        } => run_draw(&opts, &participants, &pool, count, fps, realtime),
        Commands::Export { out, english } => export_results(&opts, out, english),
        Commands::Audio { mute, volume } => save_audio(&opts, mute, volume),
        Commands::Reset { yes } => reset(&opts, yes),
        Commands::Config => print_config(&opts),
    }
}

fn list_pools(opts: &SessionOptions) -> Result<()> {
    let session = Session::open(opts)?;
    let ledger = session.orchestrator.ledger();

    println!("{:<12} {:<24} {:>9}", "ID", "NAME", "REMAINING");
    for pool in ledger.pools() {
        let marker = if pool.is_headline { " *" } else { "" };
        println!(
            "{:<12} {:<24} {:>4}/{:<4}{}",
            pool.id,
            pool.name,
            pool.remaining(),
            pool.capacity(),
            marker
        );
    }
    println!("\n{} draws in history", ledger.history().len());
    Ok(())
}

fn run_draw(
    opts: &SessionOptions,
    participants: &Path,
    pool: &str,
    count: usize,
    fps: f64,
    realtime: bool,
) -> Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number");
    }

    let mut session = Session::open(opts)?;
    let roster = SheetRowsSource::new(participants)
        .load()
        .with_context(|| format!("Failed to read participants from {}", participants.display()))?;

    session.enable_audio();
    let orch = &mut session.orchestrator;
    orch.add_listener(Box::new(LogListener));
    orch.add_listener(Box::new(FnListener(print_stage)));

    let eligible = orch.load_participants(roster)?;
    println!("🎟  {} eligible participants", eligible);

    orch.select_pool(pool)?;
    let actual = orch.start_selected(count)?;
    if actual < count {
        println!("Only {} of {} winners can be drawn", actual, count);
    }

    let frame = Duration::from_secs_f64(1.0 / fps);
    let mut last = Instant::now();
    while orch.phase() != DrawPhase::Idle {
        let dt_ms = if realtime {
            thread::sleep(frame);
            let now = Instant::now();
            let dt = now.duration_since(last);
            last = now;
            dt.as_secs_f64() * 1000.0
        } else {
            1000.0 / fps
        };
        orch.advance(dt_ms);
    }

    session.save_history()?;
    log::info!("History saved to {}", session.data_dir().display());
    Ok(())
}

fn print_stage(event: &StageEvent) {
    match &event.stage {
        Stage::RollStart { pool_id, winner_count } => {
            println!("🎲 Rolling for {} winner(s) from '{}'", winner_count, pool_id);
        }
        Stage::WinnerReveal {
            index, name, item, ..
        } => {
            let department = event.payload.department.as_deref().unwrap_or("");
            println!("  #{:<3} {:<16} {:<12} → {}", index + 1, name, department, item);
        }
        Stage::DrawComplete {
            pool_name,
            winner_count,
            headline,
            ..
        } => {
            let banner = if *headline { "🏆" } else { "🎉" };
            println!("{} {}: {} winner(s)", banner, pool_name, winner_count);
        }
        _ => {}
    }
}

fn export_results(opts: &SessionOptions, out: Option<PathBuf>, english: bool) -> Result<()> {
    let session = Session::open(opts)?;
    let ledger = session.orchestrator.ledger();

    let path = out.unwrap_or_else(|| {
        PathBuf::from(SheetRowsExport::default_file_name(chrono::Local::now()))
    });
    let columns = if english {
        ColumnMap::english()
    } else {
        ColumnMap::chinese()
    };

    let rows = SheetRowsExport::new(&path)
        .with_columns(columns)
        .write(ledger.pools(), ledger.history())?;
    println!("📄 {} rows written to {}", rows, path.display());
    Ok(())
}

fn save_audio(opts: &SessionOptions, mute: Option<bool>, volume: Option<f64>) -> Result<()> {
    let mut session = Session::open(opts)?;
    if let Some(muted) = mute {
        session.prefs.muted = muted;
    }
    if let Some(volume) = volume {
        session.prefs.set_volume(volume);
    }
    session
        .prefs
        .save(&session.store)
        .context("Failed to save audio preferences")?;
    println!(
        "🔊 muted: {}, volume: {:.2}",
        session.prefs.muted, session.prefs.volume
    );
    Ok(())
}

fn reset(opts: &SessionOptions, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Reset clears every draw of this session. Re-run with --yes to confirm.");
    }
    let mut session = Session::open(opts)?;
    session.orchestrator.session_reset();
    reset_session(&session.store).context("Failed to clear saved history")?;
    println!("🔄 Session reset");
    Ok(())
}

fn print_config(opts: &SessionOptions) -> Result<()> {
    let session = Session::open(opts)?;
    let config = session.orchestrator.config();
    println!("{}", config.to_json()?);

    let dynamics = session.orchestrator.dynamics();
    println!("\nwinners  reveal_ms  friction");
    for n in [1, 3, 5, 10, 20] {
        let d = dynamics.dynamics(n);
        println!(
            "{:>7}  {:>9}  {:.5}",
            n, d.reveal_phase_duration_ms, d.friction_coefficient
        );
    }

    let card = &config.timing.card;
    let keyframes = card.keyframes();
    println!(
        "\ncard flight {:.0}ms: centre at {:.1}%, leaves centre at {:.1}%",
        card.total_ms(),
        keyframes.fly_to_center_end,
        keyframes.show_in_center_end
    );

    let flow = &config.flow;
    let flips: Vec<String> = (0..5).map(|i| format!("{:.0}", flow.flip_at(i))).collect();
    println!(
        "result flips at {} ms (5 cards done at {:.0}ms)",
        flips.join(", "),
        flow.flips_done_at(5)
    );
    Ok(())
}
