use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

use smokevis_stream::import;
use smokevis_stream::scheduler::Category;
use smokevis_stream::sim::{Context, Simulation, DEFAULT_EXTINCTION_COEFFICIENT};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a simulation's datasets into frame assets.
    Import {
        /// Path to the simulation manifest
        #[arg(value_name = "FILE")]
        manifest: PathBuf,
        /// Directory the frame files are written to
        #[arg(short, long, value_name = "DIR", default_value = "frames")]
        out: PathBuf,
        /// Mass extinction coefficient for smoke volumes, m2/kg
        #[arg(long, default_value_t = DEFAULT_EXTINCTION_COEFFICIENT)]
        extinction: f32,
    },
    /// Import (or reuse existing frames) and run a headless playback loop.
    Play {
        /// Path to the simulation manifest
        #[arg(value_name = "FILE")]
        manifest: PathBuf,
        /// Directory the frame files are written to
        #[arg(short, long, value_name = "DIR", default_value = "frames")]
        out: PathBuf,
        /// Seconds of playback before exiting
        #[arg(short, long, default_value_t = 10.)]
        duration: f32,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Import {
            manifest,
            out,
            extinction,
        } => {
            let mut context = Context::new(out);
            context.extinction_coefficient = extinction;
            let imported = import::import_simulation(&manifest, &context)?;
            if imported.is_empty() {
                return Err(eyre!("no dataset could be imported from {}", manifest.display()));
            }
            for dataset in &imported {
                tracing::info!(
                    name = dataset.info.canonical_name(),
                    timesteps = dataset.info.time_count(),
                    series = dataset.sequences.len(),
                    "imported"
                );
            }
        }
        Command::Play {
            manifest,
            out,
            duration,
        } => {
            let context = Context::new(out);
            let imported = import::import_simulation(&manifest, &context)?;
            if imported.is_empty() {
                return Err(eyre!("nothing to play back"));
            }

            let mut sim = Simulation::new(context);
            for dataset in imported {
                sim.register(dataset)?;
            }
            play(&mut sim, duration).await;
        }
    }
    Ok(())
}

/// Drives the scheduler at a fixed cadence and logs index changes, standing
/// in for a renderer's per-frame tick.
async fn play(sim: &mut Simulation, duration: f32) {
    const TICK: Duration = Duration::from_millis(16);

    let mut interval = tokio::time::interval(TICK);
    let mut remaining = duration;
    while remaining > 0. {
        interval.tick().await;
        let dt = TICK.as_secs_f32();
        sim.advance(dt);
        remaining -= dt;

        for category in [Category::Obstruction, Category::Slice, Category::Volume] {
            if let Some(index) = sim.current(category) {
                tracing::debug!(?category, index, "play head");
            }
        }
    }
    tracing::info!("playback finished");
}
