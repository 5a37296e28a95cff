#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs fieldsweep coverage simulations.

mod settings;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fieldsweep_rendering::{AsciiMap, Glyphs, RenderingBackend, TextBackend};
use fieldsweep_system_stepper::{Registry, RunSummary, Stepper};

use crate::settings::SettingsFile;

/// Simulates coverage search patterns for a camera-equipped rover.
#[derive(Debug, Parser)]
#[command(name = "fieldsweep", version, about)]
struct Cli {
    /// Strategy to run; see `--list` for the available keys.
    #[arg(long, default_value = "spiral")]
    strategy: String,
    /// TOML file with optional `[simulation]` and `[strategies.<key>]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 5_000)]
    frames: u64,
    /// Simulated seconds per frame; overrides the configuration file.
    #[arg(long)]
    dt: Option<f64>,
    /// Frames simulated between two rendered maps in watch mode.
    #[arg(long, default_value_t = 1)]
    substeps: u32,
    /// Render the coverage map after every tick.
    #[arg(long)]
    watch: bool,
    /// List the available strategies and exit.
    #[arg(long)]
    list: bool,
    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,
    /// Print the final coverage map.
    #[arg(long)]
    map: bool,
}

/// Entry point for the fieldsweep command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let registry = Registry::builtin();

    if cli.list {
        for entry in registry.entries() {
            println!("{:<18} {}", entry.key(), entry.display_name());
        }
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => {
            let settings = SettingsFile::load(path)?;
            log::debug!("loaded simulation settings from {}", path.display());
            settings
        }
        None => SettingsFile::default(),
    };
    let mut simulation = settings.simulation;
    if let Some(dt) = cli.dt {
        simulation.time_step_s = dt;
    }

    let mut stepper = Stepper::from_registry(
        &simulation,
        &registry,
        &cli.strategy,
        &settings.strategies,
    )
    .with_context(|| format!("failed to start strategy `{}`", cli.strategy))?;

    let summary = if cli.watch {
        watch(
            &mut stepper,
            simulation.time_step_s,
            cli.frames,
            cli.substeps,
            simulation.grid_cell_size_m,
        )?
    } else {
        stepper.run(simulation.time_step_s, cli.frames)?
    };

    if cli.map {
        let map = AsciiMap::from_snapshot(
            &stepper.snapshot(),
            simulation.grid_cell_size_m,
            Glyphs::default(),
        );
        print!("{map}");
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode run summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Steps in ticks of `substeps` frames, rendering after each tick. The last
/// tick is shortened so the run never exceeds `max_frames`.
fn watch(
    stepper: &mut Stepper,
    dt: f64,
    max_frames: u64,
    substeps: u32,
    cell_size: f64,
) -> Result<RunSummary> {
    let mut backend = TextBackend::new(io::stdout().lock(), cell_size);
    while !stepper.is_finished() && stepper.frame() < max_frames {
        let remaining = u32::try_from(max_frames - stepper.frame()).unwrap_or(u32::MAX);
        stepper.set_substeps(substeps.min(remaining));
        let snapshot = stepper.step(dt)?;
        backend.present(&snapshot)?;
    }
    Ok(stepper.summary())
}

fn print_summary(summary: &RunSummary) {
    println!("Final statistics for {}:", summary.strategy);
    println!("  Coverage:          {:.1}%", summary.coverage_fraction * 100.0);
    println!(
        "  Frames:            {} ({:.1} s simulated)",
        summary.frames, summary.simulated_seconds
    );
    println!("  Path length:       {} points", summary.path_points);
    println!("  Distance traveled: {:.1} m", summary.distance_travelled);
    println!(
        "  Pattern finished:  {}",
        if summary.finished { "yes" } else { "no" }
    );
}
