//! Headless host for the boidworld kernel.
//!
//! Seeds a flock, drives the kernel with a fixed step and logs population
//! summaries.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use boidworld::{
    init_logging, ConfigPatch, LogSink, SimulationConfig, SimulationKernel, Variant, Vector2,
    REFERENCE_FRAME_MS,
};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A predator-prey flocking simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Initial prey count
    #[arg(long, default_value_t = 60)]
    prey: usize,
    /// Initial predator count
    #[arg(long, default_value_t = 6)]
    predators: usize,
    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = REFERENCE_FRAME_MS)]
    dt: f64,
    /// Ticks between population reports
    #[arg(long, default_value_t = 60)]
    report_every: u32,
    /// Seed for flock placement and offspring jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// World width
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    /// World height
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// JSON configuration patch applied over the defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };
    let document = fs::read_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    let patch = ConfigPatch::from_json(&document)
        .with_context(|| format!("parsing configuration {}", path.display()))?;
    config
        .apply(&patch)
        .with_context(|| format!("applying configuration {}", path.display()))?;
    Ok(config)
}

fn seed_flock(kernel: &mut SimulationKernel<LogSink>, args: &Args, rng: &mut StdRng) {
    let bounds = kernel.bounds();
    let populations = [(Variant::Prey, args.prey), (Variant::Predator, args.predators)];
    for (variant, count) in populations {
        for _ in 0..count {
            let position = Vector2::new(
                rng.random_range(bounds.min.x..=bounds.max.x),
                rng.random_range(bounds.min.y..=bounds.max.y),
            );
            let heading = rng.random_range(0.0..std::f64::consts::TAU);
            let velocity = Vector2::from_angle(heading) * rng.random_range(0.5..2.0);
            kernel.spawn(variant, position, velocity);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_ref())?;
    let mut kernel = SimulationKernel::new(args.width, args.height, config, LogSink)
        .context("creating simulation kernel")?
        .with_seed(args.seed);
    let mut rng = StdRng::seed_from_u64(args.seed);
    seed_flock(&mut kernel, &args, &mut rng);
    info!(
        "seeded {} prey and {} predators",
        kernel.count(Variant::Prey),
        kernel.count(Variant::Predator)
    );

    let (mut births, mut deaths) = (0, 0);
    for tick in 1..=args.ticks {
        let summary = kernel.tick(args.dt);
        births += summary.births;
        deaths += summary.deaths;
        if args.report_every > 0 && tick % args.report_every == 0 {
            info!(
                "tick {tick} ({:.1}s): {} prey, {} predators, {} births, {} deaths",
                kernel.elapsed_ms() / 1000.0,
                summary.prey,
                summary.predators,
                births,
                deaths
            );
        }
        if kernel.is_empty() {
            info!("flock died out at tick {tick}");
            break;
        }
    }

    info!(
        "finished after {:.1}s simulated: {} agents, {births} births, {deaths} deaths",
        kernel.elapsed_ms() / 1000.0,
        kernel.len()
    );
    Ok(())
}
