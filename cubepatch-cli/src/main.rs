//! Cubepatch CLI — drag cubes around a virtual table without a renderer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cubepatch_engine::{
    AudioGraph, CubeId, CubeKind, CubeParams, Layout, NullView, ProximityConfig, Session, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cubepatch", version, about = "Proximity patching for audio cubes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a layout, random-walk every cube, and report the connection graph.
    Simulate(SimulateArgs),
    /// List layout names.
    Layouts,
}

#[derive(Debug, clap::Args)]
struct SimulateArgs {
    #[arg(long, default_value = "scatter")]
    layout: String,
    /// Cubes to place (ignored by `triangle`).
    #[arg(long, default_value_t = 24)]
    count: usize,
    #[arg(long, default_value_t = 0x0C0B_E5ED)]
    seed: u64,
    #[arg(long, default_value_t = 60)]
    ticks: u32,
    /// Largest per-axis move per tick.
    #[arg(long, default_value_t = 0.5)]
    step: f32,
    #[arg(long)]
    cell_size: Option<f32>,
    #[arg(long)]
    threshold: Option<f32>,
    /// JSON file with `cell_size` / `threshold`; flags win over the file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
    /// Log every tick's diff.
    #[arg(short, long)]
    verbose: bool,
}

/// Audio graph that only narrates.
#[derive(Debug, Default)]
struct LogAudio {
    connects: usize,
    disconnects: usize,
}

impl AudioGraph for LogAudio {
    fn create_node(&mut self, id: CubeId, kind: CubeKind, params: &CubeParams) {
        debug!(%id, %kind, ?params, "node");
    }
    fn update_node(&mut self, id: CubeId, params: &CubeParams) {
        debug!(%id, ?params, "node params");
    }
    fn remove_node(&mut self, id: CubeId) {
        debug!(%id, "node removed");
    }
    fn connect(&mut self, from: CubeId, to: CubeId) {
        self.connects += 1;
        debug!(%from, %to, "patch");
    }
    fn disconnect(&mut self, from: CubeId, to: CubeId) {
        self.disconnects += 1;
        debug!(%from, %to, "unpatch");
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &SimulateArgs) -> Result<ProximityConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<ProximityConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ProximityConfig::default(),
    };
    if let Some(c) = args.cell_size {
        config.cell_size = c;
    }
    if let Some(t) = args.threshold {
        config.threshold = t;
    }
    config.validate()?;
    Ok(config)
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let config = load_config(args)?;
    let Some(layout) = Layout::parse(&args.layout, args.count, args.seed) else {
        bail!("unknown layout `{}` (try: {})", args.layout, Layout::NAMES.join(", "));
    };
    if !(args.step.is_finite() && args.step >= 0.0) {
        bail!("--step must be a finite, non-negative number");
    }

    let mut session = Session::new(config, LogAudio::default(), NullView)?;
    for (kind, pos) in layout.placements() {
        session.add_cube(kind, pos)?;
    }
    info!(
        %layout,
        cubes = session.cube_count(),
        connections = session.connections().len(),
        "layout placed"
    );

    let ids: Vec<CubeId> = session.cubes().map(|c| c.id).collect();
    let mut rng = StdRng::seed_from_u64(args.seed ^ 0x5EED);
    let (mut added, mut removed) = (0_usize, 0_usize);
    for tick in 0..args.ticks {
        for &id in &ids {
            let Some(at) = session.cube(id).map(|c| c.transform.position) else {
                continue;
            };
            let drag = Vec3::new(
                rng.gen_range(-args.step..=args.step),
                0.0,
                rng.gen_range(-args.step..=args.step),
            );
            let report = session.move_cube(id, at + drag)?;
            added += report.diff.added.len();
            removed += report.diff.removed.len();
            for c in &report.diff.added {
                debug!(tick, link = %c.id, "connected");
            }
            for c in &report.diff.removed {
                debug!(tick, link = %c.id, "disconnected");
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        return Ok(());
    }

    println!("layout       : {layout} ({} cubes)", session.cube_count());
    println!("config       : cell {:.2}, threshold {:.2}", config.cell_size, config.threshold);
    println!("ticks        : {}", args.ticks);
    println!("connections  : {} (+{added} / -{removed} while walking)", session.connections().len());
    println!(
        "routes       : {} (patched {} / unpatched {})",
        session.routes().len(),
        session.audio().connects,
        session.audio().disconnects
    );
    match session.signal_feedback() {
        Some(path) => {
            let hops: Vec<String> = path.iter().map(ToString::to_string).collect();
            println!("feedback     : {}", hops.join(" -> "));
        }
        None => println!("feedback     : none"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(args) => {
            init_tracing(args.verbose);
            simulate(&args)
        }
        Command::Layouts => {
            for name in Layout::NAMES {
                println!("{name}");
            }
            Ok(())
        }
    }
}
