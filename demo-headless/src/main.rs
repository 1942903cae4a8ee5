//! Headless brushfire driver
//!
//! Owns the pacing the core deliberately lacks: builds a lattice, seeds an
//! ignition, calls `step()` at its own cadence, and renders ASCII heat maps
//! plus conservation totals to stdout. All display mapping lives here; the
//! core only exposes per-cell state.

use brushfire_core::{Lattice, SimConfig};
use clap::Parser;

/// Brushfire lattice simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "brushfire-demo")]
#[command(about = "Wildfire lattice simulation demo", long_about = None)]
struct Args {
    /// Lattice width in cells
    #[arg(long, default_value_t = 20)]
    width: usize,

    /// Lattice height in cells
    #[arg(long, default_value_t = 20)]
    height: usize,

    /// Number of simulation steps to run
    #[arg(short, long, default_value_t = 1000)]
    steps: u64,

    /// RNG seed for the fuel distribution and ember hops
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Steps between printed reports
    #[arg(short, long, default_value_t = 100)]
    report_interval: u64,

    /// Half-width of the initial ignition block
    #[arg(long, default_value_t = 2)]
    ignition_radius: usize,

    /// Temperature the ignition block is forced to
    #[arg(long, default_value_t = 600.0)]
    ignition_temp: f32,

    /// Number of embers to drop on the ignition center
    #[arg(long, default_value_t = 0)]
    embers: usize,

    /// Use uniform fuel instead of the patchy scrubland distribution
    #[arg(long)]
    uniform: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = SimConfig::default();

    let mut lattice = if args.uniform {
        Lattice::new(args.width, args.height, config, args.seed)
    } else {
        Lattice::patchy(args.width, args.height, config, args.seed)
    };

    // Force a square block around the center up to ignition heat.
    let (cx, cy) = (args.width / 2, args.height / 2);
    let radius = args.ignition_radius;
    for y in cy.saturating_sub(radius)..=(cy + radius).min(args.height - 1) {
        for x in cx.saturating_sub(radius)..=(cx + radius).min(args.width - 1) {
            lattice.set_temperature(x, y, args.ignition_temp);
        }
    }
    for _ in 0..args.embers {
        lattice.spawn_ember(cx, cy);
    }

    println!(
        "brushfire: {}x{} lattice, {} links, {} steps",
        args.width,
        args.height,
        lattice.links().len(),
        args.steps
    );
    report(&lattice);

    for tick in 1..=args.steps {
        lattice.step();
        if tick % args.report_interval == 0 || tick == args.steps {
            println!("--- tick {tick} ---");
            report(&lattice);
        }
    }
}

/// Print an ASCII heat map plus lattice totals.
fn report(lattice: &Lattice) {
    let ignition = lattice.config().fuel_ignition_temp;
    for y in 0..lattice.height() {
        let mut row = String::with_capacity(lattice.width());
        for x in 0..lattice.width() {
            row.push(heat_glyph(lattice.temperature_at(x, y), ignition));
        }
        println!("{row}");
    }

    let burning = lattice.cells().iter().filter(|c| c.is_burning()).count();
    println!(
        "burning: {burning:4}  embers: {:3}  mass: {:.3e}  heat: {:.3e}",
        lattice.embers().len(),
        lattice.total_mass(),
        lattice.total_heat()
    );
}

/// Map a temperature to a glyph, saturating at four times the ignition
/// temperature so flame cores stay distinguishable from warm smoke.
fn heat_glyph(temperature: f32, ignition_temp: f32) -> char {
    const RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    let normalized = (temperature / (ignition_temp * 4.0)).clamp(0.0, 1.0);
    let index = (normalized * (RAMP.len() - 1) as f32).round() as usize;
    RAMP[index]
}
