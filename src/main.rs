//! City Tour - Command Line Interface
//!
//! Plans a short tour through the places listed in a CSV file.

use city_tour::error::Result;
use city_tour::geojson::{route_to_geojson, write_geojson};
use city_tour::heuristics::local_search::AnnealingConfig;
use city_tour::instance::TourInstance;
use city_tour::planner::{PlannerConfig, TourPlan, TourPlanner};
use city_tour::visualization::Visualizer;
use clap::{Parser, ValueEnum};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "city-tour")]
#[command(version = "1.0")]
#[command(about = "Plan a short tour through a set of places")]
struct Cli {
    /// CSV file with places (Name,Lat,Lon)
    #[arg(long)]
    csv: PathBuf,

    /// Name of the starting point
    #[arg(long)]
    start: String,

    /// Return to the starting point
    #[arg(long = "return")]
    return_to_start: bool,

    /// Algorithm to use
    #[arg(long, value_enum, default_value = "greedy")]
    algo: Algorithm,

    /// Random seed for simulated annealing
    #[arg(short, long)]
    seed: Option<u64>,

    /// Initial annealing temperature
    #[arg(long, default_value = "1000")]
    temp_start: f64,

    /// Annealing stops once the temperature drops to this value
    #[arg(long, default_value = "0.01")]
    temp_end: f64,

    /// Multiplicative cooling factor per iteration
    #[arg(long, default_value = "0.995")]
    cooling_rate: f64,

    /// Stop 2-opt after this many full passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// GeoJSON output file
    #[arg(short, long, default_value = "route.geojson")]
    output: PathBuf,

    /// Save a chart of the final route (.svg or .png)
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Save a chart comparing the greedy route with the final route (.svg or .png)
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Nearest neighbor followed by 2-opt
    Greedy,
    /// Nearest neighbor, simulated annealing, then 2-opt
    SimulatedAnnealing,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let instance = TourInstance::from_csv(&cli.csv)?;
    println!("Read {} places from {}", instance.len(), cli.csv.display());

    if cli.verbose {
        println!("{}", instance.statistics());
    }

    let start_idx = instance.find_start(&cli.start)?;

    let config = PlannerConfig {
        return_to_start: cli.return_to_start,
        algorithm: match cli.algo {
            Algorithm::Greedy => city_tour::planner::Algorithm::Greedy,
            Algorithm::SimulatedAnnealing => city_tour::planner::Algorithm::SimulatedAnnealing,
        },
        annealing: AnnealingConfig {
            temp_start: cli.temp_start,
            temp_end: cli.temp_end,
            cooling_rate: cli.cooling_rate,
        },
        seed: cli.seed,
        max_two_opt_passes: cli.max_passes,
    };

    let start = Instant::now();
    let plan = TourPlanner::new(config).plan(&instance, start_idx)?;
    let elapsed = start.elapsed();

    print_plan(&instance, &plan, cli.return_to_start);

    if cli.verbose {
        println!("\n{}", plan.improved);
        println!("Greedy distance: {:.1} km", plan.initial.distance);
        println!("Improvement: {:.2}%", plan.improvement_percent());
        println!("Time: {:.4}s", elapsed.as_secs_f64());
    }

    let collection = route_to_geojson(&instance.places, &plan.improved.route);
    write_geojson(&cli.output, &collection)?;
    println!("Route written to {}", cli.output.display());

    render_charts(cli, &instance, &plan);

    Ok(())
}

fn print_plan(instance: &TourInstance, plan: &TourPlan, return_to_start: bool) {
    println!(
        "\nOptimal tour{}:",
        if return_to_start { " (returns to start)" } else { "" }
    );
    for stop in plan.improved.itinerary(&instance.places) {
        println!("{}) {}", stop.order, stop.name);
    }
    println!("\nTotal distance: {:.1} km", plan.improved.distance);
}

/// Charts are optional: failures are reported and the run carries on.
fn render_charts(cli: &Cli, instance: &TourInstance, plan: &TourPlan) {
    let viz = Visualizer::new();

    if let Some(path) = &cli.plot {
        let svg = viz.route_svg(
            &instance.places,
            &plan.improved.route,
            &format!("Optimized Route | Distance: {:.2} km", plan.improved.distance),
        );
        match viz.save_chart(&svg, path) {
            Ok(written) => println!("Chart saved to {}", written.display()),
            Err(e) => log::warn!("Could not save chart to {}: {}", path.display(), e),
        }
    }

    if let Some(path) = &cli.compare {
        let svg = viz.comparison_svg(
            &instance.places,
            &plan.initial.route,
            &plan.improved.route,
            plan.initial.distance,
            plan.improved.distance,
        );
        match viz.save_chart(&svg, path) {
            Ok(written) => println!("Comparison saved to {}", written.display()),
            Err(e) => log::warn!("Could not save comparison to {}: {}", path.display(), e),
        }
    }
}
