use std::{path::PathBuf, time::Instant};

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use wayfarer_core::{
    driver::{
        driver_params::{DriverParams, Threads},
        parallel_driver::{AssignmentOutput, ParallelDriver},
    },
    json::types::{JsonAssignmentOutput, JsonScenario},
    problem::meters::Meters,
    solver::solver_params::{AssignmentParams, ModeThresholds},
};

use crate::file_utils;

#[derive(Args)]
pub struct AssignArgs {
    /// Scenario file (trips, primary locations, candidates and distances)
    #[arg(short, long, env = "WAYFARER_SCENARIO")]
    scenario: PathBuf,

    /// Where to write the assigned locations
    #[arg(short, long, env = "WAYFARER_OUTPUT")]
    output: Option<PathBuf>,

    /// Solver parameters file, missing fields keep their default
    #[arg(short, long, env = "WAYFARER_PARAMS")]
    params: Option<PathBuf>,

    /// Number of workers, 0 uses every available core
    #[arg(short, long, env = "WAYFARER_THREADS", default_value_t = 1)]
    threads: usize,

    /// Base seed, worker `i` is seeded with `seed + i`
    #[arg(long, env = "WAYFARER_SEED", default_value_t = 0)]
    seed: u64,

    /// Overrides the number of attempts per problem
    #[arg(long, env = "WAYFARER_MAX_ITERATIONS")]
    max_iterations: Option<usize>,

    /// Overrides the discretization threshold (meters) of every mode
    #[arg(long, env = "WAYFARER_THRESHOLD")]
    threshold: Option<f64>,
}

pub fn run(args: AssignArgs) -> Result<(), anyhow::Error> {
    info!("Loading scenario {:?}", args.scenario);
    let scenario: JsonScenario = file_utils::read_json(&args.scenario)?;

    let mut params = match &args.params {
        Some(path) => file_utils::read_json::<AssignmentParams>(path)?,
        None => AssignmentParams::default(),
    };
    if let Some(max_iterations) = args.max_iterations {
        params.maximum_iterations = max_iterations;
    }
    if let Some(threshold) = args.threshold {
        params.thresholds = ModeThresholds::uniform(Meters::new(threshold));
    }

    let trips = scenario.sorted_trips();
    let primary_locations = scenario.primary_locations();
    let pools = scenario.candidate_pools()?;
    let distributions = scenario.distance_distributions()?;

    let persons = trips
        .chunk_by(|a, b| a.person_id == b.person_id)
        .count();
    info!(
        "{} trips of {} persons, {} candidates",
        trips.len(),
        persons,
        pools.iter().map(|pool| pool.len()).sum::<usize>()
    );

    let driver = ParallelDriver::new(
        &distributions,
        &pools,
        &params,
        DriverParams {
            workers: Threads::from(args.threads),
            seed: args.seed,
        },
    );

    let bar = ProgressBar::new(persons as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} persons ({elapsed}, eta {eta})")?,
    );

    let start = Instant::now();
    let output = driver.run_with_progress(&trips, &primary_locations, |count| {
        bar.inc(count as u64)
    })?;
    bar.finish_and_clear();

    println!("{}", summary_table(&output, start.elapsed().as_secs_f64()));

    if let Some(path) = &args.output {
        file_utils::write_json(path, &JsonAssignmentOutput::from(&output))?;
        info!("Locations written to {}", path.display());
    }

    Ok(())
}

fn summary_table(output: &AssignmentOutput, seconds: f64) -> Table {
    let valid = output
        .convergence
        .iter()
        .filter(|record| record.valid)
        .count();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["", "Value"]);
    table.add_row(vec!["Persons".to_string(), output.persons.to_string()]);
    table.add_row(vec![
        "Persons with secondary activities".to_string(),
        output.persons_with_secondary.to_string(),
    ]);
    table.add_row(vec!["Failed persons".to_string(), output.failures.len().to_string()]);
    table.add_row(vec!["Problems".to_string(), output.convergence.len().to_string()]);
    table.add_row(vec!["Valid problems".to_string(), valid.to_string()]);
    table.add_row(vec![
        "Success rate".to_string(),
        format!("{:.2}%", output.success_rate() * 100.0),
    ]);
    table.add_row(vec!["Assigned stops".to_string(), output.locations.len().to_string()]);
    table.add_row(vec!["Duration".to_string(), format!("{seconds:.2}s")]);

    table
}
