use std::path::PathBuf;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use tracing::info;
use wayfarer_core::{
    distance::distance_distribution::{DistanceDistributions, SurveyTrip},
    json::types::JsonDistanceDistribution,
};

use crate::file_utils;

#[derive(Args)]
pub struct DistributionsArgs {
    /// JSON array of survey trips
    #[arg(short, long, env = "WAYFARER_SURVEY")]
    survey: PathBuf,

    /// Distinct travel times per bucket
    #[arg(short, long, env = "WAYFARER_BIN_SIZE", default_value_t = DistanceDistributions::DEFAULT_BIN_SIZE)]
    bin_size: usize,

    /// Where to write the distributions, ready for the `distributions` field of a scenario
    #[arg(short, long)]
    output: PathBuf,
}

pub fn run(args: DistributionsArgs) -> Result<(), anyhow::Error> {
    let survey: Vec<SurveyTrip> = file_utils::read_json(&args.survey)?;
    info!("Building distributions from {} survey trips", survey.len());

    let distributions = DistanceDistributions::from_survey(&survey, args.bin_size)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Mode", "Buckets", "Observations", "Longest distance"]);
    for distribution in distributions.iter() {
        let observations = distribution
            .buckets()
            .iter()
            .map(|bucket| bucket.values().len())
            .sum::<usize>();
        let longest = distribution
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.values().last())
            .copied()
            .fold(0.0, f64::max);

        table.add_row(vec![
            distribution.mode().to_string(),
            distribution.buckets().len().to_string(),
            observations.to_string(),
            format!("{longest:.0}m"),
        ]);
    }
    println!("{table}");

    let json = distributions
        .iter()
        .map(JsonDistanceDistribution::from)
        .collect::<Vec<_>>();
    file_utils::write_json(&args.output, &json)?;
    info!("Distributions written to {}", args.output.display());

    Ok(())
}
