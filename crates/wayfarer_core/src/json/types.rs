use fxhash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    candidates::candidate_pool::{CandidatePool, CandidatePools, DestinationId, Facility},
    distance::distance_distribution::{
        DistanceDistribution, DistanceDistributions, EmpiricalCdf, SurveyTrip,
    },
    driver::parallel_driver::AssignmentOutput,
    error::{ChainError, DistributionError, ScenarioError},
    problem::{
        location::Location,
        mode::Mode,
        purpose::Purpose,
        trip::{PersonId, PrimaryLocations, Trip},
    },
    solver::solution::{ConvergenceRecord, LocationRow},
};

/// Inputs of an assignment run.
///
/// Candidates come either from `pools` or, when no pool is given, from
/// `facilities`. Distances come either from `distributions` or, when none is
/// given, are built from `survey` trips.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Scenario")]
pub struct JsonScenario {
    pub trips: Vec<Trip>,
    pub primary_locations: Vec<PrimaryLocations>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub pools: Vec<JsonCandidatePool>,
    #[serde(default)]
    pub distributions: Vec<JsonDistanceDistribution>,
    #[serde(default)]
    pub survey: Vec<SurveyTrip>,
    #[serde(default)]
    pub bin_size: Option<usize>,
    /// Skews the distance distribution of a mode after loading.
    #[serde(default)]
    pub calibration: Vec<JsonCalibration>,
}

impl JsonScenario {
    /// Trips sorted by person then trip id.
    pub fn sorted_trips(&self) -> Vec<Trip> {
        let mut trips = self.trips.clone();
        trips.sort_by_key(Trip::sort_key);
        trips
    }

    pub fn primary_locations(&self) -> FxHashMap<PersonId, PrimaryLocations> {
        self.primary_locations
            .iter()
            .map(|locations| (locations.person_id, locations.clone()))
            .collect()
    }

    #[instrument(skip_all, level = "debug")]
    pub fn candidate_pools(&self) -> Result<CandidatePools, ScenarioError> {
        if self.pools.is_empty() {
            return Ok(CandidatePools::from_facilities(&self.facilities)?);
        }

        let pools = self
            .pools
            .iter()
            .map(|pool| {
                CandidatePool::new(
                    pool.purpose,
                    pool.destination_ids.clone(),
                    pool.locations.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CandidatePools::new(pools))
    }

    #[instrument(skip_all, level = "debug")]
    pub fn distance_distributions(&self) -> Result<DistanceDistributions, ScenarioError> {
        let mut distributions = if !self.distributions.is_empty() {
            DistanceDistributions::new(
                self.distributions
                    .iter()
                    .map(JsonDistanceDistribution::to_distribution)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else if !self.survey.is_empty() {
            let bin_size = self.bin_size.unwrap_or(DistanceDistributions::DEFAULT_BIN_SIZE);
            info!(
                "Building distance distributions from {} survey trips",
                self.survey.len()
            );
            DistanceDistributions::from_survey(&self.survey, bin_size)?
        } else {
            return Err(ScenarioError::MissingDistributions);
        };

        for calibration in &self.calibration {
            distributions.resample(calibration.mode, calibration.factor);
        }

        Ok(distributions)
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "CandidatePool")]
pub struct JsonCandidatePool {
    pub purpose: Purpose,
    pub destination_ids: Vec<DestinationId>,
    pub locations: Vec<Location>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Calibration")]
pub struct JsonCalibration {
    pub mode: Mode,
    pub factor: f64,
}

/// Distances of one mode bucketed by travel time. `bounds` are the finite
/// upper bounds in seconds, the last of the `bounds.len() + 1` buckets is
/// unbounded.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "DistanceDistribution")]
pub struct JsonDistanceDistribution {
    pub mode: Mode,
    pub bounds: Vec<f64>,
    pub buckets: Vec<JsonDistanceBucket>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "DistanceBucket")]
pub struct JsonDistanceBucket {
    pub values: Vec<f64>,
    pub cdf: Vec<f64>,
}

impl JsonDistanceDistribution {
    pub fn to_distribution(&self) -> Result<DistanceDistribution, DistributionError> {
        let bounds = self
            .bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .collect::<Vec<_>>();
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| EmpiricalCdf::new(bucket.values.clone(), bucket.cdf.clone()))
            .collect::<Vec<_>>();

        DistanceDistribution::new(self.mode, bounds, buckets)
    }
}

impl From<&DistanceDistribution> for JsonDistanceDistribution {
    fn from(distribution: &DistanceDistribution) -> Self {
        JsonDistanceDistribution {
            mode: distribution.mode(),
            bounds: distribution
                .bounds()
                .iter()
                .copied()
                .filter(|bound| bound.is_finite())
                .collect(),
            buckets: distribution
                .buckets()
                .iter()
                .map(|bucket| JsonDistanceBucket {
                    values: bucket.values().to_vec(),
                    cdf: bucket.cdf().to_vec(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "ChainFailure")]
pub struct JsonChainFailure {
    pub person_id: PersonId,
    pub reason: String,
}

impl From<&ChainError> for JsonChainFailure {
    fn from(error: &ChainError) -> Self {
        JsonChainFailure {
            person_id: error.person_id(),
            reason: error.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "AssignmentOutput")]
pub struct JsonAssignmentOutput {
    pub locations: Vec<LocationRow>,
    pub convergence: Vec<ConvergenceRecord>,
    pub failures: Vec<JsonChainFailure>,
    pub persons: usize,
    pub persons_with_secondary: usize,
    pub success_rate: f64,
}

impl From<&AssignmentOutput> for JsonAssignmentOutput {
    fn from(output: &AssignmentOutput) -> Self {
        JsonAssignmentOutput {
            locations: output.locations.clone(),
            convergence: output.convergence.clone(),
            failures: output.failures.iter().map(JsonChainFailure::from).collect(),
            persons: output.persons,
            persons_with_secondary: output.persons_with_secondary,
            success_rate: output.success_rate(),
        }
    }
}
