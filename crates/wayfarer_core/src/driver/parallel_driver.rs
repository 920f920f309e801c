use std::ops::Range;

use fxhash::FxHashMap;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::{
    candidates::candidate_pool::CandidatePools,
    distance::distance_distribution::DistanceDistributions,
    error::{AssignmentError, ChainError},
    problem::{
        problem_extractor::ProblemExtractor,
        trip::{PersonId, PrimaryLocations, Trip},
    },
    solver::{
        solution::{ConvergenceRecord, LocationRow},
        solver_params::AssignmentParams,
    },
};

use super::{
    driver_params::DriverParams,
    worker_context::{self, WorkerContext},
};

#[derive(Debug, Default)]
pub struct AssignmentOutput {
    /// Sorted by person then trip index.
    pub locations: Vec<LocationRow>,
    /// One record per solved problem, in shard order.
    pub convergence: Vec<ConvergenceRecord>,
    /// Persons whose chain could not be split, none of their rows are kept.
    pub failures: Vec<ChainError>,
    pub persons: usize,
    /// Persons with at least one secondary activity to locate.
    pub persons_with_secondary: usize,
}

impl AssignmentOutput {
    /// Share of valid problems, `1.0` when there was nothing to solve.
    pub fn success_rate(&self) -> f64 {
        if self.convergence.is_empty() {
            return 1.0;
        }

        let valid = self.convergence.iter().filter(|record| record.valid).count();
        valid as f64 / self.convergence.len() as f64
    }

    fn extend(&mut self, other: AssignmentOutput) {
        self.locations.extend(other.locations);
        self.convergence.extend(other.convergence);
        self.failures.extend(other.failures);
        self.persons += other.persons;
        self.persons_with_secondary += other.persons_with_secondary;
    }
}

/// Splits the population into contiguous shards and assigns each shard on its
/// own worker.
pub struct ParallelDriver<'a> {
    distributions: &'a DistanceDistributions,
    pools: &'a CandidatePools,
    params: &'a AssignmentParams,
    driver_params: DriverParams,
}

impl<'a> ParallelDriver<'a> {
    pub fn new(
        distributions: &'a DistanceDistributions,
        pools: &'a CandidatePools,
        params: &'a AssignmentParams,
        driver_params: DriverParams,
    ) -> Self {
        Self {
            distributions,
            pools,
            params,
            driver_params,
        }
    }

    pub fn run(
        &self,
        trips: &[Trip],
        primary_locations: &FxHashMap<PersonId, PrimaryLocations>,
    ) -> Result<AssignmentOutput, AssignmentError> {
        self.run_with_progress(trips, primary_locations, |_| {})
    }

    /// `progress` is called once per finished person, from any worker.
    pub fn run_with_progress<F>(
        &self,
        trips: &[Trip],
        primary_locations: &FxHashMap<PersonId, PrimaryLocations>,
        progress: F,
    ) -> Result<AssignmentOutput, AssignmentError>
    where
        F: Fn(usize) + Send + Sync,
    {
        if let Some(pair) = trips
            .windows(2)
            .find(|pair| pair[0].sort_key() >= pair[1].sort_key())
        {
            return Err(AssignmentError::UnsortedTrips {
                person_id: pair[1].person_id,
                trip_id: pair[1].trip_id,
            });
        }

        let workers = self.driver_params.workers.number_of_threads();
        let shards = shard_trips(trips, workers);
        info!(
            "Assigning {} trips on {} workers ({} shards)",
            trips.len(),
            workers,
            shards.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        let outputs = pool.install(|| {
            shards
                .par_iter()
                .enumerate()
                .map(|(index, range)| {
                    self.run_worker(index, &trips[range.clone()], primary_locations, &progress)
                })
                .collect::<Vec<_>>()
        });

        let mut output = AssignmentOutput::default();
        for worker_output in outputs {
            output.extend(worker_output);
        }
        output.locations.sort_by_key(LocationRow::sort_key);

        info!(
            persons = output.persons,
            persons_with_secondary = output.persons_with_secondary,
            failures = output.failures.len(),
            "Assigned {} problems, success rate {:.4}",
            output.convergence.len(),
            output.success_rate()
        );

        Ok(output)
    }

    fn run_worker<F>(
        &self,
        index: usize,
        trips: &[Trip],
        primary_locations: &FxHashMap<PersonId, PrimaryLocations>,
        progress: &F,
    ) -> AssignmentOutput
    where
        F: Fn(usize) + Send + Sync,
    {
        let span = info_span!("worker", index);
        let _enter = span.enter();

        let mut context = WorkerContext::new(
            index,
            self.driver_params.seed.wrapping_add(index as u64),
            self.distributions,
            self.pools,
            self.params,
        );
        let mut output = AssignmentOutput::default();

        for person_trips in trips.chunk_by(|a, b| a.person_id == b.person_id) {
            assign_person(person_trips, primary_locations, &mut context, &mut output);
            progress(1);
        }

        debug!(
            "Worker {} done: {} persons, {} problems",
            context.index(),
            output.persons,
            output.convergence.len()
        );

        output
    }
}

fn assign_person(
    trips: &[Trip],
    primary_locations: &FxHashMap<PersonId, PrimaryLocations>,
    context: &mut WorkerContext,
    output: &mut AssignmentOutput,
) {
    output.persons += 1;

    let problems = match ProblemExtractor::new(trips, primary_locations).collect::<Result<Vec<_>, _>>() {
        Ok(problems) => problems,
        Err(error) => {
            warn!("Skipping person: {error}");
            output.failures.push(error);
            return;
        }
    };

    if problems.is_empty() {
        return;
    }

    output.persons_with_secondary += 1;
    for problem in &problems {
        let result = worker_context::solve(problem, context);
        output.locations.extend(result.solution.location_rows());
        output.convergence.push(result.solution.convergence());
    }
}

/// Splits person-sorted trips into at most `shards` contiguous ranges holding
/// whole persons. The first `persons % shards` ranges get one extra person.
fn shard_trips(trips: &[Trip], shards: usize) -> Vec<Range<usize>> {
    let mut persons = Vec::new();
    let mut start = 0;
    for person_trips in trips.chunk_by(|a, b| a.person_id == b.person_id) {
        persons.push(start..start + person_trips.len());
        start += person_trips.len();
    }

    let shards = shards.max(1).min(persons.len());
    if shards == 0 {
        return Vec::new();
    }

    let (base, extra) = (persons.len() / shards, persons.len() % shards);
    let mut ranges = Vec::with_capacity(shards);
    let mut first = 0;
    for shard in 0..shards {
        let count = base + usize::from(shard < extra);
        let last = first + count - 1;
        ranges.push(persons[first].start..persons[last].end);
        first += count;
    }

    ranges
}
