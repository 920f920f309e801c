use jiff::SignedDuration;
use rand::Rng;
use tracing::warn;

use crate::problem::{assignment_problem::AssignmentProblem, meters::Meters, mode::Mode};

use super::distance_distribution::DistanceDistributions;

#[derive(Debug, Clone, PartialEq)]
pub struct SampledDistances {
    /// One distance per leg of the problem.
    pub distances: Vec<Meters>,
    /// Whether the legs of a chain together span the distance between its
    /// anchors. Always true for tails.
    pub feasible: bool,
    /// At least one leg uses a mode without distribution, its distance is zero.
    pub missing_distribution: bool,
    pub iterations: usize,
}

pub struct DistanceSampler<'a> {
    distributions: &'a DistanceDistributions,
    maximum_iterations: usize,
    interpolate: bool,
}

impl<'a> DistanceSampler<'a> {
    pub fn new(
        distributions: &'a DistanceDistributions,
        maximum_iterations: usize,
        interpolate: bool,
    ) -> Self {
        Self {
            distributions,
            maximum_iterations: maximum_iterations.max(1),
            interpolate,
        }
    }

    /// Draws one distance for a leg, `None` when the mode has no distribution.
    pub fn sample_leg<R>(&self, mode: Mode, travel_time: SignedDuration, rng: &mut R) -> Option<Meters>
    where
        R: Rng,
    {
        let distribution = self.distributions.get(mode)?;
        let u = rng.random::<f64>();

        Some(distribution.sample(travel_time, u, self.interpolate))
    }

    fn sample_legs<R>(&self, problem: &AssignmentProblem, rng: &mut R) -> Vec<Meters>
    where
        R: Rng,
    {
        problem
            .modes()
            .iter()
            .zip(problem.travel_times())
            .map(|(&mode, &travel_time)| {
                self.sample_leg(mode, travel_time, rng)
                    .unwrap_or(Meters::ZERO)
            })
            .collect()
    }

    /// Samples a distance for every leg of the problem. Chains are resampled
    /// until the legs reach from one anchor to the other, up to the iteration
    /// bound.
    pub fn sample<R>(&self, problem: &AssignmentProblem, rng: &mut R) -> SampledDistances
    where
        R: Rng,
    {
        let missing_modes = problem
            .modes()
            .iter()
            .filter(|&&mode| self.distributions.get(mode).is_none())
            .collect::<Vec<_>>();

        if !missing_modes.is_empty() {
            warn!(
                person_id = %problem.person_id(),
                "No distance distribution for modes {missing_modes:?}"
            );

            return SampledDistances {
                distances: self.sample_legs(problem, rng),
                feasible: false,
                missing_distribution: true,
                iterations: 1,
            };
        }

        let direct_distance = problem.direct_distance();
        let mut distances = Vec::new();

        for iteration in 1..=self.maximum_iterations {
            distances = self.sample_legs(problem, rng);

            let feasible = match direct_distance {
                Some(direct_distance) => spans(direct_distance, &distances),
                None => true,
            };

            if feasible {
                return SampledDistances {
                    distances,
                    feasible,
                    missing_distribution: false,
                    iterations: iteration,
                };
            }
        }

        SampledDistances {
            distances,
            feasible: false,
            missing_distribution: false,
            iterations: self.maximum_iterations,
        }
    }
}

/// The legs, laid end to end, are at least as long as the direct distance
/// between both anchors.
fn spans(direct_distance: Meters, distances: &[Meters]) -> bool {
    let total = distances.iter().sum::<Meters>();
    total.value() + 1e-6 >= direct_distance.value()
}
