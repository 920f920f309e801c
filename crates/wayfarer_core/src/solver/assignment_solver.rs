use rand::Rng;
use tracing::{debug, warn};

use crate::{
    candidates::candidate_pool::CandidatePools,
    distance::{distance_distribution::DistanceDistributions, distance_sampler::DistanceSampler},
    problem::assignment_problem::AssignmentProblem,
};

use super::{
    discretization_solver::{DiscretizationResult, DiscretizationSolver},
    gravity_chain_solver::GravityChainSolver,
    objective::DiscretizationErrorObjective,
    score::Score,
    solution::Solution,
    solver_params::AssignmentParams,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentResult {
    pub solution: Solution,
    pub score: Score,
    /// Attempts spent on the problem, between 1 and the maximum iterations.
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Accept,
    Retry,
    GiveUp,
}

struct Attempt {
    discretization: DiscretizationResult,
    score: Score,
    valid: bool,
    outcome: Outcome,
}

/// Repeats sampling, relaxation and discretization until an attempt is valid
/// or the iteration bound is reached, keeping the best attempt.
pub struct AssignmentSolver<'a> {
    sampler: DistanceSampler<'a>,
    relaxation: GravityChainSolver,
    discretization: DiscretizationSolver<'a>,
    objective: DiscretizationErrorObjective<'a>,
    maximum_iterations: usize,
}

impl<'a> AssignmentSolver<'a> {
    pub fn new(
        distributions: &'a DistanceDistributions,
        pools: &'a CandidatePools,
        params: &'a AssignmentParams,
    ) -> Self {
        Self {
            sampler: DistanceSampler::new(
                distributions,
                params.sampler_maximum_iterations,
                params.interpolate,
            ),
            relaxation: GravityChainSolver::new(&params.relaxation),
            discretization: DiscretizationSolver::new(pools),
            objective: DiscretizationErrorObjective::new(&params.thresholds),
            maximum_iterations: params.maximum_iterations.max(1),
        }
    }

    pub fn solve<R>(&self, problem: &AssignmentProblem, rng: &mut R) -> AssignmentResult
    where
        R: Rng,
    {
        let mut iterations = 1;
        let mut best = self.attempt(problem, iterations, rng);
        let mut outcome = best.outcome;

        while outcome == Outcome::Retry && iterations < self.maximum_iterations {
            iterations += 1;

            let attempt = self.attempt(problem, iterations, rng);
            outcome = attempt.outcome;
            if attempt.valid || attempt.score < best.score {
                best = attempt;
            }
        }

        AssignmentResult {
            solution: Solution {
                person_id: problem.person_id(),
                trip_index: problem.trip_index(),
                stops: best.discretization.stops,
                valid: best.valid,
            },
            score: best.score,
            iterations,
        }
    }

    fn attempt<R>(&self, problem: &AssignmentProblem, iteration: usize, rng: &mut R) -> Attempt
    where
        R: Rng,
    {
        let sampled = self.sampler.sample(problem, rng);
        let relaxed = self.relaxation.solve(problem, &sampled.distances, rng);
        let discretization = self.discretization.solve(problem, &relaxed.locations);
        let evaluation = self.objective.evaluate(
            problem,
            &relaxed.distances,
            &discretization.distances,
            discretization.missing_snaps(),
        );

        // Feasibility and convergence are diagnostics only.
        let valid = !evaluation.score.is_failure() && !sampled.missing_distribution;

        // Neither a missing distribution nor an empty pool improves with more draws.
        let outcome = if valid {
            Outcome::Accept
        } else if sampled.missing_distribution || !discretization.complete {
            if !discretization.complete {
                warn!(
                    person_id = %problem.person_id(),
                    "Empty candidate pool, keeping tentative locations"
                );
            }
            Outcome::GiveUp
        } else {
            Outcome::Retry
        };

        debug!(
            person_id = %problem.person_id(),
            trip_index = problem.trip_index(),
            iteration,
            hard_score = evaluation.score.hard_score,
            soft_score = evaluation.score.soft_score,
            feasible = sampled.feasible,
            converged = relaxed.converged,
            valid,
            "Assignment attempt"
        );

        Attempt {
            discretization,
            score: evaluation.score,
            valid,
            outcome,
        }
    }
}
