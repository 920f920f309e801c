use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    candidates::candidate_pool::CandidatePools,
    distance::distance_distribution::DistanceDistributions,
    problem::assignment_problem::AssignmentProblem,
    solver::{
        assignment_solver::{AssignmentResult, AssignmentSolver},
        solver_params::AssignmentParams,
    },
};

/// Everything a worker needs to solve problems: shared read-only inputs and
/// its own random generator.
pub struct WorkerContext<'a> {
    index: usize,
    solver: AssignmentSolver<'a>,
    rng: SmallRng,
}

impl<'a> WorkerContext<'a> {
    pub fn new(
        index: usize,
        seed: u64,
        distributions: &'a DistanceDistributions,
        pools: &'a CandidatePools,
        params: &'a AssignmentParams,
    ) -> Self {
        Self {
            index,
            solver: AssignmentSolver::new(distributions, pools, params),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Solves one problem, drawing from the worker's generator.
pub fn solve(problem: &AssignmentProblem, context: &mut WorkerContext) -> AssignmentResult {
    context.solver.solve(problem, &mut context.rng)
}
