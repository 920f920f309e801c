use crate::problem::{assignment_problem::AssignmentProblem, meters::Meters};

use super::{score::Score, solver_params::ModeThresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveEvaluation {
    pub score: Score,
    /// Legs whose discretization error exceeds the threshold of their mode.
    pub violations: usize,
    pub total_error: Meters,
}

/// Scores how far snapping to facilities moved the chain away from the
/// relaxed distances.
pub struct DiscretizationErrorObjective<'a> {
    thresholds: &'a ModeThresholds,
}

impl<'a> DiscretizationErrorObjective<'a> {
    pub fn new(thresholds: &'a ModeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(
        &self,
        problem: &AssignmentProblem,
        relaxed: &[Meters],
        discretized: &[Meters],
        missing_snaps: usize,
    ) -> ObjectiveEvaluation {
        let mut violations = 0;
        let mut total_error = Meters::ZERO;

        for ((&mode, &relaxed), &discretized) in problem.modes().iter().zip(relaxed).zip(discretized) {
            let error = discretized.abs_diff(relaxed);
            if error > self.thresholds.threshold(mode) {
                violations += 1;
            }
            total_error += error;
        }

        ObjectiveEvaluation {
            score: Score::new((violations + missing_snaps) as f64, total_error.value()),
            violations,
            total_error,
        }
    }
}
