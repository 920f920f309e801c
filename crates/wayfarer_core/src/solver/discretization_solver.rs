use tracing::debug;

use crate::{
    candidates::candidate_pool::CandidatePools,
    problem::{assignment_problem::AssignmentProblem, location::Location, meters::Meters},
};

use super::solution::AssignedStop;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizationResult {
    pub stops: Vec<AssignedStop>,
    /// Leg lengths between the snapped stops and the anchors.
    pub distances: Vec<Meters>,
    /// Every stop was snapped to a candidate.
    pub complete: bool,
}

impl DiscretizationResult {
    pub fn missing_snaps(&self) -> usize {
        self.stops
            .iter()
            .filter(|stop| stop.destination_id.is_none())
            .count()
    }
}

/// Snaps every tentative stop to the nearest candidate of its purpose.
/// Stops are snapped independently, two stops may share a destination.
pub struct DiscretizationSolver<'a> {
    pools: &'a CandidatePools,
}

impl<'a> DiscretizationSolver<'a> {
    pub fn new(pools: &'a CandidatePools) -> Self {
        Self { pools }
    }

    pub fn solve(&self, problem: &AssignmentProblem, locations: &[Location]) -> DiscretizationResult {
        let stops = problem
            .purposes()
            .iter()
            .zip(problem.stop_trip_ids())
            .zip(locations)
            .map(|((&purpose, &trip_id), &tentative)| {
                match self
                    .pools
                    .pool(purpose)
                    .and_then(|pool| pool.nearest(&tentative))
                {
                    Some(candidate) => AssignedStop {
                        trip_id,
                        purpose,
                        destination_id: Some(candidate.destination_id),
                        location: candidate.location,
                    },
                    None => {
                        debug!(
                            person_id = %problem.person_id(),
                            "No {purpose} candidate, keeping tentative location"
                        );
                        AssignedStop {
                            trip_id,
                            purpose,
                            destination_id: None,
                            location: tentative,
                        }
                    }
                }
            })
            .collect::<Vec<_>>();

        let snapped = stops.iter().map(|stop| stop.location).collect::<Vec<_>>();
        let distances = problem.leg_distances(&snapped);
        let complete = stops.iter().all(|stop| stop.destination_id.is_some());

        DiscretizationResult {
            stops,
            distances,
            complete,
        }
    }
}
