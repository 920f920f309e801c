use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    candidates::candidate_pool::DestinationId,
    problem::{location::Location, purpose::Purpose, trip::PersonId},
};

/// Destination chosen for one secondary stop. `destination_id` is `None`
/// when the pool of the purpose is empty, the location is then the tentative
/// coordinate from the relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssignedStop {
    /// Trip keying the stop, see
    /// [`crate::problem::assignment_problem::AssignmentProblem::stop_trip_ids`].
    pub trip_id: usize,
    pub purpose: Purpose,
    pub destination_id: Option<DestinationId>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Solution {
    pub person_id: PersonId,
    /// Trip id of the first leg of the problem.
    pub trip_index: usize,
    pub stops: Vec<AssignedStop>,
    pub valid: bool,
}

impl Solution {
    pub fn size(&self) -> usize {
        self.stops.len()
    }

    pub fn location_rows(&self) -> impl Iterator<Item = LocationRow> + '_ {
        self.stops.iter().map(|stop| LocationRow {
            person_id: self.person_id,
            trip_index: stop.trip_id,
            destination_id: stop.destination_id,
            location: stop.location,
        })
    }

    pub fn convergence(&self) -> ConvergenceRecord {
        ConvergenceRecord {
            valid: self.valid,
            size: self.size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConvergenceRecord {
    pub valid: bool,
    pub size: usize,
}

/// Destination of a secondary activity. `trip_index` is the id of the trip
/// arriving at the activity, or of the trip leaving it when the day starts
/// there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationRow {
    pub person_id: PersonId,
    pub trip_index: usize,
    pub destination_id: Option<DestinationId>,
    pub location: Location,
}

impl LocationRow {
    pub fn sort_key(&self) -> (PersonId, usize) {
        (self.person_id, self.trip_index)
    }
}
