use std::iter::Peekable;

use fxhash::FxHashMap;
use jiff::SignedDuration;

use crate::error::ChainError;

use super::{
    assignment_problem::{Anchor, AssignmentProblem},
    mode::Mode,
    purpose::Purpose,
    trip::{PersonId, PrimaryLocations, Trip},
};

/// Legs accumulated until the run is closed by a fixed purpose, a change of
/// person or the end of the trips.
struct PendingRun {
    person_id: PersonId,
    trip_ids: Vec<usize>,
    purposes: Vec<Purpose>,
    modes: Vec<Mode>,
    travel_times: Vec<SignedDuration>,
}

impl PendingRun {
    fn start(trip: &Trip) -> Self {
        Self {
            person_id: trip.person_id,
            trip_ids: Vec::new(),
            purposes: vec![trip.preceding_purpose],
            modes: Vec::new(),
            travel_times: Vec::new(),
        }
    }

    fn push(&mut self, trip: &Trip) {
        self.trip_ids.push(trip.trip_id);
        self.purposes.push(trip.following_purpose);
        self.modes.push(trip.mode);
        self.travel_times.push(trip.travel_time);
    }
}

/// Splits person-sorted trips into independent assignment problems.
///
/// Runs of secondary purposes are emitted lazily, in person then chain order.
/// Runs without any secondary stop are skipped.
pub struct ProblemExtractor<'a, I>
where
    I: Iterator<Item = &'a Trip>,
{
    trips: Peekable<I>,
    primary_locations: &'a FxHashMap<PersonId, PrimaryLocations>,
    pending: Option<PendingRun>,
}

impl<'a> ProblemExtractor<'a, std::slice::Iter<'a, Trip>> {
    pub fn new(
        trips: &'a [Trip],
        primary_locations: &'a FxHashMap<PersonId, PrimaryLocations>,
    ) -> Self {
        Self::from_iter(trips.iter(), primary_locations)
    }
}

impl<'a, I> ProblemExtractor<'a, I>
where
    I: Iterator<Item = &'a Trip>,
{
    pub fn from_iter(
        trips: I,
        primary_locations: &'a FxHashMap<PersonId, PrimaryLocations>,
    ) -> Self {
        Self {
            trips: trips.peekable(),
            primary_locations,
            pending: None,
        }
    }

    fn anchor(&self, person_id: PersonId, purpose: Purpose) -> Result<Anchor, ChainError> {
        self.primary_locations
            .get(&person_id)
            .and_then(|locations| locations.anchor(purpose))
            .map(|location| Anchor { purpose, location })
            .ok_or(ChainError::MissingAnchor { person_id, purpose })
    }

    fn close(&self, run: PendingRun) -> Option<Result<AssignmentProblem, ChainError>> {
        let PendingRun {
            person_id,
            trip_ids,
            mut purposes,
            modes,
            travel_times,
        } = run;

        // A run always holds at least the preceding purpose of its first trip
        // and the following purpose of its last one.
        let first = *purposes.first()?;
        let last = *purposes.last()?;
        let trip_id = *trip_ids.first()?;

        if !first.is_fixed() && !last.is_fixed() {
            return Some(Err(ChainError::MalformedChain { person_id, trip_id }));
        }

        if last.is_fixed() {
            purposes.pop();
        }

        if first.is_fixed() {
            purposes.remove(0);
        }

        if purposes.is_empty() {
            return None;
        }

        let origin = match first.is_fixed() {
            true => match self.anchor(person_id, first) {
                Ok(anchor) => Some(anchor),
                Err(error) => return Some(Err(error)),
            },
            false => None,
        };

        let destination = match last.is_fixed() {
            true => match self.anchor(person_id, last) {
                Ok(anchor) => Some(anchor),
                Err(error) => return Some(Err(error)),
            },
            false => None,
        };

        Some(Ok(AssignmentProblem::new(
            person_id,
            trip_ids,
            purposes,
            modes,
            travel_times,
            origin,
            destination,
        )))
    }
}

impl<'a, I> Iterator for ProblemExtractor<'a, I>
where
    I: Iterator<Item = &'a Trip>,
{
    type Item = Result<AssignmentProblem, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(&trip) = self.trips.peek() else {
                // Implicit tail at the end of the trips
                let run = self.pending.take()?;
                match self.close(run) {
                    Some(result) => return Some(result),
                    None => continue,
                }
            };

            let switched_person = self
                .pending
                .as_ref()
                .is_some_and(|run| run.person_id != trip.person_id);

            if switched_person && let Some(run) = self.pending.take() {
                // The previous person's day ended away from an anchor
                if let Some(result) = self.close(run) {
                    return Some(result);
                }
                continue;
            }

            self.trips.next();

            let run = self
                .pending
                .get_or_insert_with(|| PendingRun::start(trip));
            run.push(trip);

            if trip.following_purpose.is_fixed()
                && let Some(run) = self.pending.take()
                && let Some(result) = self.close(run)
            {
                return Some(result);
            }
        }
    }
}
