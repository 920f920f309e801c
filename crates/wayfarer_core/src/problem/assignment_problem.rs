use jiff::SignedDuration;
use serde::Serialize;

use super::{location::Location, meters::Meters, mode::Mode, purpose::Purpose, trip::PersonId};

/// A fixed activity bounding a run of secondary activities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub purpose: Purpose,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// Both ends are anchored.
    Chain,
    /// Starts at an anchor and the day ends away from any anchor.
    OriginTail,
    /// Starts away from any anchor and ends at one.
    DestinationTail,
}

/// A run of secondary activities that can be located independently of the
/// rest of the person's day.
///
/// `trip_ids`, `modes` and `travel_times` are indexed by leg. A chain has
/// `size + 1` legs (anchor, stops, anchor), a tail has `size` legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentProblem {
    person_id: PersonId,
    trip_ids: Vec<usize>,
    purposes: Vec<Purpose>,
    modes: Vec<Mode>,
    travel_times: Vec<SignedDuration>,
    origin: Option<Anchor>,
    destination: Option<Anchor>,
}

impl AssignmentProblem {
    pub fn new(
        person_id: PersonId,
        trip_ids: Vec<usize>,
        purposes: Vec<Purpose>,
        modes: Vec<Mode>,
        travel_times: Vec<SignedDuration>,
        origin: Option<Anchor>,
        destination: Option<Anchor>,
    ) -> Self {
        if origin.is_none() && destination.is_none() {
            panic!("Assignment problem of person {person_id} has neither origin nor destination");
        }

        if purposes.is_empty() {
            panic!("Assignment problem of person {person_id} has no stop");
        }

        if purposes.iter().any(Purpose::is_fixed) {
            panic!("Assignment problem of person {person_id} contains a fixed purpose");
        }

        let expected_legs = if origin.is_some() && destination.is_some() {
            purposes.len() + 1
        } else {
            purposes.len()
        };

        if trip_ids.len() != expected_legs
            || modes.len() != expected_legs
            || travel_times.len() != expected_legs
        {
            panic!(
                "Assignment problem of person {person_id} expects {expected_legs} legs, got {} trips, {} modes and {} travel times",
                trip_ids.len(),
                modes.len(),
                travel_times.len()
            );
        }

        Self {
            person_id,
            trip_ids,
            purposes,
            modes,
            travel_times,
            origin,
            destination,
        }
    }

    pub fn person_id(&self) -> PersonId {
        self.person_id
    }

    /// Trip id of the first leg.
    pub fn trip_index(&self) -> usize {
        self.trip_ids[0]
    }

    /// Trip id keying the row of every stop: the trip arriving at the stop,
    /// or for a tail without origin the trip leaving it.
    pub fn stop_trip_ids(&self) -> &[usize] {
        &self.trip_ids[..self.purposes.len()]
    }

    pub fn purposes(&self) -> &[Purpose] {
        &self.purposes
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn travel_times(&self) -> &[SignedDuration] {
        &self.travel_times
    }

    pub fn origin(&self) -> Option<&Anchor> {
        self.origin.as_ref()
    }

    pub fn destination(&self) -> Option<&Anchor> {
        self.destination.as_ref()
    }

    pub fn origin_location(&self) -> Option<Location> {
        self.origin.map(|anchor| anchor.location)
    }

    pub fn destination_location(&self) -> Option<Location> {
        self.destination.map(|anchor| anchor.location)
    }

    /// Number of secondary stops to locate.
    pub fn size(&self) -> usize {
        self.purposes.len()
    }

    pub fn leg_count(&self) -> usize {
        self.modes.len()
    }

    pub fn kind(&self) -> ProblemKind {
        match (self.origin.is_some(), self.destination.is_some()) {
            (true, true) => ProblemKind::Chain,
            (true, false) => ProblemKind::OriginTail,
            _ => ProblemKind::DestinationTail,
        }
    }

    /// Straight line distance between both anchors of a chain.
    pub fn direct_distance(&self) -> Option<Meters> {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => {
                Some(origin.location.euclidean_distance(&destination.location))
            }
            _ => None,
        }
    }

    /// Coordinates of every point of the chain, anchors included, given the
    /// locations of the stops. Consecutive points are joined by one leg.
    pub fn chain_points(&self, stops: &[Location]) -> Vec<Location> {
        self.origin_location()
            .into_iter()
            .chain(stops.iter().copied())
            .chain(self.destination_location())
            .collect()
    }

    /// Length of every leg given the locations of the stops.
    pub fn leg_distances(&self, stops: &[Location]) -> Vec<Meters> {
        self.chain_points(stops)
            .windows(2)
            .map(|pair| pair[0].euclidean_distance(&pair[1]))
            .collect()
    }
}
