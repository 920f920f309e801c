use fxhash::FxHashMap;
use jiff::SignedDuration;
use rand::RngCore;

use crate::{
    candidates::candidate_pool::{CandidatePool, DestinationId},
    distance::distance_distribution::{DistanceDistribution, DistanceDistributions, EmpiricalCdf},
    problem::{
        assignment_problem::{Anchor, AssignmentProblem},
        location::Location,
        mode::Mode,
        purpose::Purpose,
        trip::{PersonId, PrimaryLocations, Trip},
    },
};

#[derive(Clone)]
pub struct TestTrip {
    pub preceding_purpose: Purpose,
    pub following_purpose: Purpose,
    pub mode: Mode,
    pub travel_time: SignedDuration,
}

impl TestTrip {
    pub fn new(preceding_purpose: Purpose, following_purpose: Purpose, mode: Mode) -> Self {
        TestTrip {
            preceding_purpose,
            following_purpose,
            mode,
            travel_time: SignedDuration::from_mins(10),
        }
    }
}

/// Trips of one person, numbered from 0 in chain order.
pub fn create_trips(person_id: u64, trips: Vec<TestTrip>) -> Vec<Trip> {
    trips
        .into_iter()
        .enumerate()
        .map(|(trip_id, trip)| Trip {
            person_id: PersonId::new(person_id),
            trip_id,
            preceding_purpose: trip.preceding_purpose,
            following_purpose: trip.following_purpose,
            mode: trip.mode,
            travel_time: trip.travel_time,
        })
        .collect()
}

pub fn create_primary_locations(
    locations: Vec<PrimaryLocations>,
) -> FxHashMap<PersonId, PrimaryLocations> {
    locations
        .into_iter()
        .map(|locations| (locations.person_id, locations))
        .collect()
}

/// Every mode gets a single bucket in which each value is equally likely.
pub fn create_uniform_distributions(modes: &[Mode], mut values: Vec<f64>) -> DistanceDistributions {
    values.sort_by(f64::total_cmp);
    let count = values.len() as f64;
    let cdf = (1..=values.len()).map(|k| k as f64 / count).collect::<Vec<_>>();

    DistanceDistributions::new(
        modes
            .iter()
            .map(|&mode| {
                DistanceDistribution::new(
                    mode,
                    vec![f64::INFINITY],
                    vec![EmpiricalCdf::new(values.clone(), cdf.clone())],
                )
                .unwrap()
            })
            .collect(),
    )
}

/// Problem of person 1 whose legs are trips 0, 1, ... The origin is anchored at
/// home and the destination at work.
pub fn create_problem(
    origin: Option<(f64, f64)>,
    purposes: Vec<Purpose>,
    modes: Vec<Mode>,
    destination: Option<(f64, f64)>,
) -> AssignmentProblem {
    let travel_times = vec![SignedDuration::from_mins(10); modes.len()];
    let trip_ids = (0..modes.len()).collect();

    AssignmentProblem::new(
        PersonId::new(1),
        trip_ids,
        purposes,
        modes,
        travel_times,
        origin.map(|(x, y)| Anchor {
            purpose: Purpose::Home,
            location: Location::from_cartesian(x, y),
        }),
        destination.map(|(x, y)| Anchor {
            purpose: Purpose::Work,
            location: Location::from_cartesian(x, y),
        }),
    )
}

pub fn create_chain_problem(
    origin: (f64, f64),
    purposes: Vec<Purpose>,
    modes: Vec<Mode>,
    destination: Option<(f64, f64)>,
) -> AssignmentProblem {
    create_problem(Some(origin), purposes, modes, destination)
}

/// Pool whose destination ids are the positions of the points.
pub fn create_pool(purpose: Purpose, points: Vec<(f64, f64)>) -> CandidatePool {
    let (identifiers, locations) = points
        .into_iter()
        .enumerate()
        .map(|(index, (x, y))| {
            (
                DestinationId::new(index as u64),
                Location::from_cartesian(x, y),
            )
        })
        .unzip();

    CandidatePool::new(purpose, identifiers, locations).unwrap()
}

pub struct MockRng {
    data: Vec<u64>,
    index: usize,
}

impl MockRng {
    pub fn new(data: Vec<u64>) -> Self {
        MockRng { data, index: 0 }
    }
}

impl RngCore for MockRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.data[self.index % self.data.len()];
        self.index = (self.index + 1) % self.data.len();
        value
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for byte in dst.iter_mut() {
            *byte = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_mock_rng_cycles() {
        let data = vec![1, 2, 3, 4];
        let mut rng = MockRng::new(data.clone());

        for &expected in data.iter().cycle().take(8) {
            assert_eq!(rng.next_u64(), expected);
        }
    }

    #[test]
    fn test_mock_rng_uniform_floats() {
        let mut rng = MockRng::new(vec![0, u64::MAX / 2, u64::MAX]);

        assert_eq!(rng.random::<f64>(), 0.0);
        assert!((rng.random::<f64>() - 0.5).abs() < 1e-9);
        assert!(rng.random::<f64>() < 1.0);
    }
}
