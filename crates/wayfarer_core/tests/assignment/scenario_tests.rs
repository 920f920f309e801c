use rand::{SeedableRng, rngs::SmallRng};
use wayfarer_core::{
    candidates::candidate_pool::{CandidatePool, CandidatePools, DestinationId},
    distance::distance_distribution::DistanceDistributions,
    driver::{
        driver_params::{DriverParams, Threads},
        parallel_driver::ParallelDriver,
    },
    problem::{
        location::Location,
        meters::Meters,
        mode::Mode,
        problem_extractor::ProblemExtractor,
        purpose::Purpose,
        trip::{PersonId, PrimaryLocations},
    },
    solver::{assignment_solver::AssignmentSolver, solver_params::AssignmentParams},
};

use crate::test_utils::{self, Leg};

#[test]
fn test_closed_chain_between_home_and_work() {
    // Walking 5 minutes always covers 300m, walking 15 minutes 800m.
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Walk,
        vec![(600.0, vec![300.0]), (f64::INFINITY, vec![800.0])],
    )]);

    //
    //  Y-axis
    //  ^
    //  |            (225, 200) [0]
    //  |
    //  | (0, 0) H ----------------------------- W (1000, 0)
    //  |
    //  |            (225, -200) [1]          (4000, 3000) [2]
    //  +------------------------------------------------------> X-axis
    let pools = CandidatePools::new(vec![test_utils::create_pool(
        Purpose::Leisure,
        &[(225.0, 200.0), (225.0, -200.0), (4000.0, 3000.0)],
    )]);

    let trips = test_utils::create_chain(
        1,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Leisure, Mode::Walk, 5),
            Leg::new(Purpose::Work, Mode::Walk, 15),
        ],
    );
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(1))
            .with_home(Location::from_cartesian(0.0, 0.0))
            .with_work(Location::from_cartesian(1000.0, 0.0)),
    ]);

    let params = AssignmentParams::default();
    let driver = ParallelDriver::new(&distributions, &pools, &params, DriverParams::default());
    let output = driver.run(&trips, &locations).unwrap();

    assert_eq!(output.convergence.len(), 1);
    assert!(output.convergence[0].valid);
    assert_eq!(output.locations.len(), 1);

    let row = &output.locations[0];
    assert_eq!(row.trip_index, 0);
    assert_ne!(row.destination_id, Some(DestinationId::new(2)));

    let home = Location::from_cartesian(0.0, 0.0);
    let work = Location::from_cartesian(1000.0, 0.0);
    assert!(row.location.euclidean_distance(&home).abs_diff(Meters::new(300.0)) < Meters::new(5.0));
    assert!(row.location.euclidean_distance(&work).abs_diff(Meters::new(800.0)) < Meters::new(5.0));
}

#[test]
fn test_closed_chain_without_close_candidate_is_invalid() {
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Walk,
        vec![(600.0, vec![300.0]), (f64::INFINITY, vec![800.0])],
    )]);
    let pools = CandidatePools::new(vec![test_utils::create_pool(
        Purpose::Leisure,
        &[(4000.0, 3000.0)],
    )]);
    let trips = test_utils::create_chain(
        1,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Leisure, Mode::Walk, 5),
            Leg::new(Purpose::Work, Mode::Walk, 15),
        ],
    );
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(1))
            .with_home(Location::from_cartesian(0.0, 0.0))
            .with_work(Location::from_cartesian(1000.0, 0.0)),
    ]);

    let params = AssignmentParams::default();
    let driver = ParallelDriver::new(&distributions, &pools, &params, DriverParams::default());
    let output = driver.run(&trips, &locations).unwrap();

    assert!(!output.convergence[0].valid);
    assert_eq!(output.locations[0].destination_id, Some(DestinationId::new(0)));
}

#[test]
fn test_tail_without_end_anchor() {
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Car,
        vec![(f64::INFINITY, vec![2000.0])],
    )]);
    // Every shop is exactly 2km away from home.
    let pools = CandidatePools::new(vec![test_utils::create_pool(
        Purpose::Shop,
        &test_utils::ring((0.0, 0.0), 2000.0, 36),
    )]);

    let trips = test_utils::create_chain(
        7,
        Purpose::Home,
        vec![Leg::new(Purpose::Shop, Mode::Car, 10)],
    );
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(7)).with_home(Location::from_cartesian(0.0, 0.0)),
    ]);

    let problems = ProblemExtractor::new(&trips, &locations)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].destination().is_none());

    let params = AssignmentParams::default();
    let solver = AssignmentSolver::new(&distributions, &pools, &params);
    let mut rng = SmallRng::seed_from_u64(11);
    let result = solver.solve(&problems[0], &mut rng);

    assert!(result.solution.valid);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.solution.stops.len(), 1);
    assert_eq!(result.solution.stops[0].purpose, Purpose::Shop);
}

#[test]
fn test_empty_pool_only_fails_its_purpose() {
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Walk,
        vec![(f64::INFINITY, vec![200.0])],
    )]);
    let pools = CandidatePools::new(vec![
        test_utils::create_pool(Purpose::Shop, &test_utils::ring((0.0, 0.0), 200.0, 72)),
        CandidatePool::empty(Purpose::Other),
    ]);

    let mut trips = test_utils::create_chain(
        1,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Other, Mode::Walk, 4),
            Leg::new(Purpose::Home, Mode::Walk, 4),
        ],
    );
    trips.extend(test_utils::create_chain(
        2,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Shop, Mode::Walk, 4),
            Leg::new(Purpose::Home, Mode::Walk, 4),
        ],
    ));
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(1)).with_home(Location::from_cartesian(0.0, 0.0)),
        PrimaryLocations::new(PersonId::new(2)).with_home(Location::from_cartesian(0.0, 0.0)),
    ]);

    let params = AssignmentParams::default();
    let driver = ParallelDriver::new(
        &distributions,
        &pools,
        &params,
        DriverParams {
            workers: Threads::Multi(2),
            seed: 5,
        },
    );
    let output = driver.run(&trips, &locations).unwrap();

    assert_eq!(output.convergence.len(), 2);
    assert!(!output.convergence[0].valid);
    assert!(output.convergence[1].valid);
    assert_eq!(output.success_rate(), 0.5);

    assert_eq!(output.locations[0].person_id, PersonId::new(1));
    assert_eq!(output.locations[0].destination_id, None);
    assert_eq!(output.locations[1].person_id, PersonId::new(2));
    assert!(output.locations[1].destination_id.is_some());
}

#[test]
fn test_round_trip_with_legs_in_different_buckets() {
    // The way out falls in the short bucket, the way back in the long one.
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Walk,
        vec![
            (600.0, vec![200.0, 250.0, 300.0, 350.0, 400.0]),
            (f64::INFINITY, vec![600.0, 700.0, 800.0, 900.0]),
        ],
    )]);
    let pools = CandidatePools::new(vec![test_utils::create_pool(
        Purpose::Shop,
        &test_utils::grid(10.0, 1000.0),
    )]);

    let trips = test_utils::create_chain(
        1,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Shop, Mode::Walk, 5),
            Leg::new(Purpose::Home, Mode::Walk, 12),
        ],
    );
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(1)).with_home(Location::from_cartesian(0.0, 0.0)),
    ]);

    for interpolate in [false, true] {
        let params = AssignmentParams {
            interpolate,
            ..AssignmentParams::default()
        };

        for seed in 0..20 {
            let driver = ParallelDriver::new(
                &distributions,
                &pools,
                &params,
                DriverParams {
                    seed,
                    ..DriverParams::default()
                },
            );
            let output = driver.run(&trips, &locations).unwrap();

            assert_eq!(output.convergence.len(), 1);
            assert!(output.convergence[0].valid, "seed {seed}");
            assert_eq!(output.success_rate(), 1.0);
            assert_eq!(output.locations.len(), 1);
            assert_eq!(output.locations[0].trip_index, 0);
            assert!(output.locations[0].destination_id.is_some());
        }
    }
}
