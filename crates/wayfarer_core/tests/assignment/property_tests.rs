use rand::{SeedableRng, rngs::SmallRng};
use wayfarer_core::{
    candidates::candidate_pool::CandidatePools,
    distance::distance_distribution::DistanceDistributions,
    driver::{
        driver_params::{DriverParams, Threads},
        parallel_driver::ParallelDriver,
    },
    problem::{
        assignment_problem::AssignmentProblem,
        location::Location,
        meters::Meters,
        mode::Mode,
        problem_extractor::ProblemExtractor,
        purpose::Purpose,
        trip::{PersonId, PrimaryLocations},
    },
    solver::{
        assignment_solver::AssignmentSolver,
        solver_params::{AssignmentParams, ModeThresholds},
    },
};

use crate::test_utils::{self, CountingRng, Leg, Population};

fn extract_problems(population: &Population) -> Vec<AssignmentProblem> {
    ProblemExtractor::new(&population.trips, &population.primary_locations)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_solution_shape_matches_problem() {
    let population = test_utils::create_population(40, 1);
    let params = AssignmentParams::default();
    let solver = AssignmentSolver::new(&population.distributions, &population.pools, &params);
    let mut rng = SmallRng::seed_from_u64(2);

    for problem in extract_problems(&population) {
        let result = solver.solve(&problem, &mut rng);

        assert_eq!(result.solution.size(), problem.size());
        assert_eq!(result.solution.person_id, problem.person_id());
        assert_eq!(result.solution.trip_index, problem.trip_index());
        assert!(result.iterations >= 1 && result.iterations <= params.maximum_iterations);

        for (stop, &purpose) in result.solution.stops.iter().zip(problem.purposes()) {
            assert_eq!(stop.purpose, purpose);
            let pool = population.pools.pool(purpose).unwrap();
            let nearest = pool.nearest(&stop.location).unwrap();
            assert_eq!(stop.destination_id, Some(nearest.destination_id));
        }
    }
}

#[test]
fn test_raising_thresholds_never_invalidates() {
    let population = test_utils::create_population(40, 3);
    let strict = AssignmentParams {
        thresholds: ModeThresholds::uniform(Meters::new(50.0)),
        ..AssignmentParams::default()
    };
    let relaxed = AssignmentParams {
        thresholds: ModeThresholds::uniform(Meters::new(500.0)),
        ..AssignmentParams::default()
    };
    let strict_solver = AssignmentSolver::new(&population.distributions, &population.pools, &strict);
    let relaxed_solver =
        AssignmentSolver::new(&population.distributions, &population.pools, &relaxed);

    for (index, problem) in extract_problems(&population).iter().enumerate() {
        let seed = 100 + index as u64;
        let strict_result = strict_solver.solve(problem, &mut SmallRng::seed_from_u64(seed));
        let relaxed_result = relaxed_solver.solve(problem, &mut SmallRng::seed_from_u64(seed));

        if strict_result.solution.valid {
            assert!(relaxed_result.solution.valid);
        }
        assert!(relaxed_result.iterations <= strict_result.iterations);
    }
}

#[test]
fn test_unsatisfiable_distances_stop_at_iteration_bound() {
    // Every sampled distance is zero but the only candidate is far away.
    let distributions = DistanceDistributions::new(vec![test_utils::create_distribution(
        Mode::Bike,
        vec![(f64::INFINITY, vec![0.0])],
    )]);
    let pools = CandidatePools::new(vec![
        test_utils::create_pool(Purpose::Leisure, &[(50_000.0, 0.0)]),
    ]);

    let trips = test_utils::create_chain(
        1,
        Purpose::Home,
        vec![
            Leg::new(Purpose::Leisure, Mode::Bike, 10),
            Leg::new(Purpose::Home, Mode::Bike, 10),
        ],
    );
    let locations = test_utils::index_locations(vec![
        PrimaryLocations::new(PersonId::new(1)).with_home(Location::from_cartesian(0.0, 0.0)),
    ]);
    let problems = ProblemExtractor::new(&trips, &locations)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let draws = |maximum_iterations: usize| {
        let params = AssignmentParams {
            maximum_iterations,
            thresholds: ModeThresholds::uniform(Meters::new(10.0)),
            ..AssignmentParams::default()
        };
        let solver = AssignmentSolver::new(&distributions, &pools, &params);
        let mut rng = CountingRng::new(SmallRng::seed_from_u64(0));
        let result = solver.solve(&problems[0], &mut rng);

        assert!(!result.solution.valid);
        assert_eq!(result.solution.size(), 1);
        rng.draws()
    };

    // Each attempt takes the same draws, so the run stops after nine of them.
    let one = draws(1);
    let nine = draws(9);

    assert!(one > 0);
    assert_eq!(nine, 9 * one);
}

#[test]
fn test_walking_population_is_fully_assigned() {
    let population = test_utils::create_walking_population(40, 11);
    let params = AssignmentParams::default();
    let output = ParallelDriver::new(
        &population.distributions,
        &population.pools,
        &params,
        DriverParams {
            workers: Threads::Multi(4),
            seed: 3,
        },
    )
    .run(&population.trips, &population.primary_locations)
    .unwrap();

    assert_eq!(output.persons, 40);
    assert_eq!(output.persons_with_secondary, 40);
    assert!(output.failures.is_empty());
    // Chains through work split into two problems.
    assert_eq!(output.convergence.len(), 50);
    assert!(output.convergence.iter().all(|record| record.valid));
    assert_eq!(output.success_rate(), 1.0);

    let sizes = output.convergence.iter().map(|record| record.size).sum::<usize>();
    assert_eq!(output.locations.len(), sizes);
    assert!(output.locations.iter().all(|row| row.destination_id.is_some()));
}

#[test]
fn test_driver_is_reproducible_for_a_seed_and_worker_count() {
    let population = test_utils::create_population(60, 9);
    let params = AssignmentParams::default();
    let run = |seed: u64| {
        ParallelDriver::new(
            &population.distributions,
            &population.pools,
            &params,
            DriverParams {
                workers: Threads::Multi(3),
                seed,
            },
        )
        .run(&population.trips, &population.primary_locations)
        .unwrap()
    };

    let first = run(42);
    let second = run(42);

    assert_eq!(first.locations, second.locations);
    assert_eq!(first.convergence, second.convergence);
    assert_eq!(first.persons, 60);
    assert!(first.failures.is_empty());

    let sizes = first.convergence.iter().map(|record| record.size).sum::<usize>();
    assert_eq!(first.locations.len(), sizes);
    assert!(
        first
            .locations
            .windows(2)
            .all(|pair| pair[0].sort_key() < pair[1].sort_key())
    );
}

#[test]
fn test_progress_is_reported_per_person() {
    let population = test_utils::create_population(25, 4);
    let params = AssignmentParams::default();
    let driver = ParallelDriver::new(
        &population.distributions,
        &population.pools,
        &params,
        DriverParams {
            workers: Threads::Multi(4),
            seed: 1,
        },
    );
    let finished = std::sync::atomic::AtomicUsize::new(0);

    driver
        .run_with_progress(&population.trips, &population.primary_locations, |count| {
            finished.fetch_add(count, std::sync::atomic::Ordering::Relaxed);
        })
        .unwrap();

    assert_eq!(finished.into_inner(), 25);
}
