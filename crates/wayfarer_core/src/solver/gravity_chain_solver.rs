use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

use crate::problem::{
    assignment_problem::{AssignmentProblem, ProblemKind},
    location::Location,
    meters::Meters,
};

use super::solver_params::RelaxationParams;

const MINIMUM_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationResult {
    /// Tentative location of every stop.
    pub locations: Vec<Location>,
    /// Leg lengths realized by `locations`.
    pub distances: Vec<Meters>,
    pub converged: bool,
    pub iterations: usize,
}

/// Places the stops of a problem in the plane so that leg lengths match the
/// sampled distances.
///
/// Tails are propagated from their anchor along random bearings. Chains with a
/// single stop are solved as a triangle. Longer chains start on the line
/// between both anchors and are relaxed like a chain of springs.
pub struct GravityChainSolver {
    lateral_deviation: Option<Normal<f64>>,
    alpha: f64,
    eps: Meters,
    maximum_iterations: usize,
}

impl GravityChainSolver {
    pub fn new(params: &RelaxationParams) -> Self {
        let lateral_deviation = Normal::new(0.0, params.lateral_deviation).ok();
        if lateral_deviation.is_none() {
            warn!(
                "Invalid lateral deviation {}, stops start on the anchor line",
                params.lateral_deviation
            );
        }

        Self {
            lateral_deviation,
            alpha: params.alpha,
            eps: Meters::new(params.eps),
            maximum_iterations: params.maximum_iterations.max(1),
        }
    }

    pub fn solve<R>(
        &self,
        problem: &AssignmentProblem,
        distances: &[Meters],
        rng: &mut R,
    ) -> RelaxationResult
    where
        R: Rng,
    {
        match (
            problem.kind(),
            problem.origin_location(),
            problem.destination_location(),
        ) {
            (ProblemKind::Chain, Some(origin), Some(destination)) if problem.size() == 1 => {
                self.solve_triangle(problem, origin, destination, distances, rng)
            }
            (ProblemKind::Chain, Some(origin), Some(destination)) => {
                self.solve_chain(problem, origin, destination, distances, rng)
            }
            (_, Some(origin), None) => {
                let locations = propagate(origin, distances.iter().copied(), rng);
                self.result(problem, distances, locations, 0)
            }
            (_, None, Some(destination)) => {
                let mut locations = propagate(destination, distances.iter().rev().copied(), rng);
                locations.reverse();
                self.result(problem, distances, locations, 0)
            }
            _ => unreachable!("Assignment problems always have an anchor"),
        }
    }

    fn result(
        &self,
        problem: &AssignmentProblem,
        targets: &[Meters],
        locations: Vec<Location>,
        iterations: usize,
    ) -> RelaxationResult {
        let distances = problem.leg_distances(&locations);
        let converged = max_error(&distances, targets) < self.eps;

        RelaxationResult {
            locations,
            distances,
            converged,
            iterations,
        }
    }

    fn solve_triangle<R>(
        &self,
        problem: &AssignmentProblem,
        origin: Location,
        destination: Location,
        distances: &[Meters],
        rng: &mut R,
    ) -> RelaxationResult
    where
        R: Rng,
    {
        let (to_stop, from_stop) = (distances[0].value(), distances[1].value());
        let direct = origin.euclidean_distance(&destination).value();

        let stop = if direct < MINIMUM_LENGTH {
            origin.offset(distances[0], rng.random_range(0.0..TAU))
        } else {
            let (ux, uy) = (
                (destination.x() - origin.x()) / direct,
                (destination.y() - origin.y()) / direct,
            );
            let along = |t: f64| Location::from_cartesian(origin.x() + ux * t, origin.y() + uy * t);

            if direct >= to_stop + from_stop {
                // Too far apart, split the anchor line proportionally
                let share = if to_stop + from_stop > 0.0 {
                    to_stop / (to_stop + from_stop)
                } else {
                    0.5
                };
                along(direct * share)
            } else if direct <= (to_stop - from_stop).abs() {
                // One circle contains the other
                if to_stop >= from_stop {
                    along(to_stop)
                } else {
                    along(-to_stop)
                }
            } else {
                let a = (to_stop * to_stop - from_stop * from_stop + direct * direct) / (2.0 * direct);
                let h = (to_stop * to_stop - a * a).max(0.0).sqrt();
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let base = along(a);
                Location::from_cartesian(base.x() - side * h * uy, base.y() + side * h * ux)
            }
        };

        self.result(problem, distances, vec![stop], 0)
    }

    fn solve_chain<R>(
        &self,
        problem: &AssignmentProblem,
        origin: Location,
        destination: Location,
        distances: &[Meters],
        rng: &mut R,
    ) -> RelaxationResult
    where
        R: Rng,
    {
        let mut points = self.initial_chain(problem.size(), origin, destination, distances, rng);
        let last = points.len() - 1;

        let mut iterations = 0;
        while iterations < self.maximum_iterations {
            let legs = points
                .windows(2)
                .zip(distances)
                .map(|(pair, &target)| Spring::new(&pair[0], &pair[1], target))
                .collect::<Vec<_>>();

            if legs.iter().all(|leg| leg.error.abs() < self.eps.value()) {
                break;
            }

            iterations += 1;

            // Anchors stay fixed, every stop is pulled by both of its legs.
            for index in 1..last {
                let (outgoing, incoming) = (&legs[index], &legs[index - 1]);
                let fx = outgoing.error * outgoing.dx - incoming.error * incoming.dx;
                let fy = outgoing.error * outgoing.dy - incoming.error * incoming.dy;

                points[index] = Location::from_cartesian(
                    points[index].x() + self.alpha * fx,
                    points[index].y() + self.alpha * fy,
                );
            }
        }

        let locations = points[1..last].to_vec();
        self.result(problem, distances, locations, iterations)
    }

    /// Anchors and stops before relaxation. Stops are spread along the anchor
    /// line by cumulative sampled distance and offset perpendicularly.
    fn initial_chain<R>(
        &self,
        size: usize,
        origin: Location,
        destination: Location,
        distances: &[Meters],
        rng: &mut R,
    ) -> Vec<Location>
    where
        R: Rng,
    {
        let total = distances.iter().sum::<Meters>().value();
        let shares = distances
            .iter()
            .scan(0.0, |cumulative, distance| {
                *cumulative += distance.value();
                Some(*cumulative)
            })
            .take(size)
            .enumerate()
            .map(|(index, cumulative)| {
                if total > 0.0 {
                    cumulative / total
                } else {
                    (index + 1) as f64 / (size + 1) as f64
                }
            })
            .collect::<Vec<_>>();

        let direct = origin.euclidean_distance(&destination).value();
        let mut points = Vec::with_capacity(size + 2);
        points.push(origin);

        if direct < MINIMUM_LENGTH {
            // Round trip: start from a circle through the anchor whose
            // perimeter is the total sampled distance.
            let radius = total / TAU;
            let heading = rng.random_range(0.0..TAU);
            let center = origin.offset(Meters::new(radius), heading);

            for share in shares {
                let angle = heading + std::f64::consts::PI + share * TAU;
                points.push(center.offset(Meters::new(radius), angle));
            }
        } else {
            let (ux, uy) = (
                (destination.x() - origin.x()) / direct,
                (destination.y() - origin.y()) / direct,
            );

            for share in shares {
                let lateral = self
                    .lateral_deviation
                    .map_or(0.0, |normal| normal.sample(rng));

                points.push(Location::from_cartesian(
                    origin.x() + ux * direct * share - uy * lateral,
                    origin.y() + uy * direct * share + ux * lateral,
                ));
            }
        }

        points.push(destination);
        points
    }
}

/// Length error and unit direction of a leg.
struct Spring {
    error: f64,
    dx: f64,
    dy: f64,
}

impl Spring {
    fn new(from: &Location, to: &Location, target: Meters) -> Self {
        let length = from.euclidean_distance(to).value();
        let (dx, dy) = if length > MINIMUM_LENGTH {
            ((to.x() - from.x()) / length, (to.y() - from.y()) / length)
        } else {
            (0.0, 0.0)
        };

        Spring {
            error: length - target.value(),
            dx,
            dy,
        }
    }
}

fn propagate<R>(anchor: Location, distances: impl Iterator<Item = Meters>, rng: &mut R) -> Vec<Location>
where
    R: Rng,
{
    let mut current = anchor;
    distances
        .map(|distance| {
            current = current.offset(distance, rng.random_range(0.0..TAU));
            current
        })
        .collect()
}

fn max_error(realized: &[Meters], targets: &[Meters]) -> Meters {
    realized
        .iter()
        .zip(targets)
        .map(|(&realized, &target)| realized.abs_diff(target))
        .max()
        .unwrap_or(Meters::ZERO)
}
