use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::{meters::Meters, mode::Mode};

/// Largest accepted gap, per leg, between the distance of the relaxed chain
/// and the distance after snapping to facilities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ModeThresholds {
    pub car: Meters,
    pub ride: Meters,
    pub pt: Meters,
    pub walk: Meters,
    pub bike: Meters,
}

impl ModeThresholds {
    pub fn uniform(threshold: Meters) -> Self {
        Self {
            car: threshold,
            ride: threshold,
            pt: threshold,
            walk: threshold,
            bike: threshold,
        }
    }

    pub fn threshold(&self, mode: Mode) -> Meters {
        match mode {
            Mode::Car => self.car,
            Mode::Ride => self.ride,
            Mode::Pt => self.pt,
            Mode::Walk => self.walk,
            Mode::Bike => self.bike,
        }
    }
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            car: Meters::new(200.0),
            ride: Meters::new(200.0),
            pt: Meters::new(200.0),
            walk: Meters::new(100.0),
            bike: Meters::new(100.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxationParams {
    /// Standard deviation (meters) of the perpendicular offset of initial stops.
    pub lateral_deviation: f64,
    /// Damping of the spring updates.
    pub alpha: f64,
    /// Largest leg length error (meters) of a converged chain.
    pub eps: f64,
    pub maximum_iterations: usize,
}

impl Default for RelaxationParams {
    fn default() -> Self {
        Self {
            lateral_deviation: 20.0,
            alpha: 0.3,
            eps: 20.0,
            maximum_iterations: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AssignmentParams {
    /// Sample, relax and discretize cycles per problem.
    pub maximum_iterations: usize,
    /// Resampling attempts to find distances that can close a chain.
    pub sampler_maximum_iterations: usize,
    /// Interpolate linearly between observed distances when sampling.
    pub interpolate: bool,
    pub thresholds: ModeThresholds,
    pub relaxation: RelaxationParams,
}

impl Default for AssignmentParams {
    fn default() -> Self {
        Self {
            maximum_iterations: 20,
            sampler_maximum_iterations: 100,
            interpolate: false,
            thresholds: ModeThresholds::default(),
            relaxation: RelaxationParams::default(),
        }
    }
}
