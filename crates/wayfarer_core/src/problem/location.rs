use std::borrow::Cow;

use geo::{Distance, Euclidean};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

use super::meters::Meters;

/// A point in a projected coordinate system whose unit is the meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        Self {
            point: geo::Point::new(x, y),
        }
    }

    /// Location at `distance` from `self` along `angle` (radians, counter-clockwise from the x axis).
    pub fn offset(&self, distance: Meters, angle: f64) -> Self {
        Self::from_cartesian(
            self.x() + distance.value() * angle.cos(),
            self.y() + distance.value() * angle.sin(),
        )
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn euclidean_distance(&self, to: &Location) -> Meters {
        Meters::new(Euclidean.distance(self.point, to.point))
    }

    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }
}

impl From<[f64; 2]> for Location {
    fn from(value: [f64; 2]) -> Self {
        Location::from_cartesian(value[0], value[1])
    }
}

impl From<Location> for [f64; 2] {
    fn from(location: Location) -> Self {
        [location.x(), location.y()]
    }
}

impl JsonSchema for Location {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Location")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <[f64; 2]>::json_schema(generator)
    }
}
