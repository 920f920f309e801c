use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Car,
    Ride,
    Pt,
    Walk,
    Bike,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Car, Mode::Ride, Mode::Pt, Mode::Walk, Mode::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Car => "car",
            Mode::Ride => "ride",
            Mode::Pt => "pt",
            Mode::Walk => "walk",
            Mode::Bike => "bike",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
