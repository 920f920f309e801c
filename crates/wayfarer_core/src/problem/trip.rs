use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::define_id_newtype;

use super::{location::Location, mode::Mode, purpose::Purpose};

define_id_newtype!(PersonId);

/// One leg of a person's daily chain, between two consecutive activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Trip {
    pub person_id: PersonId,
    pub trip_id: usize,
    pub preceding_purpose: Purpose,
    pub following_purpose: Purpose,
    pub mode: Mode,
    #[schemars(with = "String")]
    pub travel_time: SignedDuration,
}

impl Trip {
    pub fn sort_key(&self) -> (PersonId, usize) {
        (self.person_id, self.trip_id)
    }
}

/// Locations of the anchor activities of a person, as assigned upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PrimaryLocations {
    pub person_id: PersonId,
    #[serde(default)]
    pub home: Option<Location>,
    #[serde(default)]
    pub work: Option<Location>,
    #[serde(default)]
    pub education: Option<Location>,
}

impl PrimaryLocations {
    pub fn new(person_id: PersonId) -> Self {
        Self {
            person_id,
            home: None,
            work: None,
            education: None,
        }
    }

    pub fn with_home(mut self, home: Location) -> Self {
        self.home = Some(home);
        self
    }

    pub fn with_work(mut self, work: Location) -> Self {
        self.work = Some(work);
        self
    }

    /// Location of a fixed purpose, `None` for secondary purposes or missing anchors.
    pub fn anchor(&self, purpose: Purpose) -> Option<Location> {
        match purpose {
            Purpose::Home => self.home,
            Purpose::Work => self.work,
            Purpose::Education => self.education,
            Purpose::Shop | Purpose::Leisure | Purpose::Other => None,
        }
    }
}
