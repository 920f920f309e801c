use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Home,
    Work,
    Education,
    Shop,
    Leisure,
    Other,
}

impl Purpose {
    pub const SECONDARY: [Purpose; 3] = [Purpose::Shop, Purpose::Leisure, Purpose::Other];

    /// Fixed purposes are located upstream and act as anchors of a chain.
    pub fn is_fixed(&self) -> bool {
        match self {
            Purpose::Home | Purpose::Work | Purpose::Education => true,
            Purpose::Shop | Purpose::Leisure | Purpose::Other => false,
        }
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_fixed()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Home => "home",
            Purpose::Work => "work",
            Purpose::Education => "education",
            Purpose::Shop => "shop",
            Purpose::Leisure => "leisure",
            Purpose::Other => "other",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
