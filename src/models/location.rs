use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a box physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Garage,
    Attic,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Garage, Location::Attic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Garage => "Garage",
            Location::Attic => "Attic",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown location: {0}")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Garage" => Ok(Location::Garage),
            "Attic" => Ok(Location::Attic),
            other => Err(UnknownLocation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Location {
    type Error = UnknownLocation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
