//! Domain primitives for the versioned catalog.
//!
//! A request is always addressed to one [`Strategy`] (which physical schema
//! family serves it) and one [`ApiVersion`] (which logical shape the client
//! speaks). Both are plain values chosen at startup or from the request path
//! and handed down explicitly; nothing below the API layer inspects globals.

pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schema evolution strategy backing a catalog store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One independent physical table per API version.
    Views,
    /// One growing table; new columns are added and dual-written.
    ExpandDeprecate,
    /// Stable base table plus per-version satellite tables keyed by id.
    Branches,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::Views, Self::ExpandDeprecate, Self::Branches];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::ExpandDeprecate => "expand_deprecate",
            Self::Branches => "branches",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "views" => Ok(Self::Views),
            "expand_deprecate" | "expand-deprecate" => Ok(Self::ExpandDeprecate),
            "branches" => Ok(Self::Branches),
            other => Err(UnknownVariant::new("strategy", other)),
        }
    }
}

/// Public API version. Each version is a frozen snapshot of the logical
/// movie shape; the feature predicates below are the only place that knows
/// which fields a version speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
    #[serde(rename = "v3")]
    V3,
    #[serde(rename = "v4")]
    V4,
    #[serde(rename = "v5")]
    V5,
}

impl ApiVersion {
    pub const ALL: [Self; 5] = [Self::V1, Self::V2, Self::V3, Self::V4, Self::V5];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
        }
    }

    /// Genres travel as a list instead of the single legacy `genre` value.
    #[must_use]
    pub const fn has_genre_list(self) -> bool {
        self.number() >= 3
    }

    /// `runtime` and `language` are part of the shape.
    #[must_use]
    pub const fn has_details(self) -> bool {
        self.number() >= 2
    }

    /// `director` is a client-writable scalar. From v5 on it is derived from crew.
    #[must_use]
    pub const fn has_director(self) -> bool {
        matches!(self, Self::V2 | Self::V3 | Self::V4)
    }

    /// Movies carry an `actors` list and `/actors` is served.
    #[must_use]
    pub const fn has_actors(self) -> bool {
        matches!(self, Self::V4)
    }

    /// Movies carry a `crew` list and `/people` is served.
    #[must_use]
    pub const fn has_people(self) -> bool {
        matches!(self, Self::V5)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

impl FromStr for ApiVersion {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            "v4" => Ok(Self::V4),
            "v5" => Ok(Self::V5),
            other => Err(UnknownVariant::new("api version", other)),
        }
    }
}

/// Role a person plays on a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrewType {
    Actor,
    Director,
    Producer,
}

impl CrewType {
    pub const NAMES: [&'static str; 3] = ["Actor", "Director", "Producer"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actor => "Actor",
            Self::Director => "Director",
            Self::Producer => "Producer",
        }
    }
}

impl fmt::Display for CrewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrewType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Actor" => Ok(Self::Actor),
            "Director" => Ok(Self::Director),
            "Producer" => Ok(Self::Producer),
            other => Err(UnknownVariant::new("crew type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trips_through_path_segment() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!(
            "expand-deprecate".parse::<Strategy>().unwrap(),
            Strategy::ExpandDeprecate
        );
        assert!("shadow".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_version_features() {
        assert!(!ApiVersion::V1.has_details());
        assert!(ApiVersion::V2.has_director());
        assert!(!ApiVersion::V2.has_genre_list());
        assert!(ApiVersion::V3.has_genre_list());
        assert!(ApiVersion::V4.has_actors());
        assert!(!ApiVersion::V5.has_director());
        assert!(ApiVersion::V5.has_people());
        assert_eq!(ApiVersion::V3.to_string(), "v3");
        assert!("v6".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_crew_type_is_case_sensitive() {
        assert_eq!("Director".parse::<CrewType>().unwrap(), CrewType::Director);
        assert!("director".parse::<CrewType>().is_err());
    }
}
