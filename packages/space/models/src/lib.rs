#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical public space record and shared taxonomies.
//!
//! Every open-data feed (parks, POPS, waterfront access areas, plazas,
//! schoolyards) is normalized into [`CanonicalSpace`] records. The record
//! keeps the canonical fields typed and carries any other properties in
//! [`CanonicalSpace::extra`] so nothing is lost between pipeline stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Origin dataset category of a public space.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpaceType {
    /// NYC Parks property
    Park,
    /// Privately owned public space
    Pops,
    /// Hand-curated space with no upstream feed
    Misc,
    /// Schoolyards to Playgrounds program
    Stp,
    /// DOT pedestrian plaza
    Plaza,
    /// Waterfront public access area
    Wpaa,
}

impl SpaceType {
    /// Every space type, in declaration order.
    pub const ALL: &[Self] = &[
        Self::Park,
        Self::Pops,
        Self::Misc,
        Self::Stp,
        Self::Plaza,
        Self::Wpaa,
    ];
}

/// One of the five NYC boroughs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Borough {
    /// Manhattan (New York County)
    Manhattan,
    /// Brooklyn (Kings County)
    Brooklyn,
    /// Queens (Queens County)
    Queens,
    /// The Bronx (Bronx County)
    Bronx,
    /// Staten Island (Richmond County)
    #[serde(rename = "Staten Island")]
    #[strum(serialize = "Staten Island")]
    StatenIsland,
}

impl Borough {
    /// All boroughs in the order free-text mentions are matched.
    pub const ALL: &[Self] = &[
        Self::Manhattan,
        Self::Brooklyn,
        Self::Queens,
        Self::Bronx,
        Self::StatenIsland,
    ];

    /// Returns `true` if `name` refers to this borough (case-insensitive).
    #[must_use]
    pub fn matches_name(self, name: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(name.trim())
    }
}

/// A public space in the canonical point-feature schema.
///
/// `space_id` and `description` are absent on stubs fresh out of the
/// normalizer; validation requires both before a space is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSpace {
    /// Origin dataset category.
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    /// Human-readable name.
    pub name: Option<String>,
    /// Street address or cross streets.
    pub location: Option<String>,
    /// Link to the authoritative page for this space.
    pub url: Option<String>,
    /// URL-safe slug, unique across all spaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// One-sentence description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Longitude (WGS84).
    #[serde(skip)]
    pub longitude: f64,
    /// Latitude (WGS84).
    #[serde(skip)]
    pub latitude: f64,
    /// Any additional properties, in their original order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalSpace {
    /// Creates a stub with only the type and location set.
    #[must_use]
    pub fn new(space_type: SpaceType, longitude: f64, latitude: f64) -> Self {
        Self {
            space_type,
            name: None,
            location: None,
            url: None,
            space_id: None,
            description: None,
            longitude,
            latitude,
            extra: Map::new(),
        }
    }

    /// Iterates every string-valued property in serialized order: the
    /// canonical fields first, then string values from [`Self::extra`].
    ///
    /// This is the order records are written in, not necessarily the
    /// property order of a hand-edited input line.
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.space_type.as_ref()),
            self.name.as_deref(),
            self.location.as_deref(),
            self.url.as_deref(),
            self.space_id.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(self.extra.values().filter_map(Value::as_str))
    }

    /// Label used in log messages: the `space_id` when present, otherwise
    /// the name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.space_id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn space_type_round_trips_lowercase() {
        for space_type in SpaceType::ALL {
            let parsed = SpaceType::from_str(space_type.as_ref()).unwrap();
            assert_eq!(parsed, *space_type);
        }
        assert_eq!(SpaceType::Wpaa.to_string(), "wpaa");
        assert!(SpaceType::from_str("garden").is_err());
    }

    #[test]
    fn borough_parses_case_insensitively() {
        assert_eq!(
            Borough::from_str("staten island").unwrap(),
            Borough::StatenIsland
        );
        assert_eq!(Borough::from_str("BROOKLYN").unwrap(), Borough::Brooklyn);
        assert_eq!(Borough::StatenIsland.to_string(), "Staten Island");
        assert!(Borough::Queens.matches_name(" queens "));
    }

    #[test]
    fn serializes_properties_without_geometry() {
        let mut space = CanonicalSpace::new(SpaceType::Plaza, -73.98, 40.75);
        space.name = Some("Herald Square".to_string());
        space
            .extra
            .insert("subtype".to_string(), Value::String("triangle".to_string()));

        let value = serde_json::to_value(&space).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "plaza",
                "name": "Herald Square",
                "location": null,
                "url": null,
                "subtype": "triangle"
            })
        );
    }

    #[test]
    fn string_values_includes_extra_strings_only() {
        let mut space = CanonicalSpace::new(SpaceType::Park, 0.0, 0.0);
        space.location = Some("Brooklyn".to_string());
        space.extra.insert("acres".to_string(), serde_json::json!(3.2));
        space
            .extra
            .insert("borough".to_string(), Value::String("K".to_string()));

        let values: Vec<&str> = space.string_values().collect();
        assert_eq!(values, vec!["park", "Brooklyn", "K"]);
    }
}
