//! Province and power identities plus their static metadata.
//!
//! Provinces and powers are plain indices into a `MapTopology`, so any map
//! supplied through `MapBuilder` can be adjudicated. The metadata records
//! (`ProvinceInfo`, `PowerInfo`) are owned by the topology.

use serde::{Deserialize, Serialize};

/// Index of a province within its map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProvinceId(pub u16);

impl ProvinceId {
    /// Returns the index for use with per-province vectors.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Coast specifier for provinces with more than one fleet coast.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Coast {
    #[default]
    None,
    North,
    South,
    East,
    West,
}

/// All real coasts; a province may use at most these four.
pub const ALL_COASTS: [Coast; 4] = [Coast::North, Coast::South, Coast::East, Coast::West];

impl Coast {
    /// Returns the 2-letter abbreviation (empty string for None).
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::None => "",
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
            Coast::West => "wc",
        }
    }

    /// Parses a coast from its 2-letter abbreviation.
    pub fn from_abbr(s: &str) -> Option<Coast> {
        match s {
            "" => Some(Coast::None),
            "nc" => Some(Coast::North),
            "sc" => Some(Coast::South),
            "ec" => Some(Coast::East),
            "wc" => Some(Coast::West),
            _ => Option::None,
        }
    }
}

/// Classifies a province by terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Land,
    Sea,
    Coastal,
}

/// One player of the game, as an index into the map's power table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Power(pub u8);

impl Power {
    /// Returns the index for use with per-power vectors.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Display metadata for a power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerInfo {
    /// Lowercase name used in notation, e.g. `france`.
    pub name: String,
    /// Display name, e.g. `France`.
    pub display_name: String,
}

/// Static metadata for a province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceInfo {
    pub abbr: String,
    pub name: String,
    pub terrain: Terrain,
    pub supply_center: bool,
    /// Power that may build here, if this is a home supply center.
    pub home_power: Option<Power>,
    /// Named fleet coasts; empty for provinces with a single coastline.
    pub coasts: Vec<Coast>,
    /// Fleets here may carry convoyed armies. True for every sea.
    pub convoy_capable: bool,
}

impl ProvinceInfo {
    /// Creates metadata for a non-supply-center province of the given terrain.
    pub fn new(abbr: &str, name: &str, terrain: Terrain) -> Self {
        ProvinceInfo {
            abbr: abbr.to_string(),
            name: name.to_string(),
            terrain,
            supply_center: false,
            home_power: None,
            coasts: Vec::new(),
            convoy_capable: terrain == Terrain::Sea,
        }
    }

    /// Marks the province as a supply center, optionally a home center.
    pub fn supply_center(mut self, home_power: Option<Power>) -> Self {
        self.supply_center = true;
        self.home_power = home_power;
        self
    }

    /// Sets the named coasts of a split-coast province.
    pub fn with_coasts(mut self, coasts: &[Coast]) -> Self {
        self.coasts = coasts.to_vec();
        self
    }

    /// Allows fleets in this (coastal) province to convoy.
    pub fn convoy_capable(mut self) -> Self {
        self.convoy_capable = true;
        self
    }

    /// Returns true if this province has split coasts.
    pub fn has_coasts(&self) -> bool {
        !self.coasts.is_empty()
    }

    /// Returns true if armies may stand here.
    pub fn allows_army(&self) -> bool {
        self.terrain != Terrain::Sea
    }

    /// Returns true if fleets may stand here.
    pub fn allows_fleet(&self) -> bool {
        self.terrain != Terrain::Land
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coast_abbr_roundtrip() {
        for c in [Coast::None, Coast::North, Coast::South, Coast::East, Coast::West] {
            assert_eq!(Coast::from_abbr(c.abbr()), Some(c));
        }
        assert_eq!(Coast::from_abbr("xc"), None);
    }

    #[test]
    fn sea_provinces_convoy_by_default() {
        let sea = ProvinceInfo::new("nth", "North Sea", Terrain::Sea);
        assert!(sea.convoy_capable);
        assert!(sea.allows_fleet());
        assert!(!sea.allows_army());

        let coast = ProvinceInfo::new("lon", "London", Terrain::Coastal);
        assert!(!coast.convoy_capable);
        assert!(coast.convoy_capable().convoy_capable);
    }

    #[test]
    fn supply_center_builder() {
        let info = ProvinceInfo::new("par", "Paris", Terrain::Land).supply_center(Some(Power(2)));
        assert!(info.supply_center);
        assert_eq!(info.home_power, Some(Power(2)));
        assert!(!info.allows_fleet());
        assert!(!info.has_coasts());
    }
}
