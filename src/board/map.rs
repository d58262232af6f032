//! Map topology: provinces, powers and the adjacency graph.
//!
//! Each adjacency records a directed edge: (from, from_coast) -> (to, to_coast)
//! with flags for army and fleet passability. `MapBuilder` stores every
//! border in both directions, so the graph is always symmetric.
//!
//! Split-coast provinces use coast-specific fleet edges and `Coast::None`
//! for army edges.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use super::order::Location;
use super::province::{Coast, Power, PowerInfo, ProvinceId, ProvinceInfo, Terrain, ALL_COASTS};
use super::unit::UnitType;

/// Errors raised while assembling a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("duplicate province '{0}'")]
    DuplicateProvince(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("province '{province}' has no coast '{coast}'")]
    UnknownCoast { province: String, coast: String },

    #[error("province '{0}' declares more than four coasts")]
    TooManyCoasts(String),

    #[error("fleet border at split-coast province '{0}' must name a coast")]
    MissingCoast(String),

    #[error("{unit:?} cannot cross between '{from}' and '{to}'")]
    TerrainMismatch { unit: UnitType, from: String, to: String },

    #[error("unknown power index {0}")]
    UnknownPower(u8),
}

/// Which unit types may cross a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passage {
    Army,
    Fleet,
    Both,
}

/// A single directed adjacency between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyEntry {
    pub from: Location,
    pub to: Location,
    pub army_ok: bool,
    pub fleet_ok: bool,
}

/// The static province/adjacency graph a game is played on.
#[derive(Debug, Clone)]
pub struct MapTopology {
    provinces: Vec<ProvinceInfo>,
    powers: Vec<PowerInfo>,
    edges: Vec<AdjacencyEntry>,
    /// Indices into `edges`, grouped by the province an edge leaves from.
    edges_from: Vec<Vec<usize>>,
    by_abbr: HashMap<String, ProvinceId>,
}

impl MapTopology {
    /// Returns the number of provinces.
    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    /// Iterates over every province id in index order.
    pub fn provinces(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        (0..self.provinces.len()).map(|i| ProvinceId(i as u16))
    }

    /// Returns the metadata for a province.
    pub fn info(&self, province: ProvinceId) -> &ProvinceInfo {
        &self.provinces[province.index()]
    }

    /// Looks up a province by its abbreviation.
    pub fn province(&self, abbr: &str) -> Option<ProvinceId> {
        self.by_abbr.get(abbr).copied()
    }

    /// Returns the abbreviation of a province.
    pub fn abbr(&self, province: ProvinceId) -> &str {
        &self.provinces[province.index()].abbr
    }

    /// Returns the number of powers.
    pub fn power_count(&self) -> usize {
        self.powers.len()
    }

    /// Iterates over every power in index order.
    pub fn powers(&self) -> impl Iterator<Item = Power> + '_ {
        (0..self.powers.len()).map(|i| Power(i as u8))
    }

    /// Returns the metadata for a power.
    pub fn power_info(&self, power: Power) -> &PowerInfo {
        &self.powers[power.index()]
    }

    /// Looks up a power by its lowercase name.
    pub fn power(&self, name: &str) -> Option<Power> {
        self.powers.iter().position(|p| p.name == name).map(|i| Power(i as u8))
    }

    /// Returns the number of supply centers on the map.
    pub fn supply_center_count(&self) -> usize {
        self.provinces.iter().filter(|p| p.supply_center).count()
    }

    /// Returns the home supply centers of a power in index order.
    pub fn home_centers(&self, power: Power) -> Vec<ProvinceId> {
        self.provinces()
            .filter(|&p| {
                let info = self.info(p);
                info.supply_center && info.home_power == Some(power)
            })
            .collect()
    }

    /// Returns true if a location names a real place for the given unit type.
    ///
    /// Fleets on split-coast provinces need a coast; armies never carry one.
    pub fn is_valid_location(&self, loc: Location, unit_type: UnitType) -> bool {
        let Some(info) = self.provinces.get(loc.province.index()) else {
            return false;
        };
        match unit_type {
            UnitType::Army => info.allows_army() && loc.coast == Coast::None,
            UnitType::Fleet => {
                if !info.allows_fleet() {
                    return false;
                }
                if info.has_coasts() {
                    info.coasts.contains(&loc.coast)
                } else {
                    loc.coast == Coast::None
                }
            }
        }
    }

    fn outgoing(&self, province: ProvinceId) -> impl Iterator<Item = &AdjacencyEntry> + '_ {
        self.edges_from[province.index()].iter().map(move |&i| &self.edges[i])
    }

    /// Returns true if a unit of the given type at `from` can move to `to`.
    ///
    /// Army checks ignore coasts. Fleet checks require the edge to leave from
    /// the fleet's own coast; a bare destination matches any of its coasts.
    pub fn is_adjacent(&self, from: Location, to: Location, unit_type: UnitType) -> bool {
        self.outgoing(from.province).any(|e| match unit_type {
            UnitType::Army => e.army_ok && e.to.province == to.province,
            UnitType::Fleet => e.fleet_ok && e.from.coast == from.coast && e.to.matches(to),
        })
    }

    /// Returns true if a unit at `from` could move to some part of `province`.
    pub fn can_reach(&self, from: Location, unit_type: UnitType, province: ProvinceId) -> bool {
        self.is_adjacent(from, Location::new(province), unit_type)
    }

    /// Returns every location a unit of the given type can move to.
    pub fn destinations(&self, from: Location, unit_type: UnitType) -> Vec<Location> {
        let mut out: Vec<Location> = self
            .outgoing(from.province)
            .filter_map(|e| match unit_type {
                UnitType::Army if e.army_ok => Some(Location::new(e.to.province)),
                UnitType::Fleet if e.fleet_ok && e.from.coast == from.coast => Some(e.to),
                _ => None,
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Returns the coasts of `to` that a fleet at `from` can reach.
    pub fn fleet_coasts_to(&self, from: Location, to: ProvinceId) -> Vec<Coast> {
        let mut coasts: Vec<Coast> = self
            .outgoing(from.province)
            .filter(|e| e.fleet_ok && e.from.coast == from.coast && e.to.province == to)
            .map(|e| e.to.coast)
            .collect();
        coasts.sort();
        coasts.dedup();
        coasts
    }

    /// Returns true if a fleet could sail between the two provinces on any coast.
    pub fn fleet_borders(&self, a: ProvinceId, b: ProvinceId) -> bool {
        self.outgoing(a).any(|e| e.fleet_ok && e.to.province == b)
    }

    /// Returns true if an army could be carried from `from` to `to` through
    /// convoy-capable provinces accepted by `carrier`.
    ///
    /// `carrier` decides which intermediate provinces hold a usable fleet.
    pub fn convoy_route_exists<F>(&self, from: ProvinceId, to: ProvinceId, carrier: F) -> bool
    where
        F: Fn(ProvinceId) -> bool,
    {
        if from == to || self.info(to).terrain == Terrain::Sea {
            return false;
        }
        let mut visited = vec![false; self.provinces.len()];
        let mut queue = VecDeque::new();
        for e in self.outgoing(from) {
            let p = e.to.province;
            if e.fleet_ok && !visited[p.index()] && self.info(p).convoy_capable && carrier(p) {
                visited[p.index()] = true;
                queue.push_back(p);
            }
        }
        while let Some(current) = queue.pop_front() {
            if self.fleet_borders(current, to) {
                return true;
            }
            for e in self.outgoing(current) {
                let p = e.to.province;
                if e.fleet_ok && !visited[p.index()] && self.info(p).convoy_capable && carrier(p) {
                    visited[p.index()] = true;
                    queue.push_back(p);
                }
            }
        }
        false
    }

    /// Breadth-first distance (over any border) from `from` to the nearest target.
    pub fn distance_to(&self, from: ProvinceId, targets: &[ProvinceId]) -> Option<usize> {
        if targets.contains(&from) {
            return Some(0);
        }
        let mut visited = vec![false; self.provinces.len()];
        visited[from.index()] = true;
        let mut frontier = vec![from];
        let mut dist = 0;
        while !frontier.is_empty() {
            dist += 1;
            let mut next = Vec::new();
            for &p in &frontier {
                for e in self.outgoing(p) {
                    let to = e.to.province;
                    if visited[to.index()] {
                        continue;
                    }
                    if targets.contains(&to) {
                        return Some(dist);
                    }
                    visited[to.index()] = true;
                    next.push(to);
                }
            }
            frontier = next;
        }
        None
    }
}

/// Incrementally assembles a `MapTopology`.
///
/// This is the seam a map loader feeds: powers first, then provinces, then
/// borders by abbreviation (`"spa/nc"` names a coast).
#[derive(Debug, Default)]
pub struct MapBuilder {
    provinces: Vec<ProvinceInfo>,
    powers: Vec<PowerInfo>,
    edges: Vec<AdjacencyEntry>,
    by_abbr: HashMap<String, ProvinceId>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a power and returns its id.
    pub fn add_power(&mut self, name: &str, display_name: &str) -> Power {
        self.powers.push(PowerInfo {
            name: name.to_string(),
            display_name: display_name.to_string(),
        });
        Power((self.powers.len() - 1) as u8)
    }

    /// Registers a province and returns its id.
    pub fn add_province(&mut self, info: ProvinceInfo) -> Result<ProvinceId, MapError> {
        if self.by_abbr.contains_key(&info.abbr) {
            return Err(MapError::DuplicateProvince(info.abbr));
        }
        if info.coasts.len() > ALL_COASTS.len() {
            return Err(MapError::TooManyCoasts(info.abbr));
        }
        if let Some(power) = info.home_power {
            if power.index() >= self.powers.len() {
                return Err(MapError::UnknownPower(power.0));
            }
        }
        let id = ProvinceId(self.provinces.len() as u16);
        self.by_abbr.insert(info.abbr.clone(), id);
        self.provinces.push(info);
        Ok(id)
    }

    /// Resolves `"abbr"` or `"abbr/coast"` to a location.
    pub fn location(&self, spec: &str) -> Result<Location, MapError> {
        let (abbr, coast) = match spec.split_once('/') {
            Some((a, c)) => (a, c),
            None => (spec, ""),
        };
        let province = *self
            .by_abbr
            .get(abbr)
            .ok_or_else(|| MapError::UnknownProvince(abbr.to_string()))?;
        let unknown = || MapError::UnknownCoast {
            province: abbr.to_string(),
            coast: coast.to_string(),
        };
        let coast = Coast::from_abbr(coast).ok_or_else(unknown)?;
        if coast != Coast::None && !self.provinces[province.index()].coasts.contains(&coast) {
            return Err(unknown());
        }
        Ok(Location::with_coast(province, coast))
    }

    /// Adds a border in both directions, addressed by abbreviation.
    pub fn add_border(&mut self, from: &str, to: &str, passage: Passage) -> Result<(), MapError> {
        let from = self.location(from)?;
        let to = self.location(to)?;
        self.add_edge(from, to, passage)
    }

    /// Adds a border in both directions.
    pub fn add_edge(&mut self, from: Location, to: Location, passage: Passage) -> Result<(), MapError> {
        let army_ok = matches!(passage, Passage::Army | Passage::Both);
        let fleet_ok = matches!(passage, Passage::Fleet | Passage::Both);
        let a = &self.provinces[from.province.index()];
        let b = &self.provinces[to.province.index()];
        let mismatch = |unit| MapError::TerrainMismatch {
            unit,
            from: a.abbr.clone(),
            to: b.abbr.clone(),
        };
        if army_ok && (!a.allows_army() || !b.allows_army()) {
            return Err(mismatch(UnitType::Army));
        }
        if fleet_ok && (!a.allows_fleet() || !b.allows_fleet()) {
            return Err(mismatch(UnitType::Fleet));
        }
        for (info, loc) in [(a, from), (b, to)] {
            if fleet_ok && info.has_coasts() && loc.coast == Coast::None {
                return Err(MapError::MissingCoast(info.abbr.clone()));
            }
        }
        // Army edges never carry coasts, so a coast-specific border splits in two.
        if from.coast != Coast::None || to.coast != Coast::None {
            if army_ok {
                self.push_edge(Location::new(from.province), Location::new(to.province), true, false);
            }
            self.push_edge(from, to, false, fleet_ok);
        } else {
            self.push_edge(from, to, army_ok, fleet_ok);
        }
        Ok(())
    }

    fn push_edge(&mut self, from: Location, to: Location, army_ok: bool, fleet_ok: bool) {
        if !army_ok && !fleet_ok {
            return;
        }
        self.edges.push(AdjacencyEntry { from, to, army_ok, fleet_ok });
        self.edges.push(AdjacencyEntry { from: to, to: from, army_ok, fleet_ok });
    }

    /// Finishes the map.
    pub fn build(self) -> Result<MapTopology, MapError> {
        let mut edges_from = vec![Vec::new(); self.provinces.len()];
        for (i, e) in self.edges.iter().enumerate() {
            edges_from[e.from.province.index()].push(i);
        }
        Ok(MapTopology {
            provinces: self.provinces,
            powers: self.powers,
            edges: self.edges,
            edges_from,
            by_abbr: self.by_abbr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A five-province strip: two land provinces, a split-coast province,
    /// and two seas.
    fn tiny_map() -> MapTopology {
        let mut b = MapBuilder::new();
        let red = b.add_power("red", "Red");
        b.add_province(ProvinceInfo::new("hom", "Home", Terrain::Coastal).supply_center(Some(red)))
            .unwrap();
        b.add_province(ProvinceInfo::new("inl", "Inland", Terrain::Land)).unwrap();
        b.add_province(
            ProvinceInfo::new("spl", "Split", Terrain::Coastal)
                .with_coasts(&[Coast::North, Coast::South])
                .supply_center(None),
        )
        .unwrap();
        b.add_province(ProvinceInfo::new("nse", "North Sea", Terrain::Sea)).unwrap();
        b.add_province(ProvinceInfo::new("sse", "South Sea", Terrain::Sea)).unwrap();
        b.add_border("hom", "inl", Passage::Army).unwrap();
        b.add_border("hom", "spl", Passage::Army).unwrap();
        b.add_border("hom", "nse", Passage::Fleet).unwrap();
        b.add_border("hom", "sse", Passage::Fleet).unwrap();
        b.add_border("nse", "spl/nc", Passage::Fleet).unwrap();
        b.add_border("sse", "spl/sc", Passage::Fleet).unwrap();
        b.add_border("nse", "sse", Passage::Fleet).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn lookup_by_abbr() {
        let map = tiny_map();
        assert_eq!(map.province_count(), 5);
        let spl = map.province("spl").unwrap();
        assert_eq!(map.abbr(spl), "spl");
        assert_eq!(map.province("xyz"), None);
        assert_eq!(map.power("red"), Some(Power(0)));
        assert_eq!(map.supply_center_count(), 2);
        assert_eq!(map.home_centers(Power(0)), vec![map.province("hom").unwrap()]);
    }

    #[test]
    fn adjacency_is_symmetric_and_typed() {
        let map = tiny_map();
        let hom = Location::new(map.province("hom").unwrap());
        let inl = Location::new(map.province("inl").unwrap());
        let nse = Location::new(map.province("nse").unwrap());
        assert!(map.is_adjacent(hom, inl, UnitType::Army));
        assert!(map.is_adjacent(inl, hom, UnitType::Army));
        assert!(!map.is_adjacent(hom, inl, UnitType::Fleet));
        assert!(map.is_adjacent(hom, nse, UnitType::Fleet));
        assert!(!map.is_adjacent(hom, nse, UnitType::Army));
    }

    #[test]
    fn split_coast_fleet_edges() {
        let map = tiny_map();
        let spl = map.province("spl").unwrap();
        let nse = Location::new(map.province("nse").unwrap());
        let north = Location::with_coast(spl, Coast::North);
        let south = Location::with_coast(spl, Coast::South);
        assert!(map.is_adjacent(nse, north, UnitType::Fleet));
        assert!(!map.is_adjacent(nse, south, UnitType::Fleet));
        // A bare destination matches any reachable coast.
        assert!(map.is_adjacent(nse, Location::new(spl), UnitType::Fleet));
        assert_eq!(map.fleet_coasts_to(nse, spl), vec![Coast::North]);
        assert!(map.is_adjacent(north, nse, UnitType::Fleet));
        assert!(!map.is_adjacent(south, nse, UnitType::Fleet));
        assert!(map.is_valid_location(north, UnitType::Fleet));
        assert!(!map.is_valid_location(Location::new(spl), UnitType::Fleet));
        assert!(!map.is_valid_location(north, UnitType::Army));
    }

    #[test]
    fn builder_rejects_bad_borders() {
        let mut b = MapBuilder::new();
        b.add_province(ProvinceInfo::new("lnd", "Land", Terrain::Land)).unwrap();
        b.add_province(ProvinceInfo::new("sea", "Sea", Terrain::Sea)).unwrap();
        b.add_province(
            ProvinceInfo::new("spl", "Split", Terrain::Coastal).with_coasts(&[Coast::North, Coast::South]),
        )
        .unwrap();
        assert!(matches!(
            b.add_border("lnd", "sea", Passage::Fleet),
            Err(MapError::TerrainMismatch { .. })
        ));
        assert!(matches!(
            b.add_border("lnd", "sea", Passage::Army),
            Err(MapError::TerrainMismatch { .. })
        ));
        assert_eq!(b.add_border("sea", "spl", Passage::Fleet), Err(MapError::MissingCoast("spl".into())));
        assert!(matches!(b.add_border("sea", "spl/ec", Passage::Fleet), Err(MapError::UnknownCoast { .. })));
        assert_eq!(
            b.add_province(ProvinceInfo::new("sea", "Again", Terrain::Sea)),
            Err(MapError::DuplicateProvince("sea".into()))
        );
    }

    #[test]
    fn convoy_route_search() {
        let map = tiny_map();
        let hom = map.province("hom").unwrap();
        let spl = map.province("spl").unwrap();
        let nse = map.province("nse").unwrap();
        assert!(map.convoy_route_exists(hom, spl, |_| true));
        assert!(map.convoy_route_exists(hom, spl, |p| p == nse));
        assert!(!map.convoy_route_exists(hom, spl, |_| false));
        assert!(!map.convoy_route_exists(hom, nse, |_| true));
    }

    #[test]
    fn distance_over_any_border() {
        let map = tiny_map();
        let hom = map.province("hom").unwrap();
        let sse = map.province("sse").unwrap();
        let spl = map.province("spl").unwrap();
        assert_eq!(map.distance_to(hom, &[hom]), Some(0));
        assert_eq!(map.distance_to(sse, &[hom]), Some(1));
        assert_eq!(map.distance_to(spl, &[hom]), Some(1));
    }
}
