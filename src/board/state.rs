//! Game position representation.
//!
//! Holds the snapshot of a game at one phase: unit placements,
//! supply-center ownership and dislodged units awaiting retreat orders.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::map::MapTopology;
use super::order::Location;
use super::province::{Power, ProvinceId};
use super::unit::{Unit, UnitType};

/// Contract violations on a `Position`.
///
/// These indicate a caller bypassed validation and are never produced by
/// adjudicating well-formed orders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("province {0:?} is already occupied")]
    Occupied(ProvinceId),

    #[error("no unit at province {0:?}")]
    NoUnit(ProvinceId),

    #[error("no dislodged unit at province {0:?}")]
    NotDislodged(ProvinceId),

    #[error("province {0:?} already holds a dislodged unit")]
    AlreadyDislodged(ProvinceId),

    #[error("{1:?} cannot stand at {0:?}")]
    InvalidLocation(Location, UnitType),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),
}

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    /// Returns the single-character abbreviation.
    pub const fn abbr(self) -> char {
        match self {
            Season::Spring => 'S',
            Season::Fall => 'F',
        }
    }
}

/// The kind of phase within a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Movement,
    Retreat,
    Adjustment,
}

impl PhaseKind {
    /// Returns the single-character abbreviation.
    pub const fn abbr(self) -> char {
        match self {
            PhaseKind::Movement => 'M',
            PhaseKind::Retreat => 'R',
            PhaseKind::Adjustment => 'A',
        }
    }
}

/// A point in the game's phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Phase {
    pub year: u16,
    pub season: Season,
    pub kind: PhaseKind,
}

impl Phase {
    pub fn new(year: u16, season: Season, kind: PhaseKind) -> Self {
        Phase { year, season, kind }
    }

    /// The first phase of a year.
    pub fn spring(year: u16) -> Self {
        Phase::new(year, Season::Spring, PhaseKind::Movement)
    }
}

impl fmt::Display for Phase {
    /// Formats as e.g. `S1901M` or `F1901A`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.season.abbr(), self.year, self.kind.abbr())
    }
}

/// A dislodged unit with information about its attacker and retreat options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DislodgedUnit {
    pub unit: Unit,
    /// Province the dislodging attack came from.
    pub attacker_from: ProvinceId,
    /// Locations the unit may retreat to; empty means it must disband.
    pub retreats: Vec<Location>,
}

/// Complete board position at a point in time.
///
/// Uses vectors indexed by `ProvinceId::index()` for O(1) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    units: Vec<Option<Unit>>,
    sc_owner: Vec<Option<Power>>,
    dislodged: Vec<Option<DislodgedUnit>>,
}

impl Position {
    /// Creates an empty position sized for the map.
    pub fn new(map: &MapTopology) -> Self {
        let n = map.province_count();
        Position {
            units: vec![None; n],
            sc_owner: vec![None; n],
            dislodged: vec![None; n],
        }
    }

    fn slot(&self, province: ProvinceId) -> Result<usize, StateError> {
        let idx = province.index();
        if idx < self.units.len() {
            Ok(idx)
        } else {
            Err(StateError::UnknownProvince(format!("#{}", province.0)))
        }
    }

    /// Places a unit on the board.
    pub fn place_unit(
        &mut self,
        map: &MapTopology,
        location: Location,
        power: Power,
        unit_type: UnitType,
    ) -> Result<(), StateError> {
        let idx = self.slot(location.province)?;
        if !map.is_valid_location(location, unit_type) {
            return Err(StateError::InvalidLocation(location, unit_type));
        }
        if self.units[idx].is_some() {
            return Err(StateError::Occupied(location.province));
        }
        self.units[idx] = Some(Unit { unit_type, power, location });
        Ok(())
    }

    /// Puts an existing unit back on the board at its recorded location.
    pub(crate) fn insert_unit(&mut self, unit: Unit) -> Result<(), StateError> {
        let idx = self.slot(unit.location.province)?;
        if self.units[idx].is_some() {
            return Err(StateError::Occupied(unit.location.province));
        }
        self.units[idx] = Some(unit);
        Ok(())
    }

    /// Removes and returns the unit at a province.
    pub fn remove_unit(&mut self, province: ProvinceId) -> Option<Unit> {
        self.units.get_mut(province.index()).and_then(Option::take)
    }

    /// Returns the unit at a province, if any.
    pub fn unit_at(&self, province: ProvinceId) -> Option<&Unit> {
        self.units.get(province.index()).and_then(Option::as_ref)
    }

    /// Iterates over all non-dislodged units in province order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().flatten()
    }

    /// Iterates over the units of one power.
    pub fn units_of(&self, power: Power) -> impl Iterator<Item = &Unit> + '_ {
        self.units().filter(move |u| u.power == power)
    }

    /// Returns the number of units a power has on the board.
    pub fn unit_count(&self, power: Power) -> usize {
        self.units_of(power).count()
    }

    /// Returns the owner of a supply center.
    pub fn sc_owner(&self, province: ProvinceId) -> Option<Power> {
        self.sc_owner.get(province.index()).copied().flatten()
    }

    /// Sets supply center ownership for a province.
    pub fn set_sc_owner(&mut self, province: ProvinceId, owner: Option<Power>) {
        if let Some(slot) = self.sc_owner.get_mut(province.index()) {
            *slot = owner;
        }
    }

    /// Returns the supply centers owned by a power in province order.
    pub fn centers_of(&self, power: Power) -> Vec<ProvinceId> {
        self.sc_owner
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == Some(power))
            .map(|(i, _)| ProvinceId(i as u16))
            .collect()
    }

    /// Returns the number of supply centers owned by a power.
    pub fn supply_center_count(&self, power: Power) -> usize {
        self.sc_owner.iter().filter(|o| **o == Some(power)).count()
    }

    /// Builds owed (positive) or disbands owed (negative) at an adjustment.
    pub fn adjustment(&self, power: Power) -> i32 {
        self.supply_center_count(power) as i32 - self.unit_count(power) as i32
    }

    /// Records a dislodged unit at its province.
    pub fn set_dislodged(&mut self, dislodged: DislodgedUnit) -> Result<(), StateError> {
        let province = dislodged.unit.location.province;
        let idx = self.slot(province)?;
        if self.dislodged[idx].is_some() {
            return Err(StateError::AlreadyDislodged(province));
        }
        self.dislodged[idx] = Some(dislodged);
        Ok(())
    }

    /// Returns the dislodged unit at a province, if any.
    pub fn dislodged_at(&self, province: ProvinceId) -> Option<&DislodgedUnit> {
        self.dislodged.get(province.index()).and_then(Option::as_ref)
    }

    /// Removes and returns the dislodged unit at a province.
    pub fn remove_dislodged(&mut self, province: ProvinceId) -> Option<DislodgedUnit> {
        self.dislodged.get_mut(province.index()).and_then(Option::take)
    }

    /// Iterates over dislodged units in province order.
    pub fn dislodged(&self) -> impl Iterator<Item = &DislodgedUnit> + '_ {
        self.dislodged.iter().flatten()
    }

    /// Returns true if any unit awaits a retreat order.
    pub fn has_dislodged(&self) -> bool {
        self.dislodged.iter().any(Option::is_some)
    }

    /// Returns the retreat options of the dislodged unit at a province.
    pub fn retreats_for(&self, province: ProvinceId) -> Result<&[Location], StateError> {
        self.dislodged_at(province)
            .map(|d| d.retreats.as_slice())
            .ok_or(StateError::NotDislodged(province))
    }

    /// Drops every dislodged unit.
    pub fn clear_dislodged(&mut self) {
        self.dislodged.iter_mut().for_each(|d| *d = None);
    }

    /// A power is eliminated once it has no centers and no units.
    pub fn is_eliminated(&self, power: Power) -> bool {
        self.supply_center_count(power) == 0
            && self.unit_count(power) == 0
            && !self.dislodged().any(|d| d.unit.power == power)
    }
}
