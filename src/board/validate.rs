//! Order validation and normalisation.
//!
//! `validate_order` checks a single order against the map and position and
//! returns it in canonical form: unit coasts taken from the board, fleet
//! destinations given the coast they can reach, army destinations without
//! coasts, and `via_convoy` set on army moves that need transport.
//!
//! `check_submission` applies the whole-submission rules that reject an
//! order set outright instead of degrading individual orders.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::map::MapTopology;
use super::order::{Location, Order, OrderUnit};
use super::province::{Coast, Power, ProvinceId, Terrain};
use super::state::{PhaseKind, Position};
use super::unit::{Unit, UnitType};

/// Why an order is illegal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("no such unit at {0:?}")]
    UnitNotFound(ProvinceId),

    #[error("unit at {0:?} belongs to another power")]
    NotOwnUnit(ProvinceId),

    #[error("{0:?} is not a legal destination")]
    IllegalDestination(ProvinceId),

    #[error("this unit type cannot give the order")]
    WrongUnitKindForOrder,

    #[error("destination {0:?} needs a coast")]
    AmbiguousCoast(ProvinceId),

    #[error("support names no reachable unit or destination")]
    SupportTargetInvalid,

    #[error("convoy names no army that could be carried")]
    ConvoyTargetInvalid,

    #[error("no convoy route can reach {0:?}")]
    ConvoyRouteImpossible(ProvinceId),

    #[error("order not allowed in a {0:?} phase")]
    WrongPhase(PhaseKind),

    #[error("more than one order for the unit at {0:?}")]
    DuplicateOrder(ProvinceId),

    #[error("unit at {0:?} is not dislodged")]
    NotDislodged(ProvinceId),

    #[error("cannot build at {0:?}")]
    InvalidBuildLocation(ProvinceId),

    #[error("expected {expected} adjustment orders, found {found}")]
    AdjustmentCountMismatch { expected: usize, found: usize },
}

fn phase_allows(kind: PhaseKind, order: &Order) -> bool {
    match kind {
        PhaseKind::Movement => order.is_movement(),
        PhaseKind::Retreat => order.is_retreat(),
        PhaseKind::Adjustment => order.is_adjustment(),
    }
}

fn in_map(map: &MapTopology, province: ProvinceId) -> bool {
    province.index() < map.province_count()
}

/// Finds the board unit an order refers to.
fn find_unit(map: &MapTopology, position: &Position, ou: OrderUnit) -> Result<Unit, ValidationError> {
    let prov = ou.location.province;
    if !in_map(map, prov) {
        return Err(ValidationError::UnitNotFound(prov));
    }
    match position.unit_at(prov) {
        Some(u) if u.unit_type == ou.unit_type && ou.location.matches(u.location) => Ok(*u),
        _ => Err(ValidationError::UnitNotFound(prov)),
    }
}

/// Finds the issuing unit and checks it belongs to `power`.
fn own_unit(
    map: &MapTopology,
    position: &Position,
    power: Power,
    ou: OrderUnit,
) -> Result<Unit, ValidationError> {
    let unit = find_unit(map, position, ou)?;
    if unit.power != power {
        return Err(ValidationError::NotOwnUnit(ou.location.province));
    }
    Ok(unit)
}

fn as_order_unit(unit: &Unit) -> OrderUnit {
    OrderUnit { unit_type: unit.unit_type, location: unit.location }
}

fn has_fleet(position: &Position, province: ProvinceId) -> bool {
    matches!(position.unit_at(province), Some(u) if u.unit_type == UnitType::Fleet)
}

/// Resolves a fleet destination to the exact coast it can reach.
fn fleet_destination(map: &MapTopology, from: Location, dest: Location) -> Result<Location, ValidationError> {
    let coasts = map.fleet_coasts_to(from, dest.province);
    if coasts.is_empty() {
        return Err(ValidationError::IllegalDestination(dest.province));
    }
    if dest.coast != Coast::None {
        return if coasts.contains(&dest.coast) {
            Ok(dest)
        } else {
            Err(ValidationError::IllegalDestination(dest.province))
        };
    }
    match coasts.as_slice() {
        [only] => Ok(Location::with_coast(dest.province, *only)),
        _ => Err(ValidationError::AmbiguousCoast(dest.province)),
    }
}

/// Returns true if `unit` could move to `dest`, by land, sea, or convoy over
/// fleets currently on the board.
fn could_reach(map: &MapTopology, position: &Position, unit: &Unit, dest: ProvinceId) -> bool {
    if map.can_reach(unit.location, unit.unit_type, dest) {
        return true;
    }
    unit.unit_type == UnitType::Army
        && map.convoy_route_exists(unit.location.province, dest, |p| has_fleet(position, p))
}

fn validate_move(
    map: &MapTopology,
    position: &Position,
    unit: Unit,
    dest: Location,
    via_convoy: bool,
) -> Result<Order, ValidationError> {
    let from = unit.location;
    if !in_map(map, dest.province) || dest.province == from.province {
        return Err(ValidationError::IllegalDestination(dest.province));
    }
    let ou = as_order_unit(&unit);
    match unit.unit_type {
        UnitType::Army => {
            if map.info(dest.province).terrain == Terrain::Sea {
                return Err(ValidationError::IllegalDestination(dest.province));
            }
            let dest = Location::new(dest.province);
            let adjacent = map.is_adjacent(from, dest, UnitType::Army);
            let route = || map.convoy_route_exists(from.province, dest.province, |p| has_fleet(position, p));
            if adjacent && (!via_convoy || !route()) {
                return Ok(Order::Move { unit: ou, dest, via_convoy: false });
            }
            if !route() {
                return Err(ValidationError::ConvoyRouteImpossible(dest.province));
            }
            Ok(Order::Move { unit: ou, dest, via_convoy: true })
        }
        UnitType::Fleet => {
            if via_convoy {
                return Err(ValidationError::WrongUnitKindForOrder);
            }
            let dest = fleet_destination(map, from, dest)?;
            Ok(Order::Move { unit: ou, dest, via_convoy: false })
        }
    }
}

fn validate_support(
    map: &MapTopology,
    position: &Position,
    supporter: Unit,
    supported: OrderUnit,
    dest: Option<Location>,
) -> Result<Order, ValidationError> {
    let target = find_unit(map, position, supported).map_err(|_| ValidationError::SupportTargetInvalid)?;
    if target.location.province == supporter.location.province {
        return Err(ValidationError::SupportTargetInvalid);
    }
    let unit = as_order_unit(&supporter);
    let supported = as_order_unit(&target);
    match dest {
        None => {
            if !map.can_reach(supporter.location, supporter.unit_type, target.location.province) {
                return Err(ValidationError::SupportTargetInvalid);
            }
            Ok(Order::SupportHold { unit, supported })
        }
        Some(dest) => {
            let p = dest.province;
            if !in_map(map, p) || p == supporter.location.province || p == target.location.province {
                return Err(ValidationError::SupportTargetInvalid);
            }
            if !map.can_reach(supporter.location, supporter.unit_type, p) {
                return Err(ValidationError::SupportTargetInvalid);
            }
            if !could_reach(map, position, &target, p) {
                return Err(ValidationError::SupportTargetInvalid);
            }
            Ok(Order::SupportMove { unit, supported, dest: Location::new(p) })
        }
    }
}

fn validate_convoy(
    map: &MapTopology,
    position: &Position,
    fleet: Unit,
    from: Location,
    to: Location,
) -> Result<Order, ValidationError> {
    if fleet.unit_type != UnitType::Fleet {
        return Err(ValidationError::WrongUnitKindForOrder);
    }
    let here = fleet.location.province;
    if !map.info(here).convoy_capable {
        return Err(ValidationError::ConvoyRouteImpossible(to.province));
    }
    let army = match position.unit_at(from.province) {
        Some(u) if in_map(map, from.province) && u.unit_type == UnitType::Army => *u,
        _ => return Err(ValidationError::ConvoyTargetInvalid),
    };
    if !in_map(map, to.province) || to.province == from.province {
        return Err(ValidationError::ConvoyTargetInvalid);
    }
    let fleets = |p: ProvinceId| has_fleet(position, p);
    if !map.convoy_route_exists(army.location.province, to.province, fleets) {
        return Err(ValidationError::ConvoyRouteImpossible(to.province));
    }
    Ok(Order::Convoy {
        unit: as_order_unit(&fleet),
        convoyed_from: Location::new(from.province),
        convoyed_to: Location::new(to.province),
    })
}

fn validate_retreat(
    map: &MapTopology,
    position: &Position,
    power: Power,
    ou: OrderUnit,
    dest: Option<Location>,
) -> Result<Order, ValidationError> {
    let prov = ou.location.province;
    if !in_map(map, prov) {
        return Err(ValidationError::NotDislodged(prov));
    }
    let d = position.dislodged_at(prov).ok_or(ValidationError::NotDislodged(prov))?;
    if d.unit.unit_type != ou.unit_type || !ou.location.matches(d.unit.location) {
        return Err(ValidationError::UnitNotFound(prov));
    }
    if d.unit.power != power {
        return Err(ValidationError::NotOwnUnit(prov));
    }
    let unit = as_order_unit(&d.unit);
    let Some(dest) = dest else {
        return Ok(Order::Disband { unit });
    };
    let mut options = d.retreats.iter().filter(|r| r.matches(dest));
    match (options.next(), options.next()) {
        (Some(&only), None) => Ok(Order::Retreat { unit, dest: only }),
        (Some(_), Some(_)) => Err(ValidationError::AmbiguousCoast(dest.province)),
        (None, _) => Err(ValidationError::IllegalDestination(dest.province)),
    }
}

fn validate_build(
    map: &MapTopology,
    position: &Position,
    power: Power,
    ou: OrderUnit,
) -> Result<Order, ValidationError> {
    let prov = ou.location.province;
    if !in_map(map, prov) {
        return Err(ValidationError::InvalidBuildLocation(prov));
    }
    let info = map.info(prov);
    let home = info.supply_center && info.home_power == Some(power);
    if !home || position.sc_owner(prov) != Some(power) || position.unit_at(prov).is_some() {
        return Err(ValidationError::InvalidBuildLocation(prov));
    }
    let location = match ou.unit_type {
        UnitType::Army if info.allows_army() => Location::new(prov),
        UnitType::Fleet if info.terrain == Terrain::Coastal => {
            if !info.has_coasts() {
                Location::new(prov)
            } else if ou.location.coast == Coast::None {
                return Err(ValidationError::AmbiguousCoast(prov));
            } else if info.coasts.contains(&ou.location.coast) {
                ou.location
            } else {
                return Err(ValidationError::InvalidBuildLocation(prov));
            }
        }
        _ => return Err(ValidationError::InvalidBuildLocation(prov)),
    };
    Ok(Order::Build { unit: OrderUnit { unit_type: ou.unit_type, location } })
}

/// Validates one order for `power` in a phase of the given kind.
///
/// Returns the canonical form of the order on success.
pub fn validate_order(
    map: &MapTopology,
    position: &Position,
    kind: PhaseKind,
    power: Power,
    order: &Order,
) -> Result<Order, ValidationError> {
    if !phase_allows(kind, order) {
        return Err(ValidationError::WrongPhase(kind));
    }
    match *order {
        Order::Hold { unit } => {
            let unit = own_unit(map, position, power, unit)?;
            Ok(Order::Hold { unit: as_order_unit(&unit) })
        }
        Order::Move { unit, dest, via_convoy } => {
            let unit = own_unit(map, position, power, unit)?;
            validate_move(map, position, unit, dest, via_convoy)
        }
        Order::SupportHold { unit, supported } => {
            let unit = own_unit(map, position, power, unit)?;
            validate_support(map, position, unit, supported, None)
        }
        Order::SupportMove { unit, supported, dest } => {
            let unit = own_unit(map, position, power, unit)?;
            validate_support(map, position, unit, supported, Some(dest))
        }
        Order::Convoy { unit, convoyed_from, convoyed_to } => {
            let unit = own_unit(map, position, power, unit)?;
            validate_convoy(map, position, unit, convoyed_from, convoyed_to)
        }
        Order::Retreat { unit, dest } => validate_retreat(map, position, power, unit, Some(dest)),
        Order::Disband { unit } if kind == PhaseKind::Retreat => {
            validate_retreat(map, position, power, unit, None)
        }
        Order::Disband { unit } => {
            let unit = own_unit(map, position, power, unit)?;
            Ok(Order::Disband { unit: as_order_unit(&unit) })
        }
        Order::Build { unit } => validate_build(map, position, power, unit),
        Order::Waive => Ok(Order::Waive),
    }
}

/// Checks the rules that reject a power's whole submission.
///
/// Orders naming another power's unit, orders from the wrong phase,
/// two orders for one unit, and adjustment counts that differ from what
/// the power owes are errors. Other problems are left to `validate_order`
/// so the offending order can degrade during adjudication.
pub fn check_submission(
    position: &Position,
    kind: PhaseKind,
    power: Power,
    orders: &[Order],
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for order in orders {
        if !phase_allows(kind, order) {
            return Err(ValidationError::WrongPhase(kind));
        }
        let Some(prov) = order.province() else {
            continue;
        };
        if !seen.insert(prov) {
            return Err(ValidationError::DuplicateOrder(prov));
        }
        let owner = match (kind, order) {
            (PhaseKind::Retreat, _) => position.dislodged_at(prov).map(|d| d.unit.power),
            (_, Order::Build { .. }) => None,
            _ => position.unit_at(prov).map(|u| u.power),
        };
        if matches!(owner, Some(p) if p != power) {
            return Err(ValidationError::NotOwnUnit(prov));
        }
    }

    if kind == PhaseKind::Adjustment {
        let owed = position.adjustment(power);
        let expected = owed.unsigned_abs() as usize;
        let found = if owed > 0 {
            orders.iter().filter(|o| matches!(o, Order::Build { .. } | Order::Waive)).count()
        } else {
            orders.iter().filter(|o| matches!(o, Order::Disband { .. })).count()
        };
        if found != expected || orders.len() != found {
            return Err(ValidationError::AdjustmentCountMismatch { expected, found: orders.len() });
        }
    }
    Ok(())
}
