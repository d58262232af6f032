//! Adjustment-phase resolution.
//!
//! Resolves build, disband and waive orders at the end of a game year and
//! handles civil disorder: a power that orders too few disbands loses the
//! units furthest from its home centers, and unordered builds are waived.

use tracing::warn;

use crate::board::map::MapTopology;
use crate::board::order::Order;
use crate::board::province::{Power, ProvinceId};
use crate::board::state::{Position, StateError};
use crate::board::unit::Unit;
use crate::board::validate::ValidationError;
use crate::results::{OrderOutcome, OrderResult};

/// The outcome of an adjustment phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentResolution {
    /// One result per order, in province order with waives last.
    pub results: Vec<OrderResult>,
    /// Units removed because their power did not order enough disbands.
    pub civil_disorder: Vec<Unit>,
}

/// Resolves validated adjustment orders for all powers.
///
/// For each power:
/// - If centers exceed units: builds and waives succeed up to the count owed.
/// - If units exceed centers: disbands succeed up to the count owed and
///   civil disorder covers any shortfall.
/// - Orders beyond what a power owes fail with a count mismatch.
pub fn resolve_adjustments(
    map: &MapTopology,
    orders: &[(Order, Power)],
    position: &Position,
) -> AdjustmentResolution {
    let mut results: Vec<OrderResult> = Vec::new();
    let mut civil_disorder = Vec::new();

    for power in map.powers() {
        let owed = position.adjustment(power);
        let expected = owed.unsigned_abs() as usize;
        let mine: Vec<Order> = orders
            .iter()
            .filter(|(order, p)| *p == power && order.is_adjustment())
            .map(|(order, _)| *order)
            .collect();
        let found = mine.len();
        let mut used = 0;
        let mut disbanded: Vec<ProvinceId> = Vec::new();

        for order in mine {
            let fits = match order {
                Order::Build { unit } => {
                    owed > 0 && position.unit_at(unit.location.province).is_none()
                        && !results.iter().any(|r| r.order == order)
                }
                Order::Waive => owed > 0,
                Order::Disband { unit } => {
                    owed < 0
                        && position
                            .unit_at(unit.location.province)
                            .is_some_and(|u| u.power == power)
                        && !disbanded.contains(&unit.location.province)
                }
                _ => false,
            };
            let outcome = if fits && used < expected {
                used += 1;
                if let Order::Disband { unit } = order {
                    disbanded.push(unit.location.province);
                    OrderOutcome::Disbanded
                } else {
                    OrderOutcome::Succeeded
                }
            } else {
                OrderOutcome::Invalid(ValidationError::AdjustmentCountMismatch { expected, found })
            };
            results.push(OrderResult::new(power, order, outcome));
        }

        if owed < 0 && used < expected {
            let shortfall = expected - used;
            warn!(power = power.index(), shortfall, "civil disorder disbands");
            civil_disorder.extend(civil_disorder_units(map, position, power, &disbanded, shortfall));
        }
    }

    results.sort_by_key(|r| (r.order.province().map_or(u16::MAX, |p| p.0), r.power));
    AdjustmentResolution { results, civil_disorder }
}

/// Picks the units furthest from home supply centers.
///
/// Distance is measured across any border; ties go to the unit in the
/// lowest-numbered province.
fn civil_disorder_units(
    map: &MapTopology,
    position: &Position,
    power: Power,
    already_disbanded: &[ProvinceId],
    count: usize,
) -> Vec<Unit> {
    let homes = map.home_centers(power);
    let mut candidates: Vec<(usize, Unit)> = position
        .units_of(power)
        .filter(|u| !already_disbanded.contains(&u.location.province))
        .map(|u| {
            let dist = map.distance_to(u.location.province, &homes).unwrap_or(usize::MAX);
            (dist, *u)
        })
        .collect();

    // Furthest first, then by province index for determinism.
    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.location.province.cmp(&b.1.location.province))
    });
    candidates.into_iter().take(count).map(|(_, u)| u).collect()
}

/// Applies resolved adjustments to the position.
pub fn apply_adjustments(
    position: &mut Position,
    map: &MapTopology,
    resolution: &AdjustmentResolution,
) -> Result<(), StateError> {
    for r in &resolution.results {
        match (r.order, r.outcome) {
            (Order::Build { unit }, OrderOutcome::Succeeded) => {
                position.place_unit(map, unit.location, r.power, unit.unit_type)?;
            }
            (Order::Disband { unit }, OrderOutcome::Disbanded) => {
                let prov = unit.location.province;
                position.remove_unit(prov).ok_or(StateError::NoUnit(prov))?;
            }
            _ => {}
        }
    }
    for unit in &resolution.civil_disorder {
        position.remove_unit(unit.location.province);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::order::{Location, OrderUnit};
    use crate::board::standard::{opening_position, standard_map, AUSTRIA, GERMANY, RUSSIA};
    use crate::board::unit::UnitType;

    fn loc(map: &MapTopology, abbr: &str) -> Location {
        Location::new(map.province(abbr).unwrap())
    }

    #[test]
    fn builds_up_to_count_owed() {
        let map = standard_map();
        let mut position = opening_position(&map).unwrap();
        let vie = loc(&map, "vie");
        position.remove_unit(vie.province);
        position.set_sc_owner(loc(&map, "ser").province, Some(AUSTRIA));
        // Austria: 4 centers, 2 units.
        let orders = [
            (Order::Build { unit: OrderUnit::army(vie) }, AUSTRIA),
            (Order::Waive, AUSTRIA),
        ];
        let res = resolve_adjustments(&map, &orders, &position);
        assert_eq!(res.results.len(), 2);
        assert!(res.results.iter().all(|r| r.outcome == OrderOutcome::Succeeded));
        assert_eq!(res.results[1].order, Order::Waive);

        apply_adjustments(&mut position, &map, &res).unwrap();
        assert_eq!(position.unit_count(AUSTRIA), 3);
        assert_eq!(position.unit_at(vie.province).map(|u| u.unit_type), Some(UnitType::Army));
    }

    #[test]
    fn surplus_orders_fail() {
        let map = standard_map();
        let position = opening_position(&map).unwrap();
        let orders = [(Order::Waive, GERMANY)];
        let res = resolve_adjustments(&map, &orders, &position);
        assert_eq!(
            res.results[0].outcome,
            OrderOutcome::Invalid(ValidationError::AdjustmentCountMismatch { expected: 0, found: 1 })
        );
    }

    #[test]
    fn ordered_disband() {
        let map = standard_map();
        let mut position = opening_position(&map).unwrap();
        let war = loc(&map, "war");
        position.set_sc_owner(war.province, None);
        let orders = [(Order::Disband { unit: OrderUnit::army(war) }, RUSSIA)];
        let res = resolve_adjustments(&map, &orders, &position);
        assert_eq!(res.results[0].outcome, OrderOutcome::Disbanded);
        assert!(res.civil_disorder.is_empty());
        apply_adjustments(&mut position, &map, &res).unwrap();
        assert_eq!(position.unit_count(RUSSIA), 3);
    }

    #[test]
    fn civil_disorder_disbands_furthest_unit() {
        let map = standard_map();
        let mut position = opening_position(&map).unwrap();
        // Move Russia's Moscow army far from home and drop a center.
        let mos = loc(&map, "mos");
        let mut army = position.remove_unit(mos.province).unwrap();
        army.location = loc(&map, "arm");
        position.insert_unit(army).unwrap();
        position.set_sc_owner(loc(&map, "war").province, None);

        let res = resolve_adjustments(&map, &[], &position);
        assert_eq!(res.civil_disorder.len(), 1);
        assert_eq!(res.civil_disorder[0].location, loc(&map, "arm"));

        apply_adjustments(&mut position, &map, &res).unwrap();
        assert_eq!(position.unit_count(RUSSIA), 3);
        assert!(position.unit_at(loc(&map, "arm").province).is_none());
    }

    #[test]
    fn civil_disorder_ties_by_province_order() {
        let map = standard_map();
        let mut position = opening_position(&map).unwrap();
        for abbr in ["vie", "bud", "tri"] {
            position.set_sc_owner(loc(&map, abbr).province, None);
        }
        // Austria: 0 centers, 3 units all on home centers.
        let res = resolve_adjustments(&map, &[], &position);
        let disbanded: Vec<_> = res.civil_disorder.iter().map(|u| u.location.province).collect();
        let mut expected = vec![loc(&map, "bud").province, loc(&map, "tri").province, loc(&map, "vie").province];
        expected.sort();
        assert_eq!(disbanded, expected);
    }
}
