//! Retreat-phase resolution.
//!
//! Resolves retreat orders: if two dislodged units retreat to the same province,
//! both are disbanded. Unordered dislodged units are disbanded (civil disorder).

use std::collections::{BTreeMap, BTreeSet};

use crate::board::order::Order;
use crate::board::province::{Power, ProvinceId};
use crate::board::state::{Position, StateError};
use crate::board::unit::Unit;
use crate::results::{OrderOutcome, OrderResult};

/// The outcome of a retreat phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetreatResolution {
    /// One result per accepted order, in province order.
    pub results: Vec<OrderResult>,
    /// Dislodged units that received no order.
    pub unordered: Vec<Unit>,
}

/// Resolves validated retreat-phase orders.
///
/// Rules:
/// - Disband orders always succeed.
/// - Two or more retreats into one province all fail and those units disband.
/// - A second order for the same unit, or an order for a unit that is not
///   dislodged, is ignored.
pub fn resolve_retreats(orders: &[(Order, Power)], position: &Position) -> RetreatResolution {
    let mut target_count: BTreeMap<ProvinceId, usize> = BTreeMap::new();
    let mut accepted = Vec::new();
    let mut seen = BTreeSet::new();

    for &(order, power) in orders {
        let Some(prov) = order.province() else {
            continue;
        };
        if !order.is_retreat() || position.dislodged_at(prov).is_none() || !seen.insert(prov) {
            continue;
        }
        if let Order::Retreat { dest, .. } = order {
            *target_count.entry(dest.province).or_default() += 1;
        }
        accepted.push((order, power));
    }

    let mut results: Vec<OrderResult> = accepted
        .into_iter()
        .map(|(order, power)| {
            let outcome = match order {
                Order::Retreat { dest, .. } if target_count[&dest.province] > 1 => {
                    OrderOutcome::RetreatBounced
                }
                Order::Retreat { .. } => OrderOutcome::Succeeded,
                _ => OrderOutcome::Disbanded,
            };
            OrderResult::new(power, order, outcome)
        })
        .collect();
    results.sort_by_key(|r| r.order.province());

    let unordered = position
        .dislodged()
        .filter(|d| !seen.contains(&d.unit.location.province))
        .map(|d| d.unit)
        .collect();

    RetreatResolution { results, unordered }
}

/// Applies resolved retreats to the position.
///
/// Successful retreats put the unit back on the board at its destination;
/// every other dislodged unit is removed.
pub fn apply_retreats(position: &mut Position, results: &[OrderResult]) -> Result<(), StateError> {
    for r in results {
        if r.outcome != OrderOutcome::Succeeded {
            continue;
        }
        if let Order::Retreat { unit, dest } = r.order {
            let src = unit.location.province;
            let dislodged = position.remove_dislodged(src).ok_or(StateError::NotDislodged(src))?;
            let mut unit = dislodged.unit;
            unit.location = dest;
            position.insert_unit(unit)?;
        }
    }
    position.clear_dislodged();
    Ok(())
}
