//! Structured result log.
//!
//! Every adjudicated phase produces one `ResultLog`: an outcome for each
//! order that took part, plus general events (dislodgements, disbands,
//! supply-center changes, elimination and game end) that are not tied to a
//! single order. Entries are kept in a fixed order so that two equivalent
//! adjudications always produce identical logs.

use serde::{Deserialize, Serialize};

use crate::board::order::{Location, Order};
use crate::board::province::{Power, ProvinceId};
use crate::board::unit::Unit;
use crate::board::validate::ValidationError;

/// How an order fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOutcome {
    Succeeded,
    /// Move stopped by an equal or stronger hold, defence or rival attack.
    Bounced,
    /// Support removed by an attack on the supporting unit, or by its dislodgement.
    Cut,
    /// Support or convoy for a unit that did not give the matching order.
    Void,
    /// Convoyed move without an intact chain of convoying fleets.
    NoConvoy,
    /// Convoying fleet was dislodged.
    Disrupted,
    /// Move against a fleet kept in place by convoy-paradox resolution.
    ParadoxHeld,
    /// Retreat into a province another unit also retreated to.
    RetreatBounced,
    /// Unit removed by its own disband order.
    Disbanded,
    /// Illegal order; the unit held, disbanded, or the build did not happen.
    Invalid(ValidationError),
}

impl OrderOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, OrderOutcome::Succeeded | OrderOutcome::Disbanded)
    }
}

/// The outcome of one submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub power: Power,
    /// The order as adjudicated: normalised, or as submitted when invalid.
    pub order: Order,
    pub outcome: OrderOutcome,
    /// Set when the ordered unit was dislodged, naming the attacker's origin.
    pub dislodged_by: Option<ProvinceId>,
}

impl OrderResult {
    pub fn new(power: Power, order: Order, outcome: OrderOutcome) -> Self {
        OrderResult { power, order, outcome, dislodged_by: None }
    }

    fn sort_key(&self) -> (u16, Power) {
        (self.order.province().map_or(u16::MAX, |p| p.0), self.power)
    }
}

/// Why a unit left the board without a disband order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisbandReason {
    /// Dislodged with nowhere to retreat.
    NoRetreat,
    /// Dislodged and given no retreat order.
    Unordered,
    /// Removed because its power owed disbands and did not order them.
    CivilDisorder,
}

/// A result not linked to a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Dislodged {
        unit: Unit,
        attacker_from: ProvinceId,
        retreats: Vec<Location>,
    },
    Disbanded {
        unit: Unit,
        reason: DisbandReason,
    },
    SupplyCenterChanged {
        province: ProvinceId,
        from: Option<Power>,
        to: Power,
    },
    Eliminated {
        power: Power,
    },
    Victory {
        power: Power,
        centers: usize,
    },
    Draw {
        survivors: Vec<Power>,
    },
}

impl GameEvent {
    /// Returns true if the event concerns `power`.
    pub fn involves(&self, power: Power) -> bool {
        match self {
            GameEvent::Dislodged { unit, .. } | GameEvent::Disbanded { unit, .. } => unit.power == power,
            GameEvent::SupplyCenterChanged { from, to, .. } => *to == power || *from == Some(power),
            GameEvent::Eliminated { power: p } | GameEvent::Victory { power: p, .. } => *p == power,
            GameEvent::Draw { survivors } => survivors.contains(&power),
        }
    }

    /// Returns true for events that end the game.
    pub fn ends_game(&self) -> bool {
        matches!(self, GameEvent::Victory { .. } | GameEvent::Draw { .. })
    }
}

/// One entry of a log query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultEntry<'a> {
    Order(&'a OrderResult),
    Event(&'a GameEvent),
}

/// Append-only log of one phase's results.
///
/// Order results are kept sorted by the ordered unit's province (waives
/// last), so insertion order never shows through. Events keep the order in
/// which adjudication produced them, which is itself deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLog {
    orders: Vec<OrderResult>,
    events: Vec<GameEvent>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an order result in its sorted position.
    pub fn push_order(&mut self, result: OrderResult) {
        let key = result.sort_key();
        let at = self.orders.partition_point(|r| r.sort_key() <= key);
        self.orders.insert(at, result);
    }

    /// Records a general event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn order_results(&self) -> &[OrderResult] {
        &self.orders
    }

    /// All general (non-order-linked) results.
    pub fn general(&self) -> &[GameEvent] {
        &self.events
    }

    /// All results for one power: its order results, then events involving it.
    pub fn for_power(&self, power: Power) -> Vec<ResultEntry<'_>> {
        let orders = self.orders.iter().filter(|r| r.power == power).map(ResultEntry::Order);
        let events = self.events.iter().filter(|e| e.involves(power)).map(ResultEntry::Event);
        orders.chain(events).collect()
    }

    /// The result of the order given to the unit at `province`.
    pub fn outcome_at(&self, province: ProvinceId) -> Option<&OrderResult> {
        self.orders.iter().find(|r| r.order.province() == Some(province))
    }

    /// Iterates over every entry: order results first, then events.
    pub fn entries(&self) -> impl Iterator<Item = ResultEntry<'_>> + '_ {
        self.orders
            .iter()
            .map(ResultEntry::Order)
            .chain(self.events.iter().map(ResultEntry::Event))
    }

    pub fn len(&self) -> usize {
        self.orders.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.events.is_empty()
    }
}
