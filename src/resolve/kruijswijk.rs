//! Kruijswijk guess-and-check resolution algorithm.
//!
//! Each order is resolved on demand. When resolving an order needs the
//! outcome of an order that is itself being resolved, the inner call returns
//! the current guess and records the guessed order on a dependency list.
//! A dependency cycle is settled by trying both guesses: if exactly one is
//! consistent it is kept, otherwise the backup rule decides (circular
//! movement, convoy paradox, or a cycle of supports).

use std::collections::VecDeque;

use tracing::debug;

use crate::board::map::MapTopology;
use crate::board::order::{Order, OrderUnit};
use crate::board::province::{Power, ProvinceId};
use crate::board::state::{DislodgedUnit, Position};
use crate::board::unit::{Unit, UnitType};
use crate::results::{OrderOutcome, OrderResult};

use super::AdjudicationError;

/// Resolution state for the guess-and-check algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResState {
    Unresolved,
    Guessing,
    Resolved,
}

/// Internal tracking for a single order during adjudication.
#[derive(Debug, Clone, Copy)]
struct AdjResult {
    order: Order,
    power: Power,
    state: ResState,
    resolution: bool,
    prov: ProvinceId,
    /// For move: destination province.
    target: Option<ProvinceId>,
    /// For support: province of the supported unit.
    /// For convoy: province of the convoyed army.
    aux_loc: Option<ProvinceId>,
    /// For support-move: destination of the supported move.
    /// For convoy: destination of the convoyed army.
    aux_target: Option<ProvinceId>,
    /// Move relies on convoying fleets.
    via_convoy: bool,
    /// Support or convoy that matches no order.
    void: bool,
    /// Convoy held in place by the convoy-paradox rule.
    protected: bool,
}

impl AdjResult {
    fn is_move(&self) -> bool {
        matches!(self.order, Order::Move { .. })
    }

    fn is_support(&self) -> bool {
        matches!(self.order, Order::SupportHold { .. } | Order::SupportMove { .. })
    }

    fn is_convoy(&self) -> bool {
        matches!(self.order, Order::Convoy { .. })
    }
}

/// A unit forced out of its province by a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dislodgement {
    pub unit: Unit,
    pub attacker_from: ProvinceId,
    /// The attack was convoyed, so the attacker's origin stays open for retreat.
    pub by_convoy: bool,
}

/// Everything a movement adjudication decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementResolution {
    /// One result per order, including implicit holds, in province order.
    pub results: Vec<OrderResult>,
    pub dislodged: Vec<Dislodgement>,
    /// Provinces left empty by a standoff: a failed move with an intact
    /// route aimed there, nothing entered, and the mover did not lose a
    /// head-to-head battle with the province's own unit.
    pub contested: Vec<ProvinceId>,
}

/// Movement-phase resolver bound to one map.
///
/// Allocate once and call `resolve()` on each set of orders; the internal
/// buffers are reused between calls.
pub struct Resolver<'a> {
    map: &'a MapTopology,
    lookup: Vec<Option<usize>>,
    adj_buf: Vec<AdjResult>,
    dep_list: Vec<usize>,
    calls: usize,
    budget: usize,
    diverged: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(map: &'a MapTopology) -> Self {
        Resolver {
            map,
            lookup: vec![None; map.province_count()],
            adj_buf: Vec::new(),
            dep_list: Vec::new(),
            calls: 0,
            budget: 0,
            diverged: false,
        }
    }

    /// Resolves a set of movement-phase orders against the position.
    ///
    /// Orders are expected to be validated. Units without an order hold,
    /// and non-movement orders are ignored. The outcome never depends on
    /// the order of `orders`.
    pub fn resolve(
        &mut self,
        orders: &[(Order, Power)],
        position: &Position,
    ) -> Result<MovementResolution, AdjudicationError> {
        self.init(orders, position);
        self.adjudicate_all();
        if self.diverged {
            return Err(AdjudicationError::NoConvergence { orders: self.adj_buf.len() });
        }
        Ok(self.build_results(position))
    }

    fn init(&mut self, orders: &[(Order, Power)], position: &Position) {
        self.adj_buf.clear();
        self.dep_list.clear();
        self.lookup.fill(None);
        self.calls = 0;
        self.diverged = false;

        let mut entries: Vec<(Order, Power)> = orders
            .iter()
            .filter(|(order, _)| order.is_movement())
            .filter(|(order, _)| order.province().and_then(|p| position.unit_at(p)).is_some())
            .copied()
            .collect();
        entries.sort_by_key(|(order, power)| (order.province(), *power));
        entries.dedup_by_key(|(order, _)| order.province());

        let mut ordered = vec![false; self.lookup.len()];
        for (order, _) in &entries {
            if let Some(p) = order.province() {
                ordered[p.index()] = true;
            }
        }
        for unit in position.units().filter(|u| !ordered[u.location.province.index()]) {
            let hold = Order::Hold {
                unit: OrderUnit { unit_type: unit.unit_type, location: unit.location },
            };
            entries.push((hold, unit.power));
        }
        entries.sort_by_key(|(order, _)| order.province());

        for (order, power) in entries {
            let Some(prov) = order.province() else {
                continue;
            };
            let (target, aux_loc, aux_target) = order_indices(&order);
            let via_convoy = match order {
                Order::Move { unit, dest, via_convoy } => {
                    unit.unit_type == UnitType::Army
                        && (via_convoy || !self.map.is_adjacent(unit.location, dest, UnitType::Army))
                }
                _ => false,
            };
            self.lookup[prov.index()] = Some(self.adj_buf.len());
            self.adj_buf.push(AdjResult {
                order,
                power,
                state: ResState::Unresolved,
                resolution: false,
                prov,
                target,
                aux_loc,
                aux_target,
                via_convoy,
                void: false,
                protected: false,
            });
        }

        for i in 0..self.adj_buf.len() {
            if self.is_void(i) {
                let ar = &mut self.adj_buf[i];
                ar.void = true;
                ar.state = ResState::Resolved;
                ar.resolution = false;
            }
        }
        self.budget = 4096 * (self.adj_buf.len() + 1);
    }

    fn order_at(&self, prov: Option<ProvinceId>) -> Option<usize> {
        prov.and_then(|p| self.lookup.get(p.index()).copied().flatten())
    }

    /// A support or convoy is void when the unit it names does not give the
    /// matching order.
    fn is_void(&self, i: usize) -> bool {
        let ar = self.adj_buf[i];
        let other = self.order_at(ar.aux_loc).map(|j| self.adj_buf[j]);
        match ar.order {
            Order::SupportHold { .. } => other.map_or(true, |o| o.is_move()),
            Order::SupportMove { .. } => {
                other.map_or(true, |o| !o.is_move() || o.target != ar.aux_target)
            }
            Order::Convoy { .. } => {
                !self.map.info(ar.prov).convoy_capable
                    || other.map_or(true, |o| !o.is_move() || !o.via_convoy || o.target != ar.aux_target)
            }
            _ => false,
        }
    }

    fn adjudicate_all(&mut self) {
        for i in 0..self.adj_buf.len() {
            self.adjudicate(i);
            if self.diverged {
                return;
            }
        }
    }

    /// Returns the resolution of order `nr`, resolving it if necessary.
    fn adjudicate(&mut self, nr: usize) -> bool {
        self.calls += 1;
        if self.calls > self.budget {
            self.diverged = true;
        }
        if self.diverged {
            return self.adj_buf[nr].resolution;
        }

        match self.adj_buf[nr].state {
            ResState::Resolved => return self.adj_buf[nr].resolution,
            ResState::Guessing => {
                // Recorded on every read: callers spot a guess by the list growing.
                self.dep_list.push(nr);
                return self.adj_buf[nr].resolution;
            }
            ResState::Unresolved => {}
        }

        let old_len = self.dep_list.len();

        // Pessimistic first guess.
        self.adj_buf[nr].state = ResState::Guessing;
        self.adj_buf[nr].resolution = false;
        let first = self.resolve_order(nr);

        if self.dep_list.len() == old_len {
            // No guess was consulted, so the result is final.
            if self.adj_buf[nr].state != ResState::Resolved {
                self.adj_buf[nr].state = ResState::Resolved;
                self.adj_buf[nr].resolution = first;
            }
            return self.adj_buf[nr].resolution;
        }

        if self.dep_list[old_len] != nr {
            // Part of a cycle that started further up.
            self.dep_list.push(nr);
            self.adj_buf[nr].resolution = first;
            return first;
        }

        // A cycle through `nr`: retry with the optimistic guess.
        self.reset_dependencies(old_len);
        self.adj_buf[nr].state = ResState::Guessing;
        self.adj_buf[nr].resolution = true;
        let second = self.resolve_order(nr);

        if first == second {
            self.reset_dependencies(old_len);
            self.adj_buf[nr].state = ResState::Resolved;
            self.adj_buf[nr].resolution = first;
            return first;
        }

        // Both guesses consistent, or neither.
        self.backup_rule(old_len, nr);
        self.adjudicate(nr)
    }

    fn reset_dependencies(&mut self, old_len: usize) {
        for k in self.dep_list.drain(old_len..) {
            self.adj_buf[k].state = ResState::Unresolved;
        }
    }

    /// Settles a cycle that guessing could not.
    fn backup_rule(&mut self, old_len: usize, nr: usize) {
        let mut cycle: Vec<usize> = self.dep_list.drain(old_len..).collect();
        if !cycle.contains(&nr) {
            cycle.push(nr);
        }
        cycle.sort_unstable();
        cycle.dedup();

        let has_convoy = cycle.iter().any(|&k| self.adj_buf[k].is_convoy());
        let all_moves = cycle.iter().all(|&k| self.adj_buf[k].is_move());

        if all_moves {
            debug!(orders = cycle.len(), "circular movement");
            for &k in &cycle {
                let ar = &mut self.adj_buf[k];
                ar.state = ResState::Resolved;
                ar.resolution = true;
            }
        } else if has_convoy {
            debug!(orders = cycle.len(), "convoy paradox");
            for &k in &cycle {
                let ar = &mut self.adj_buf[k];
                if ar.is_convoy() {
                    ar.state = ResState::Resolved;
                    ar.resolution = true;
                    ar.protected = true;
                } else {
                    ar.state = ResState::Unresolved;
                }
            }
        } else {
            debug!(orders = cycle.len(), "support cycle");
            for &k in &cycle {
                let ar = &mut self.adj_buf[k];
                if ar.is_support() {
                    ar.state = ResState::Resolved;
                    ar.resolution = false;
                } else {
                    ar.state = ResState::Unresolved;
                }
            }
        }
    }

    fn resolve_order(&mut self, nr: usize) -> bool {
        match self.adj_buf[nr].order {
            Order::Hold { .. } => true,
            Order::Move { .. } => self.resolve_move(nr),
            Order::SupportHold { .. } | Order::SupportMove { .. } => self.resolve_support(nr),
            Order::Convoy { .. } => self.resolve_convoy(nr),
            _ => false,
        }
    }

    /// Determines if a move order succeeds.
    fn resolve_move(&mut self, nr: usize) -> bool {
        let ar = self.adj_buf[nr];
        let Some(target) = ar.target else {
            return false;
        };
        if !self.path_ok(nr) {
            return false;
        }
        if let Some(j) = self.order_at(Some(target)) {
            if self.adj_buf[j].protected {
                return false;
            }
        }

        let attack = self.attack_strength(nr);
        match self.head_to_head(nr) {
            Some(j) => {
                if attack <= self.defend_strength(j) {
                    return false;
                }
            }
            None => {
                if attack <= self.hold_strength(target) {
                    return false;
                }
            }
        }

        // Every rival move into the same province must be weaker.
        for k in 0..self.adj_buf.len() {
            let other = self.adj_buf[k];
            if k == nr || !other.is_move() || other.target != Some(target) {
                continue;
            }
            if attack <= self.prevent_strength(k) {
                return false;
            }
        }
        true
    }

    /// Determines if support is given: not cut and not dislodged.
    fn resolve_support(&mut self, nr: usize) -> bool {
        let ar = self.adj_buf[nr];
        let n = self.adj_buf.len();

        for k in 0..n {
            let other = self.adj_buf[k];
            if !other.is_move() || other.target != Some(ar.prov) {
                continue;
            }
            // Support cannot be cut by a unit of the same power.
            if other.power == ar.power {
                continue;
            }
            // Nor by the unit in the province the support is directed at.
            if ar.aux_target == Some(other.prov) {
                continue;
            }
            // A convoyed attack cuts only if its convoy arrives.
            if self.path_ok(k) {
                return false;
            }
        }

        !self.is_dislodged(nr)
    }

    /// Determines if a convoy order succeeds (fleet is not dislodged).
    fn resolve_convoy(&mut self, nr: usize) -> bool {
        if self.adj_buf[nr].protected {
            return true;
        }
        !self.is_dislodged(nr)
    }

    fn is_dislodged(&mut self, nr: usize) -> bool {
        let prov = self.adj_buf[nr].prov;
        for k in 0..self.adj_buf.len() {
            let other = self.adj_buf[k];
            if other.is_move() && other.target == Some(prov) && self.adjudicate(k) {
                return true;
            }
        }
        false
    }

    /// Returns the opposing move if `nr` and another unit try to swap
    /// places without a convoy.
    fn head_to_head(&self, nr: usize) -> Option<usize> {
        let ar = self.adj_buf[nr];
        if !ar.is_move() || ar.via_convoy {
            return None;
        }
        let j = self.order_at(ar.target)?;
        let other = self.adj_buf[j];
        (other.is_move() && !other.via_convoy && other.target == Some(ar.prov)).then_some(j)
    }

    fn path_ok(&mut self, nr: usize) -> bool {
        !self.adj_buf[nr].via_convoy || self.has_convoy_path(nr)
    }

    /// Counts successful supports for move `nr`, skipping supports given by
    /// `excluded`.
    fn move_supports(&mut self, nr: usize, excluded: Option<Power>) -> u32 {
        let ar = self.adj_buf[nr];
        let mut count = 0;
        for k in 0..self.adj_buf.len() {
            let other = self.adj_buf[k];
            if other.void || !matches!(other.order, Order::SupportMove { .. }) {
                continue;
            }
            if other.aux_loc != Some(ar.prov) || other.aux_target != ar.target {
                continue;
            }
            if Some(other.power) == excluded {
                continue;
            }
            if self.adjudicate(k) {
                count += 1;
            }
        }
        count
    }

    /// Computes the attack strength of a move order.
    fn attack_strength(&mut self, nr: usize) -> u32 {
        let ar = self.adj_buf[nr];
        if !ar.is_move() || !self.path_ok(nr) {
            return 0;
        }
        let Some(j) = self.order_at(ar.target) else {
            return 1 + self.move_supports(nr, None);
        };
        let occupant = self.adj_buf[j];
        let swapping = self.head_to_head(nr).is_some();
        if occupant.is_move() && !swapping && self.adjudicate(j) {
            return 1 + self.move_supports(nr, None);
        }
        // A power may not dislodge its own unit, nor help dislodge one.
        if occupant.power == ar.power {
            return 0;
        }
        1 + self.move_supports(nr, Some(occupant.power))
    }

    /// Strength with which a unit in a head-to-head battle resists.
    fn defend_strength(&mut self, nr: usize) -> u32 {
        1 + self.move_supports(nr, None)
    }

    /// Strength with which move `nr` keeps others out of its target.
    fn prevent_strength(&mut self, nr: usize) -> u32 {
        if !self.adj_buf[nr].is_move() || !self.path_ok(nr) {
            return 0;
        }
        if let Some(j) = self.head_to_head(nr) {
            if self.adjudicate(j) {
                return 0;
            }
        }
        1 + self.move_supports(nr, None)
    }

    /// Computes the hold strength of a province.
    fn hold_strength(&mut self, prov: ProvinceId) -> u32 {
        let Some(nr) = self.order_at(Some(prov)) else {
            return 0;
        };
        if self.adj_buf[nr].is_move() {
            return if self.adjudicate(nr) { 0 } else { 1 };
        }
        let mut strength = 1;
        for k in 0..self.adj_buf.len() {
            let other = self.adj_buf[k];
            if other.void || !matches!(other.order, Order::SupportHold { .. }) {
                continue;
            }
            if other.aux_loc == Some(prov) && self.adjudicate(k) {
                strength += 1;
            }
        }
        strength
    }

    fn is_carrier(&self, k: usize, src: ProvinceId, dst: ProvinceId) -> bool {
        let c = self.adj_buf[k];
        c.is_convoy() && !c.void && c.aux_loc == Some(src) && c.aux_target == Some(dst)
    }

    /// Checks if a chain of successful convoys carries move `nr`.
    fn has_convoy_path(&mut self, nr: usize) -> bool {
        let ar = self.adj_buf[nr];
        let Some(dst) = ar.target else {
            return false;
        };
        let src = ar.prov;
        let n = self.adj_buf.len();
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();

        for k in 0..n {
            if !self.is_carrier(k, src, dst) || !self.map.fleet_borders(src, self.adj_buf[k].prov) {
                continue;
            }
            if self.adjudicate(k) {
                visited[k] = true;
                queue.push_back(k);
            }
        }

        while let Some(current) = queue.pop_front() {
            let here = self.adj_buf[current].prov;
            if self.map.fleet_borders(here, dst) {
                return true;
            }
            for k in 0..n {
                if visited[k] || !self.is_carrier(k, src, dst) {
                    continue;
                }
                if self.map.fleet_borders(here, self.adj_buf[k].prov) && self.adjudicate(k) {
                    visited[k] = true;
                    queue.push_back(k);
                }
            }
        }
        false
    }

    /// Converts internal adjudication state to the external result format.
    fn build_results(&mut self, position: &Position) -> MovementResolution {
        let n = self.adj_buf.len();
        let mut entered: Vec<Option<usize>> = vec![None; self.lookup.len()];
        for (i, ar) in self.adj_buf.iter().enumerate() {
            if !ar.is_move() || !ar.resolution {
                continue;
            }
            if let Some(t) = ar.target {
                entered[t.index()] = Some(i);
            }
        }

        let mut results = Vec::with_capacity(n);
        let mut dislodged = Vec::new();
        let mut contested = Vec::new();

        for i in 0..n {
            let ar = self.adj_buf[i];
            let outcome = match ar.order {
                Order::Move { .. } if ar.resolution => OrderOutcome::Succeeded,
                Order::Move { .. } => {
                    let protected = self.order_at(ar.target).is_some_and(|j| self.adj_buf[j].protected);
                    if !self.path_ok(i) {
                        OrderOutcome::NoConvoy
                    } else {
                        // Losing a head-to-head battle is no standoff in the
                        // province the winner left.
                        let lost_swap = self.head_to_head(i).is_some_and(|j| self.adj_buf[j].resolution);
                        if let Some(t) = ar.target.filter(|t| !lost_swap && entered[t.index()].is_none()) {
                            contested.push(t);
                        }
                        if protected {
                            OrderOutcome::ParadoxHeld
                        } else {
                            OrderOutcome::Bounced
                        }
                    }
                }
                Order::SupportHold { .. } | Order::SupportMove { .. } => {
                    if ar.void {
                        OrderOutcome::Void
                    } else if ar.resolution {
                        OrderOutcome::Succeeded
                    } else {
                        OrderOutcome::Cut
                    }
                }
                Order::Convoy { .. } => {
                    if ar.void {
                        OrderOutcome::Void
                    } else if ar.resolution {
                        OrderOutcome::Succeeded
                    } else {
                        OrderOutcome::Disrupted
                    }
                }
                _ => OrderOutcome::Succeeded,
            };

            let moved_away = ar.is_move() && ar.resolution;
            let attacker = if moved_away { None } else { entered[ar.prov.index()] };
            let mut result = OrderResult::new(ar.power, ar.order, outcome);
            if let Some(k) = attacker {
                let from = self.adj_buf[k].prov;
                result.dislodged_by = Some(from);
                if let Some(unit) = position.unit_at(ar.prov) {
                    dislodged.push(Dislodgement {
                        unit: *unit,
                        attacker_from: from,
                        by_convoy: self.adj_buf[k].via_convoy,
                    });
                }
            }
            results.push(result);
        }

        contested.sort_unstable();
        contested.dedup();
        debug!(
            orders = n,
            dislodged = dislodged.len(),
            calls = self.calls,
            "movement resolved"
        );
        MovementResolution { results, dislodged, contested }
    }
}

/// Extracts the target and auxiliary provinces of an order.
fn order_indices(order: &Order) -> (Option<ProvinceId>, Option<ProvinceId>, Option<ProvinceId>) {
    match *order {
        Order::Move { dest, .. } => (Some(dest.province), None, None),
        Order::SupportHold { supported, .. } => (None, Some(supported.location.province), None),
        Order::SupportMove { supported, dest, .. } => {
            (None, Some(supported.location.province), Some(dest.province))
        }
        Order::Convoy { convoyed_from, convoyed_to, .. } => {
            (None, Some(convoyed_from.province), Some(convoyed_to.province))
        }
        _ => (None, None, None),
    }
}

/// Applies a movement resolution to the position.
///
/// Dislodged units leave the board first, then every successful mover is
/// lifted and placed at its destination, so chains and rings of moves never
/// collide. Each dislodged unit is recorded with the locations it may retreat
/// to: adjacent, empty, not a standoff, and not the attacker's origin unless
/// the attack was convoyed.
pub fn apply_resolution(
    map: &MapTopology,
    position: &mut Position,
    resolution: &MovementResolution,
) -> Result<(), AdjudicationError> {
    for d in &resolution.dislodged {
        position.remove_unit(d.unit.location.province);
    }

    let mut lifted = Vec::new();
    for r in &resolution.results {
        if r.outcome != OrderOutcome::Succeeded {
            continue;
        }
        if let Order::Move { unit, dest, .. } = r.order {
            if let Some(u) = position.remove_unit(unit.location.province) {
                lifted.push((u, dest));
            }
        }
    }
    for (mut unit, dest) in lifted {
        unit.location = dest;
        position.insert_unit(unit)?;
    }

    for d in &resolution.dislodged {
        let retreats = map
            .destinations(d.unit.location, d.unit.unit_type)
            .into_iter()
            .filter(|loc| {
                let p = loc.province;
                position.unit_at(p).is_none()
                    && !resolution.contested.contains(&p)
                    && (d.by_convoy || p != d.attacker_from)
            })
            .collect();
        position.set_dislodged(DislodgedUnit {
            unit: d.unit,
            attacker_from: d.attacker_from,
            retreats,
        })?;
    }
    Ok(())
}

/// Convenience function that creates a resolver and resolves one set of orders.
pub fn resolve_orders(
    map: &MapTopology,
    orders: &[(Order, Power)],
    position: &Position,
) -> Result<MovementResolution, AdjudicationError> {
    Resolver::new(map).resolve(orders, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::order::Location;
    use crate::board::province::Coast;
    use crate::board::standard::{standard_map, AUSTRIA, ENGLAND, FRANCE, GERMANY, RUSSIA, TURKEY};

    struct Board {
        map: MapTopology,
        position: Position,
        orders: Vec<(Order, Power)>,
    }

    impl Board {
        fn new() -> Self {
            let map = standard_map();
            let position = Position::new(&map);
            Board { map, position, orders: Vec::new() }
        }

        fn loc(&self, s: &str) -> Location {
            let (abbr, coast) = s.split_once('/').unwrap_or((s, ""));
            Location::with_coast(self.map.province(abbr).unwrap(), Coast::from_abbr(coast).unwrap())
        }

        fn prov(&self, s: &str) -> ProvinceId {
            self.loc(s).province
        }

        fn unit(&mut self, power: Power, unit_type: UnitType, at: &str) -> OrderUnit {
            let location = self.loc(at);
            self.position.place_unit(&self.map, location, power, unit_type).unwrap();
            OrderUnit { unit_type, location }
        }

        fn army(&mut self, power: Power, at: &str) -> OrderUnit {
            self.unit(power, UnitType::Army, at)
        }

        fn fleet(&mut self, power: Power, at: &str) -> OrderUnit {
            self.unit(power, UnitType::Fleet, at)
        }

        fn mv(&mut self, power: Power, unit: OrderUnit, to: &str) {
            let dest = self.loc(to);
            self.orders.push((Order::Move { unit, dest, via_convoy: false }, power));
        }

        fn support_move(&mut self, power: Power, unit: OrderUnit, supported: OrderUnit, to: &str) {
            let dest = self.loc(to);
            self.orders.push((Order::SupportMove { unit, supported, dest }, power));
        }

        fn support_hold(&mut self, power: Power, unit: OrderUnit, supported: OrderUnit) {
            self.orders.push((Order::SupportHold { unit, supported }, power));
        }

        fn convoy(&mut self, power: Power, unit: OrderUnit, from: &str, to: &str) {
            let (convoyed_from, convoyed_to) = (self.loc(from), self.loc(to));
            self.orders.push((Order::Convoy { unit, convoyed_from, convoyed_to }, power));
        }

        fn resolve(&self) -> MovementResolution {
            resolve_orders(&self.map, &self.orders, &self.position).unwrap()
        }

        fn outcome(&self, res: &MovementResolution, at: &str) -> OrderOutcome {
            let p = self.prov(at);
            res.results.iter().find(|r| r.order.province() == Some(p)).unwrap().outcome
        }

        fn dislodged_by(&self, res: &MovementResolution, at: &str) -> Option<ProvinceId> {
            let p = self.prov(at);
            res.results.iter().find(|r| r.order.province() == Some(p)).unwrap().dislodged_by
        }
    }

    #[test]
    fn unordered_unit_holds() {
        let mut b = Board::new();
        b.army(AUSTRIA, "vie");
        let res = b.resolve();
        assert_eq!(res.results.len(), 1);
        assert!(matches!(res.results[0].order, Order::Hold { .. }));
        assert_eq!(res.results[0].outcome, OrderOutcome::Succeeded);
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn move_bounces_against_hold() {
        let mut b = Board::new();
        let vie = b.army(AUSTRIA, "vie");
        b.army(RUSSIA, "bud");
        b.mv(AUSTRIA, vie, "bud");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "vie"), OrderOutcome::Bounced);
        assert_eq!(b.outcome(&res, "bud"), OrderOutcome::Succeeded);
        assert_eq!(res.contested, vec![b.prov("bud")]);
    }

    #[test]
    fn supported_attack_dislodges() {
        let mut b = Board::new();
        let tyr = b.army(AUSTRIA, "tyr");
        let tri = b.army(AUSTRIA, "tri");
        b.army(crate::board::standard::ITALY, "ven");
        b.mv(AUSTRIA, tyr, "ven");
        b.support_move(AUSTRIA, tri, tyr, "ven");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "tyr"), OrderOutcome::Succeeded);
        assert_eq!(b.dislodged_by(&res, "ven"), Some(b.prov("tyr")));
        assert_eq!(res.dislodged.len(), 1);
        assert_eq!(res.dislodged[0].unit.location, b.loc("ven"));
    }

    #[test]
    fn cannot_dislodge_own_unit() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let sil = b.army(GERMANY, "sil");
        b.army(GERMANY, "mun");
        b.mv(GERMANY, ber, "mun");
        b.support_move(GERMANY, sil, ber, "mun");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Bounced);
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn foreign_support_does_not_dislodge_own_unit() {
        let mut b = Board::new();
        let ber = b.army(RUSSIA, "ber");
        let sil = b.army(GERMANY, "sil");
        b.army(GERMANY, "mun");
        b.mv(RUSSIA, ber, "mun");
        b.support_move(GERMANY, sil, ber, "mun");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Bounced);
        assert_eq!(b.outcome(&res, "sil"), OrderOutcome::Succeeded);
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn move_cuts_support() {
        let mut b = Board::new();
        let mun = b.army(GERMANY, "mun");
        let ber = b.army(GERMANY, "ber");
        let tyr = b.army(AUSTRIA, "tyr");
        let boh = b.army(AUSTRIA, "boh");
        let pru = b.army(RUSSIA, "pru");
        b.orders.push((Order::Hold { unit: mun }, GERMANY));
        b.support_hold(GERMANY, ber, mun);
        b.mv(AUSTRIA, tyr, "mun");
        b.support_move(AUSTRIA, boh, tyr, "mun");
        b.mv(RUSSIA, pru, "ber");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Cut);
        assert_eq!(b.outcome(&res, "pru"), OrderOutcome::Bounced);
        assert_eq!(b.outcome(&res, "tyr"), OrderOutcome::Succeeded);
        assert_eq!(b.dislodged_by(&res, "mun"), Some(b.prov("tyr")));
    }

    #[test]
    fn support_not_cut_by_its_target() {
        let mut b = Board::new();
        let war = b.army(RUSSIA, "war");
        let pru = b.army(RUSSIA, "pru");
        let sil = b.army(GERMANY, "sil");
        b.mv(RUSSIA, war, "sil");
        b.support_move(RUSSIA, pru, war, "sil");
        b.mv(GERMANY, sil, "pru");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "pru"), OrderOutcome::Succeeded);
        assert_eq!(b.outcome(&res, "war"), OrderOutcome::Succeeded);
        assert_eq!(b.dislodged_by(&res, "sil"), Some(b.prov("war")));
    }

    #[test]
    fn support_hold_for_moving_unit_is_void() {
        let mut b = Board::new();
        let vie = b.army(AUSTRIA, "vie");
        let bud = b.army(AUSTRIA, "bud");
        b.mv(AUSTRIA, vie, "gal");
        b.support_hold(AUSTRIA, bud, vie);
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "bud"), OrderOutcome::Void);
        assert_eq!(b.outcome(&res, "vie"), OrderOutcome::Succeeded);
    }

    #[test]
    fn three_army_circular_movement() {
        let mut b = Board::new();
        let ank = b.fleet(TURKEY, "ank");
        let con = b.army(TURKEY, "con");
        let smy = b.army(TURKEY, "smy");
        b.mv(TURKEY, ank, "con");
        b.mv(TURKEY, con, "smy");
        b.mv(TURKEY, smy, "ank");
        let res = b.resolve();
        for p in ["ank", "con", "smy"] {
            assert_eq!(b.outcome(&res, p), OrderOutcome::Succeeded);
        }
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn circular_movement_blocked_by_outside_attack() {
        let mut b = Board::new();
        let ank = b.fleet(TURKEY, "ank");
        let con = b.army(TURKEY, "con");
        let smy = b.army(TURKEY, "smy");
        let bul = b.army(RUSSIA, "bul");
        b.mv(TURKEY, ank, "con");
        b.mv(TURKEY, con, "smy");
        b.mv(TURKEY, smy, "ank");
        b.mv(RUSSIA, bul, "con");
        let res = b.resolve();
        for p in ["ank", "con", "smy", "bul"] {
            assert_eq!(b.outcome(&res, p), OrderOutcome::Bounced);
        }
    }

    #[test]
    fn no_swap_without_convoy() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let pru = b.army(RUSSIA, "pru");
        b.mv(GERMANY, ber, "pru");
        b.mv(RUSSIA, pru, "ber");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Bounced);
        assert_eq!(b.outcome(&res, "pru"), OrderOutcome::Bounced);
    }

    #[test]
    fn supported_head_to_head() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let sil = b.army(GERMANY, "sil");
        let pru = b.army(RUSSIA, "pru");
        b.mv(GERMANY, ber, "pru");
        b.support_move(GERMANY, sil, ber, "pru");
        b.mv(RUSSIA, pru, "ber");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Succeeded);
        assert_eq!(b.outcome(&res, "pru"), OrderOutcome::Bounced);
        assert_eq!(b.dislodged_by(&res, "pru"), Some(b.prov("ber")));
    }

    #[test]
    fn beleaguered_garrison() {
        let mut b = Board::new();
        b.army(GERMANY, "mun");
        let boh = b.army(AUSTRIA, "boh");
        let tyr = b.army(AUSTRIA, "tyr");
        let sil = b.army(RUSSIA, "sil");
        let ber = b.army(RUSSIA, "ber");
        b.mv(AUSTRIA, boh, "mun");
        b.support_move(AUSTRIA, tyr, boh, "mun");
        b.mv(RUSSIA, sil, "mun");
        b.support_move(RUSSIA, ber, sil, "mun");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "boh"), OrderOutcome::Bounced);
        assert_eq!(b.outcome(&res, "sil"), OrderOutcome::Bounced);
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn simple_convoy() {
        let mut b = Board::new();
        let yor = b.army(ENGLAND, "yor");
        let nth = b.fleet(ENGLAND, "nth");
        b.mv(ENGLAND, yor, "nwy");
        b.convoy(ENGLAND, nth, "yor", "nwy");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "yor"), OrderOutcome::Succeeded);
        assert_eq!(b.outcome(&res, "nth"), OrderOutcome::Succeeded);
    }

    #[test]
    fn disrupted_convoy() {
        let mut b = Board::new();
        let yor = b.army(ENGLAND, "yor");
        let nth = b.fleet(ENGLAND, "nth");
        let hel = b.fleet(GERMANY, "hel");
        let den = b.fleet(GERMANY, "den");
        b.mv(ENGLAND, yor, "nwy");
        b.convoy(ENGLAND, nth, "yor", "nwy");
        b.mv(GERMANY, hel, "nth");
        b.support_move(GERMANY, den, hel, "nth");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "nth"), OrderOutcome::Disrupted);
        assert_eq!(b.outcome(&res, "yor"), OrderOutcome::NoConvoy);
        assert_eq!(b.dislodged_by(&res, "nth"), Some(b.prov("hel")));
    }

    #[test]
    fn convoy_without_matching_move_is_void() {
        let mut b = Board::new();
        b.army(ENGLAND, "yor");
        let nth = b.fleet(ENGLAND, "nth");
        b.convoy(ENGLAND, nth, "yor", "nwy");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "nth"), OrderOutcome::Void);
    }

    #[test]
    fn convoy_paradox_protects_fleet() {
        let mut b = Board::new();
        let lon = b.fleet(ENGLAND, "lon");
        let wal = b.fleet(ENGLAND, "wal");
        let bre = b.army(FRANCE, "bre");
        let eng = b.fleet(FRANCE, "eng");
        b.support_move(ENGLAND, lon, wal, "eng");
        b.mv(ENGLAND, wal, "eng");
        b.mv(FRANCE, bre, "lon");
        b.convoy(FRANCE, eng, "bre", "lon");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "eng"), OrderOutcome::Succeeded);
        assert_eq!(b.outcome(&res, "wal"), OrderOutcome::ParadoxHeld);
        assert_eq!(b.outcome(&res, "lon"), OrderOutcome::Cut);
        assert_eq!(b.outcome(&res, "bre"), OrderOutcome::Bounced);
        assert!(res.dislodged.is_empty());
    }

    #[test]
    fn convoyed_attack_lands_once_paradox_settles() {
        let mut b = Board::new();
        let lon = b.fleet(ENGLAND, "lon");
        let wal = b.fleet(ENGLAND, "wal");
        let bre = b.army(FRANCE, "bre");
        let eng = b.fleet(FRANCE, "eng");
        let yor = b.fleet(FRANCE, "yor");
        let nth = b.fleet(GERMANY, "nth");
        let bel = b.fleet(GERMANY, "bel");
        b.support_move(ENGLAND, lon, wal, "eng");
        b.mv(ENGLAND, wal, "eng");
        b.mv(FRANCE, bre, "lon");
        b.convoy(FRANCE, eng, "bre", "lon");
        b.support_move(FRANCE, yor, bre, "lon");
        b.support_move(GERMANY, nth, bel, "eng");
        b.mv(GERMANY, bel, "eng");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "eng"), OrderOutcome::Succeeded);
        assert_eq!(b.outcome(&res, "wal"), OrderOutcome::ParadoxHeld);
        assert_eq!(b.outcome(&res, "bel"), OrderOutcome::ParadoxHeld);
        assert_eq!(b.outcome(&res, "bre"), OrderOutcome::Succeeded);
        assert_eq!(b.dislodged_by(&res, "lon"), Some(b.prov("bre")));
        assert!(res.dislodged.iter().all(|d| d.unit.location.province != b.prov("eng")));
    }

    #[test]
    fn support_cycle_backup_cuts_supports() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let mun = b.army(GERMANY, "mun");
        b.support_hold(GERMANY, ber, mun);
        b.support_hold(GERMANY, mun, ber);
        let mut resolver = Resolver::new(&b.map);
        resolver.init(&b.orders, &b.position);
        let i = resolver.order_at(Some(b.prov("ber"))).unwrap();
        let j = resolver.order_at(Some(b.prov("mun"))).unwrap();
        resolver.adj_buf[i].state = ResState::Guessing;
        resolver.adj_buf[j].state = ResState::Guessing;
        resolver.dep_list = vec![i, j];
        resolver.backup_rule(0, i);
        assert!(resolver.dep_list.is_empty());
        for k in [i, j] {
            assert_eq!(resolver.adj_buf[k].state, ResState::Resolved);
            assert!(!resolver.adj_buf[k].resolution);
        }
    }

    #[test]
    fn submission_order_does_not_matter() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let sil = b.army(GERMANY, "sil");
        let pru = b.army(RUSSIA, "pru");
        let war = b.army(RUSSIA, "war");
        b.mv(GERMANY, ber, "pru");
        b.support_move(GERMANY, sil, ber, "pru");
        b.mv(RUSSIA, pru, "sil");
        b.support_move(RUSSIA, war, pru, "sil");
        let forward = b.resolve();
        b.orders.reverse();
        assert_eq!(b.resolve(), forward);
    }

    #[test]
    fn apply_resolution_moves_and_dislodges() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let sil = b.army(GERMANY, "sil");
        b.army(RUSSIA, "pru");
        let gal = b.army(AUSTRIA, "gal");
        let ukr = b.army(RUSSIA, "ukr");
        b.mv(GERMANY, ber, "pru");
        b.support_move(GERMANY, sil, ber, "pru");
        b.mv(AUSTRIA, gal, "war");
        b.mv(RUSSIA, ukr, "war");
        let res = b.resolve();
        assert_eq!(res.contested, vec![b.prov("war")]);

        let mut position = b.position.clone();
        apply_resolution(&b.map, &mut position, &res).unwrap();
        assert_eq!(position.unit_at(b.prov("pru")).map(|u| u.power), Some(GERMANY));
        assert!(position.unit_at(b.prov("ber")).is_none());
        assert!(position.unit_at(b.prov("war")).is_none());
        let d = position.dislodged_at(b.prov("pru")).unwrap();
        assert_eq!(d.attacker_from, b.prov("ber"));
        // Berlin is the attacker's origin, Warsaw a standoff, Silesia occupied.
        assert_eq!(d.retreats, vec![b.loc("lvn")]);
    }

    #[test]
    fn lost_head_to_head_is_not_a_standoff() {
        let mut b = Board::new();
        let pru = b.army(RUSSIA, "pru");
        let ber = b.army(GERMANY, "ber");
        let sil = b.army(GERMANY, "sil");
        let bur = b.army(FRANCE, "bur");
        let ruh = b.army(FRANCE, "ruh");
        b.army(AUSTRIA, "mun");
        b.mv(RUSSIA, pru, "ber");
        b.mv(GERMANY, ber, "pru");
        b.support_move(GERMANY, sil, ber, "pru");
        b.mv(FRANCE, bur, "mun");
        b.support_move(FRANCE, ruh, bur, "mun");
        let res = b.resolve();
        assert_eq!(b.dislodged_by(&res, "pru"), Some(b.prov("ber")));
        assert_eq!(b.dislodged_by(&res, "mun"), Some(b.prov("bur")));
        assert!(res.contested.is_empty());

        let mut position = b.position.clone();
        apply_resolution(&b.map, &mut position, &res).unwrap();
        assert!(position.unit_at(b.prov("ber")).is_none());
        let mun = position.dislodged_at(b.prov("mun")).unwrap();
        assert_eq!(mun.retreats, vec![b.loc("ber"), b.loc("boh"), b.loc("kie"), b.loc("tyr")]);
    }

    #[test]
    fn standoff_in_vacated_province_still_counts() {
        let mut b = Board::new();
        let ber = b.army(GERMANY, "ber");
        let pru = b.army(RUSSIA, "pru");
        let sil = b.army(AUSTRIA, "sil");
        b.mv(GERMANY, ber, "kie");
        b.mv(RUSSIA, pru, "ber");
        b.mv(AUSTRIA, sil, "ber");
        let res = b.resolve();
        assert_eq!(b.outcome(&res, "ber"), OrderOutcome::Succeeded);
        assert_eq!(res.contested, vec![b.prov("ber")]);
    }
}
