//! Turn and phase controller.
//!
//! A game is a chain of turns. Each `TurnState` collects orders while its
//! phase is open; `Judge::adjudicate` turns it into an immutable
//! `ResolvedTurn`, and `Judge::advance_phase` opens the successor. `Game`
//! holds the one mutable handle and the resolved history.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::map::MapTopology;
use crate::board::order::Order;
use crate::board::province::{Power, ProvinceId};
use crate::board::standard::{opening_position, standard_map};
use crate::board::state::{Phase, PhaseKind, Position, StateError};
use crate::board::unit::Unit;
use crate::board::validate::{check_submission, validate_order, ValidationError};
use crate::config::Rules;
use crate::resolve::{
    apply_adjustments, apply_resolution, apply_retreats, check_game_end, eliminations, next_phase,
    ownership_due, resolve_adjustments, resolve_retreats, update_sc_ownership, AdjudicationError,
    GameOutcome, Resolver,
};
use crate::results::{DisbandReason, GameEvent, OrderOutcome, OrderResult, ResultLog};

/// Errors surfaced by the game controller.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("the game has ended")]
    GameEnded,

    #[error("orders rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Adjudication(#[from] AdjudicationError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// An open phase: the starting position and the orders submitted so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    phase: Phase,
    position: Position,
    orders: BTreeMap<Power, Vec<Order>>,
}

impl TurnState {
    pub fn new(phase: Phase, position: Position) -> Self {
        TurnState { phase, position, orders: BTreeMap::new() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Orders currently stored for `power`.
    pub fn orders_of(&self, power: Power) -> &[Order] {
        self.orders.get(&power).map_or(&[], Vec::as_slice)
    }

    /// All stored orders, grouped by power.
    pub fn orders(&self) -> impl Iterator<Item = (Power, &Order)> + '_ {
        self.orders
            .iter()
            .flat_map(|(power, orders)| orders.iter().map(move |o| (*power, o)))
    }

    /// Replaces `power`'s orders for this phase.
    ///
    /// Only whole-submission problems are rejected here; a single illegal
    /// order is kept and degrades when the phase is adjudicated.
    pub fn submit_orders(&mut self, power: Power, orders: Vec<Order>) -> Result<(), ValidationError> {
        check_submission(&self.position, self.phase.kind, power, &orders)?;
        self.orders.insert(power, orders);
        Ok(())
    }
}

/// A phase after adjudication. Never modified once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTurn {
    pub phase: Phase,
    /// Position the phase started from.
    pub position_before: Position,
    /// Orders as submitted, grouped by power.
    pub orders: BTreeMap<Power, Vec<Order>>,
    pub results: ResultLog,
    /// Position after the phase, including any units awaiting retreat.
    pub position: Position,
    /// Set when this phase ended the game.
    pub outcome: Option<GameOutcome>,
}

impl ResolvedTurn {
    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }
}

/// What follows a resolved phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(TurnState),
    Ended(GameOutcome),
}

/// Adjudicates phases of games played on one map under one set of rules.
#[derive(Debug, Clone)]
pub struct Judge {
    map: Arc<MapTopology>,
    rules: Rules,
}

impl Judge {
    pub fn new(map: Arc<MapTopology>, rules: Rules) -> Self {
        Judge { map, rules }
    }

    pub fn map(&self) -> &MapTopology {
        &self.map
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Resolves every order of an open phase.
    ///
    /// Each order is validated first. A movement order that fails
    /// validation leaves its unit holding, a retreat order leaves its unit
    /// to disband and an adjustment order simply does not happen; in every
    /// case the order is logged with an `Invalid` outcome.
    pub fn adjudicate(&self, turn: TurnState) -> Result<ResolvedTurn, AdjudicationError> {
        let TurnState { phase, position: before, orders } = turn;
        let map = &*self.map;

        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for (&power, submitted) in &orders {
            for order in submitted {
                match validate_order(map, &before, phase.kind, power, order) {
                    Ok(normalized) => valid.push((normalized, power)),
                    Err(err) => {
                        debug!(power = power.index(), ?order, %err, "invalid order");
                        invalid.push((power, *order, err));
                    }
                }
            }
        }

        let mut position = before.clone();
        let mut log = ResultLog::new();
        let mut results = match phase.kind {
            PhaseKind::Movement => {
                let resolution = Resolver::new(map).resolve(&valid, &before)?;
                apply_resolution(map, &mut position, &resolution)?;
                disband_trapped_units(&mut position, &mut log);
                resolution.results
            }
            PhaseKind::Retreat => {
                let resolution = resolve_retreats(&valid, &before);
                apply_retreats(&mut position, &resolution.results)?;
                for unit in resolution.unordered {
                    log.push_event(GameEvent::Disbanded { unit, reason: DisbandReason::Unordered });
                }
                resolution.results
            }
            PhaseKind::Adjustment => {
                let resolution = resolve_adjustments(map, &valid, &before);
                apply_adjustments(&mut position, map, &resolution)?;
                for &unit in &resolution.civil_disorder {
                    log.push_event(GameEvent::Disbanded { unit, reason: DisbandReason::CivilDisorder });
                }
                resolution.results
            }
        };
        record_invalid(&mut results, &invalid);
        for result in results {
            log.push_order(result);
        }

        if ownership_due(phase, position.has_dislodged()) {
            for event in update_sc_ownership(map, &mut position) {
                log.push_event(event);
            }
        }
        for event in eliminations(map, &before, &position) {
            log.push_event(event);
        }

        let outcome = if phase.kind == PhaseKind::Adjustment {
            check_game_end(map, &position, &self.rules, phase.year)
        } else {
            None
        };
        if let Some(outcome) = &outcome {
            info!(%phase, ?outcome, "game over");
            log.push_event(outcome.to_event());
        }

        info!(%phase, orders = valid.len(), invalid = invalid.len(), results = log.len(), "adjudicated");
        Ok(ResolvedTurn { phase, position_before: before, orders, results: log, position, outcome })
    }

    /// Opens the phase that follows `resolved`, or reports how the game ended.
    pub fn advance_phase(&self, resolved: &ResolvedTurn) -> Advance {
        if let Some(outcome) = &resolved.outcome {
            return Advance::Ended(outcome.clone());
        }
        let next = next_phase(resolved.phase, resolved.position.has_dislodged());
        info!(from = %resolved.phase, to = %next, "phase advanced");
        Advance::Next(TurnState::new(next, resolved.position.clone()))
    }

    /// Builds (positive) or disbands (negative) owed by each power.
    pub fn adjustments(&self, position: &Position) -> Vec<(Power, i32)> {
        self.map.powers().map(|p| (p, position.adjustment(p))).collect()
    }
}

/// Logs every dislodgement and removes units that have nowhere to retreat.
fn disband_trapped_units(position: &mut Position, log: &mut ResultLog) {
    let dislodged: Vec<_> = position.dislodged().cloned().collect();
    for d in dislodged {
        log.push_event(GameEvent::Dislodged {
            unit: d.unit,
            attacker_from: d.attacker_from,
            retreats: d.retreats.clone(),
        });
        if d.retreats.is_empty() {
            position.remove_dislodged(d.unit.location.province);
            log.push_event(GameEvent::Disbanded { unit: d.unit, reason: DisbandReason::NoRetreat });
        }
    }
}

/// Attaches invalid orders to the results, replacing the implicit order
/// the unit was adjudicated with.
fn record_invalid(results: &mut Vec<OrderResult>, invalid: &[(Power, Order, ValidationError)]) {
    for &(power, order, err) in invalid {
        let existing = order
            .province()
            .and_then(|p| results.iter_mut().find(|r| r.power == power && r.order.province() == Some(p)));
        match existing {
            Some(r) => {
                r.order = order;
                r.outcome = OrderOutcome::Invalid(err);
            }
            None => results.push(OrderResult::new(power, order, OrderOutcome::Invalid(err))),
        }
    }
}

/// A game in progress: the open phase plus everything already resolved.
#[derive(Debug, Clone)]
pub struct Game {
    judge: Judge,
    current: TurnState,
    history: Vec<ResolvedTurn>,
    outcome: Option<GameOutcome>,
}

impl Game {
    pub fn new(map: Arc<MapTopology>, rules: Rules, phase: Phase, position: Position) -> Self {
        Game {
            judge: Judge::new(map, rules),
            current: TurnState::new(phase, position),
            history: Vec::new(),
            outcome: None,
        }
    }

    /// Starts a game on the standard map from the Spring 1901 position.
    pub fn standard(rules: Rules) -> Result<Self, StateError> {
        let map = Arc::new(standard_map());
        let position = opening_position(&map)?;
        Ok(Game::new(map, rules, Phase::spring(1901), position))
    }

    pub fn map(&self) -> &MapTopology {
        self.judge.map()
    }

    pub fn rules(&self) -> &Rules {
        self.judge.rules()
    }

    /// Changes the rules from the next adjudicated phase on.
    pub fn set_rules(&mut self, rules: Rules) {
        self.judge.rules = rules;
    }

    /// Replaces `power`'s orders for the open phase.
    pub fn submit_orders(&mut self, power: Power, orders: Vec<Order>) -> Result<(), GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameEnded);
        }
        self.current.submit_orders(power, orders).map_err(|err| {
            warn!(power = power.index(), phase = %self.current.phase, %err, "orders rejected");
            GameError::from(err)
        })
    }

    /// Adjudicates the open phase and opens the next one.
    pub fn process(&mut self) -> Result<&ResolvedTurn, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameEnded);
        }
        let resolved = self.judge.adjudicate(self.current.clone())?;
        match self.judge.advance_phase(&resolved) {
            Advance::Next(turn) => self.current = turn,
            Advance::Ended(outcome) => self.outcome = Some(outcome),
        }
        let idx = self.history.len();
        self.history.push(resolved);
        Ok(&self.history[idx])
    }

    /// The open phase. After the game ends this is the phase that ended it.
    pub fn phase(&self) -> Phase {
        self.current.phase
    }

    pub fn current(&self) -> &TurnState {
        &self.current
    }

    /// The latest position: the open phase's, or the final one once ended.
    pub fn position(&self) -> &Position {
        match (&self.outcome, self.history.last()) {
            (Some(_), Some(last)) => &last.position,
            _ => &self.current.position,
        }
    }

    pub fn history(&self) -> &[ResolvedTurn] {
        &self.history
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    /// Results of the most recently adjudicated phase.
    pub fn last_results(&self) -> Option<&ResultLog> {
        self.history.last().map(|t| &t.results)
    }

    pub fn unit_count(&self, power: Power) -> usize {
        self.position().unit_count(power)
    }

    pub fn supply_center_count(&self, power: Power) -> usize {
        self.position().supply_center_count(power)
    }

    pub fn occupant(&self, province: ProvinceId) -> Option<&Unit> {
        self.position().unit_at(province)
    }

    pub fn owner(&self, province: ProvinceId) -> Option<Power> {
        self.position().sc_owner(province)
    }

    /// Builds (positive) or disbands (negative) owed by each power.
    pub fn adjustments(&self) -> Vec<(Power, i32)> {
        self.judge.adjustments(self.position())
    }
}

/// Adjudicates the open phase of every game in parallel.
///
/// Games share nothing mutable, so each runs on its own worker. Returns the
/// phase each game resolved, in input order.
pub fn process_many(games: &mut [Game]) -> Vec<Result<Phase, GameError>> {
    games
        .par_iter_mut()
        .map(|game| game.process().map(|resolved| resolved.phase))
        .collect()
}
