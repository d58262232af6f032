//! Phase sequencing logic.
//!
//! Determines the next phase in the game year, updates supply-center
//! ownership at the end of the Fall turn, and decides when the game ends.

use serde::{Deserialize, Serialize};

use crate::board::map::MapTopology;
use crate::board::province::Power;
use crate::board::state::{Phase, PhaseKind, Position, Season};
use crate::config::Rules;
use crate::results::GameEvent;

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Victory { power: Power, centers: usize },
    Draw { survivors: Vec<Power> },
}

impl GameOutcome {
    pub fn to_event(&self) -> GameEvent {
        match self {
            GameOutcome::Victory { power, centers } => GameEvent::Victory { power: *power, centers: *centers },
            GameOutcome::Draw { survivors } => GameEvent::Draw { survivors: survivors.clone() },
        }
    }
}

/// Computes the phase that follows `phase`.
///
/// Phase flow:
/// - Spring Movement -> Spring Retreat (if dislodged) OR Fall Movement
/// - Spring Retreat  -> Fall Movement
/// - Fall Movement   -> Fall Retreat (if dislodged) OR Fall Adjustment
/// - Fall Retreat    -> Fall Adjustment
/// - Fall Adjustment -> Spring Movement (next year)
pub fn next_phase(phase: Phase, has_dislodged: bool) -> Phase {
    match phase.kind {
        PhaseKind::Movement if has_dislodged => Phase::new(phase.year, phase.season, PhaseKind::Retreat),
        PhaseKind::Movement | PhaseKind::Retreat => after_movement(phase),
        PhaseKind::Adjustment => Phase::spring(phase.year + 1),
    }
}

fn after_movement(phase: Phase) -> Phase {
    match phase.season {
        Season::Spring => Phase::new(phase.year, Season::Fall, PhaseKind::Movement),
        Season::Fall => Phase::new(phase.year, Season::Fall, PhaseKind::Adjustment),
    }
}

/// Returns true if supply-center ownership changes at the end of `phase`:
/// after Fall Movement with no retreats to follow, or after Fall Retreat.
pub fn ownership_due(phase: Phase, has_dislodged: bool) -> bool {
    phase.season == Season::Fall
        && match phase.kind {
            PhaseKind::Movement => !has_dislodged,
            PhaseKind::Retreat => true,
            PhaseKind::Adjustment => false,
        }
}

/// Updates supply center ownership: centers are captured by the power whose
/// unit occupies them. Returns one event per change, in province order.
pub fn update_sc_ownership(map: &MapTopology, position: &mut Position) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for province in map.provinces() {
        if !map.info(province).supply_center {
            continue;
        }
        let Some(occupier) = position.unit_at(province).map(|u| u.power) else {
            // If no unit present, ownership stays with current owner.
            continue;
        };
        let from = position.sc_owner(province);
        if from != Some(occupier) {
            position.set_sc_owner(province, Some(occupier));
            events.push(GameEvent::SupplyCenterChanged { province, from, to: occupier });
        }
    }
    events
}

/// Returns an event for every power eliminated between two positions.
pub fn eliminations(map: &MapTopology, before: &Position, after: &Position) -> Vec<GameEvent> {
    map.powers()
        .filter(|&p| !before.is_eliminated(p) && after.is_eliminated(p))
        .map(|power| GameEvent::Eliminated { power })
        .collect()
}

/// Evaluates the game-end condition at the close of an adjustment phase.
///
/// A power holding the victory threshold wins outright; otherwise the game
/// is drawn among the survivors once the configured final year is reached.
pub fn check_game_end(map: &MapTopology, position: &Position, rules: &Rules, year: u16) -> Option<GameOutcome> {
    let threshold = rules.victory_threshold(map);
    let leader = map
        .powers()
        .map(|p| (position.supply_center_count(p), p))
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
    if let Some((centers, power)) = leader {
        if centers >= threshold {
            return Some(GameOutcome::Victory { power, centers });
        }
    }
    match rules.draw_after_year {
        Some(last) if year >= last => Some(GameOutcome::Draw {
            survivors: map.powers().filter(|&p| !position.is_eliminated(p)).collect(),
        }),
        _ => None,
    }
}
