//! Order resolution.
//!
//! Movement phases are resolved with the Kruijswijk algorithm; retreat and
//! adjustment phases have their own simpler resolvers. `phase` sequences
//! the game year and decides supply-center ownership and game end.

use thiserror::Error;

use crate::board::state::StateError;

pub mod build;
pub mod kruijswijk;
pub mod phase;
pub mod retreat;

pub use build::{apply_adjustments, resolve_adjustments, AdjustmentResolution};
pub use kruijswijk::{apply_resolution, resolve_orders, Dislodgement, MovementResolution, Resolver};
pub use phase::{check_game_end, eliminations, next_phase, ownership_due, update_sc_ownership, GameOutcome};
pub use retreat::{apply_retreats, resolve_retreats, RetreatResolution};

/// Fatal adjudication failures.
///
/// Neither variant is reachable with validated orders on a consistent
/// position; both indicate a bug in the caller or the resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdjudicationError {
    #[error("resolution of {orders} orders did not converge")]
    NoConvergence { orders: usize },

    #[error("position became inconsistent: {0}")]
    State(#[from] StateError),
}
