//! Board representation and game-state types.
//!
//! Contains the map topology, units, orders, positions and order
//! validation. The standard map is built in for tests and the console.

pub mod map;
pub mod order;
pub mod province;
pub mod standard;
pub mod state;
pub mod unit;
pub mod validate;

pub use map::{AdjacencyEntry, MapBuilder, MapError, MapTopology, Passage};
pub use order::{Location, Order, OrderUnit};
pub use province::{Coast, Power, PowerInfo, ProvinceId, ProvinceInfo, Terrain};
pub use standard::{opening_position, standard_map};
pub use state::{DislodgedUnit, Phase, PhaseKind, Position, Season, StateError};
pub use unit::{Unit, UnitType};
pub use validate::{check_submission, validate_order, ValidationError};
