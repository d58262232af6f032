//! Order types for all phases.
//!
//! Represents the full set of orders: hold, move, support, convoy,
//! retreat, disband, build, and waive. The data model maps directly to
//! DSON notation for straightforward parsing and formatting.

use serde::{Deserialize, Serialize};

use super::province::{Coast, ProvinceId};
use super::unit::UnitType;

/// A location on the board: a province with an optional coast specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub province: ProvinceId,
    pub coast: Coast,
}

impl Location {
    /// Creates a location without a coast.
    pub fn new(province: ProvinceId) -> Self {
        Self { province, coast: Coast::None }
    }

    /// Creates a location with a coast specifier.
    pub fn with_coast(province: ProvinceId, coast: Coast) -> Self {
        Self { province, coast }
    }

    /// Loose equality: same province, and a bare province matches any coast.
    pub fn matches(self, other: Location) -> bool {
        self.province == other.province
            && (self.coast == Coast::None || other.coast == Coast::None || self.coast == other.coast)
    }
}

/// A unit reference in an order: the unit type and its current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderUnit {
    pub unit_type: UnitType,
    pub location: Location,
}

impl OrderUnit {
    pub fn army(location: Location) -> Self {
        OrderUnit { unit_type: UnitType::Army, location }
    }

    pub fn fleet(location: Location) -> Self {
        OrderUnit { unit_type: UnitType::Fleet, location }
    }
}

/// An order covering all three phase kinds.
///
/// Each variant carries exactly the data needed to unambiguously specify the
/// order, mirroring the DSON grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Hold: `A vie H`
    Hold {
        unit: OrderUnit,
    },

    /// Move: `A bud - rum`, `F nrg - stp/nc`, or `A lon - bel via`.
    ///
    /// `via_convoy` requests transport even when the destination is
    /// adjacent; validation sets it for non-adjacent army moves.
    Move {
        unit: OrderUnit,
        dest: Location,
        via_convoy: bool,
    },

    /// Support hold: `A tyr S A vie H`
    SupportHold {
        unit: OrderUnit,
        supported: OrderUnit,
    },

    /// Support move: `A gal S A bud - rum`
    SupportMove {
        unit: OrderUnit,
        supported: OrderUnit,
        dest: Location,
    },

    /// Convoy: `F mao C A bre - spa`
    Convoy {
        unit: OrderUnit,
        convoyed_from: Location,
        convoyed_to: Location,
    },

    /// Retreat: `A vie R boh`
    Retreat {
        unit: OrderUnit,
        dest: Location,
    },

    /// Disband: `F tri D` (retreat phase) or `A war D` (adjustment phase)
    Disband {
        unit: OrderUnit,
    },

    /// Build: `A vie B` or `F stp/sc B`
    Build {
        unit: OrderUnit,
    },

    /// Waive: `W` (voluntarily skip one build)
    Waive,
}

impl Order {
    /// Returns the issuing unit (or build target); `None` for waives.
    pub fn unit(&self) -> Option<OrderUnit> {
        match *self {
            Order::Hold { unit }
            | Order::Move { unit, .. }
            | Order::SupportHold { unit, .. }
            | Order::SupportMove { unit, .. }
            | Order::Convoy { unit, .. }
            | Order::Retreat { unit, .. }
            | Order::Disband { unit }
            | Order::Build { unit } => Some(unit),
            Order::Waive => None,
        }
    }

    /// Returns the province of the issuing unit.
    pub fn province(&self) -> Option<ProvinceId> {
        self.unit().map(|u| u.location.province)
    }

    /// Returns true for orders legal in a movement phase.
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            Order::Hold { .. }
                | Order::Move { .. }
                | Order::SupportHold { .. }
                | Order::SupportMove { .. }
                | Order::Convoy { .. }
        )
    }

    /// Returns true for orders legal in a retreat phase.
    pub fn is_retreat(&self) -> bool {
        matches!(self, Order::Retreat { .. } | Order::Disband { .. })
    }

    /// Returns true for orders legal in an adjustment phase.
    pub fn is_adjustment(&self) -> bool {
        matches!(self, Order::Build { .. } | Order::Disband { .. } | Order::Waive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIE: ProvinceId = ProvinceId(70);
    const STP: ProvinceId = ProvinceId(60);

    #[test]
    fn location_new_has_no_coast() {
        let loc = Location::new(VIE);
        assert_eq!(loc.province, VIE);
        assert_eq!(loc.coast, Coast::None);
    }

    #[test]
    fn loose_location_matching() {
        let bare = Location::new(STP);
        let north = Location::with_coast(STP, Coast::North);
        let south = Location::with_coast(STP, Coast::South);
        assert!(bare.matches(north));
        assert!(north.matches(bare));
        assert!(north.matches(north));
        assert!(!north.matches(south));
        assert!(!bare.matches(Location::new(VIE)));
    }

    #[test]
    fn order_accessors() {
        let unit = OrderUnit::army(Location::new(VIE));
        let hold = Order::Hold { unit };
        assert_eq!(hold.unit(), Some(unit));
        assert_eq!(hold.province(), Some(VIE));
        assert!(hold.is_movement());
        assert!(!hold.is_retreat());
        assert_eq!(Order::Waive.unit(), None);
        assert!(Order::Waive.is_adjustment());
        assert!(Order::Disband { unit }.is_retreat());
        assert!(Order::Disband { unit }.is_adjustment());
    }
}
