//! DSON (Diplomacy Standard Order Notation) encoding and decoding.
//!
//! DSON is a compact text notation for orders: unit types are uppercase
//! A/F, provinces are the map's lowercase abbreviations and a coast follows
//! a `/` (slash). Province names are resolved against a `MapTopology`, so
//! any map built through `MapBuilder` can be read and written.
//!
//! ```text
//! A vie H            F nrg - stp/nc       A lon - nwy via
//! A tyr S A vie H    A gal S A bud - rum  F mao C A bre - spa
//! A vie R boh        F tri D              F stp/sc B          W
//! ```

use thiserror::Error;

use crate::board::map::MapTopology;
use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::Coast;
use crate::board::unit::UnitType;

/// Errors that can occur when parsing DSON order strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsonError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("unknown coast '{0}'")]
    UnknownCoast(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(String),

    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },
}

/// Parses a single DSON order string into an `Order`.
///
/// Accepts canonical DSON forms like `A vie H`, `F nrg - stp/nc`, `W`, etc.
/// Parsing is purely syntactic; whether the order is legal is decided by
/// validation.
pub fn parse_order(map: &MapTopology, s: &str) -> Result<Order, DsonError> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DsonError::EmptyInput);
    }

    // Waive is a special case: standalone "W"
    if tokens[0] == "W" {
        return expect_end(&tokens, 1).map(|()| Order::Waive);
    }

    let unit = parse_unit(map, &tokens, 0)?;
    let pos = 2;
    let action = tokens
        .get(pos)
        .ok_or_else(|| DsonError::UnexpectedEnd("action (H, -, S, C, R, D, B)".to_string()))?;

    let order = match *action {
        "H" => Order::Hold { unit },
        "-" => {
            let dest = parse_location(map, &tokens, pos + 1)?;
            let via_convoy = tokens.get(pos + 2) == Some(&"via");
            let end = if via_convoy { pos + 3 } else { pos + 2 };
            expect_end(&tokens, end)?;
            return Ok(Order::Move { unit, dest, via_convoy });
        }
        "S" => {
            let supported = parse_unit(map, &tokens, pos + 1)?;
            let sup_pos = pos + 3;
            match tokens.get(sup_pos) {
                None => return Err(DsonError::UnexpectedEnd("H or - after supported unit".to_string())),
                Some(&"H") => {
                    expect_end(&tokens, sup_pos + 1)?;
                    return Ok(Order::SupportHold { unit, supported });
                }
                Some(&"-") => {
                    let dest = parse_location(map, &tokens, sup_pos + 1)?;
                    expect_end(&tokens, sup_pos + 2)?;
                    return Ok(Order::SupportMove { unit, supported, dest });
                }
                Some(other) => {
                    return Err(DsonError::UnexpectedToken {
                        expected: "H or -".to_string(),
                        found: other.to_string(),
                    })
                }
            }
        }
        "C" => {
            // The convoyed unit is always an army.
            match tokens.get(pos + 1) {
                None => return Err(DsonError::UnexpectedEnd("A (convoyed army)".to_string())),
                Some(&"A") => {}
                Some(other) => {
                    return Err(DsonError::UnexpectedToken {
                        expected: "A (convoyed army)".to_string(),
                        found: other.to_string(),
                    })
                }
            }
            let convoyed_from = parse_location(map, &tokens, pos + 2)?;
            match tokens.get(pos + 3) {
                None => return Err(DsonError::UnexpectedEnd("- (move arrow)".to_string())),
                Some(&"-") => {}
                Some(other) => {
                    return Err(DsonError::UnexpectedToken {
                        expected: "-".to_string(),
                        found: other.to_string(),
                    })
                }
            }
            let convoyed_to = parse_location(map, &tokens, pos + 4)?;
            expect_end(&tokens, pos + 5)?;
            return Ok(Order::Convoy { unit, convoyed_from, convoyed_to });
        }
        "R" => {
            let dest = parse_location(map, &tokens, pos + 1)?;
            expect_end(&tokens, pos + 2)?;
            return Ok(Order::Retreat { unit, dest });
        }
        "D" => Order::Disband { unit },
        "B" => Order::Build { unit },
        other => return Err(DsonError::UnknownAction(other.to_string())),
    };
    expect_end(&tokens, pos + 1)?;
    Ok(order)
}

/// Parses a semicolon-separated list of DSON orders.
///
/// Orders are separated by `;`. A single order without separators is valid.
pub fn parse_orders(map: &MapTopology, s: &str) -> Result<Vec<Order>, DsonError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DsonError::EmptyInput);
    }
    s.split(';').map(|part| parse_order(map, part)).collect()
}

/// Formats a single `Order` as a canonical DSON string.
pub fn format_order(map: &MapTopology, order: &Order) -> String {
    let unit = |u: &OrderUnit| format_unit(map, u);
    let loc = |l: &Location| format_location(map, l);
    match order {
        Order::Hold { unit: u } => format!("{} H", unit(u)),
        Order::Move { unit: u, dest, via_convoy: false } => format!("{} - {}", unit(u), loc(dest)),
        Order::Move { unit: u, dest, via_convoy: true } => format!("{} - {} via", unit(u), loc(dest)),
        Order::SupportHold { unit: u, supported } => format!("{} S {} H", unit(u), unit(supported)),
        Order::SupportMove { unit: u, supported, dest } => {
            format!("{} S {} - {}", unit(u), unit(supported), loc(dest))
        }
        Order::Convoy { unit: u, convoyed_from, convoyed_to } => {
            format!("{} C A {} - {}", unit(u), loc(convoyed_from), loc(convoyed_to))
        }
        Order::Retreat { unit: u, dest } => format!("{} R {}", unit(u), loc(dest)),
        Order::Disband { unit: u } => format!("{} D", unit(u)),
        Order::Build { unit: u } => format!("{} B", unit(u)),
        Order::Waive => "W".to_string(),
    }
}

/// Formats a slice of orders as a ` ; `-separated DSON string.
pub fn format_orders(map: &MapTopology, orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format_order(map, o))
        .collect::<Vec<_>>()
        .join(" ; ")
}

/// Formats a location as "prov" or "prov/coast".
pub fn format_location(map: &MapTopology, loc: &Location) -> String {
    if loc.coast == Coast::None {
        map.abbr(loc.province).to_string()
    } else {
        format!("{}/{}", map.abbr(loc.province), loc.coast.abbr())
    }
}

fn expect_end(tokens: &[&str], idx: usize) -> Result<(), DsonError> {
    match tokens.get(idx) {
        None => Ok(()),
        Some(extra) => Err(DsonError::UnexpectedToken {
            expected: "end of order".to_string(),
            found: extra.to_string(),
        }),
    }
}

/// Parses a unit (unit_char + location) from token slice at given index.
fn parse_unit(map: &MapTopology, tokens: &[&str], idx: usize) -> Result<OrderUnit, DsonError> {
    let token = tokens
        .get(idx)
        .ok_or_else(|| DsonError::UnexpectedEnd("unit type (A or F)".to_string()))?;
    let unit_type = match token.chars().collect::<Vec<_>>().as_slice() {
        [c] => UnitType::from_dson_char(*c),
        _ => None,
    }
    .ok_or_else(|| DsonError::UnknownUnitType(token.to_string()))?;
    let location = parse_location(map, tokens, idx + 1)?;
    Ok(OrderUnit { unit_type, location })
}

/// Parses a location (prov_id or prov_id/coast) from token slice at given index.
fn parse_location(map: &MapTopology, tokens: &[&str], idx: usize) -> Result<Location, DsonError> {
    let token = tokens
        .get(idx)
        .ok_or_else(|| DsonError::UnexpectedEnd("province location".to_string()))?;
    let (prov_str, coast_str) = match token.split_once('/') {
        Some((p, c)) => (p, Some(c)),
        None => (*token, None),
    };
    let province = map
        .province(prov_str)
        .ok_or_else(|| DsonError::UnknownProvince(prov_str.to_string()))?;
    match coast_str {
        None => Ok(Location::new(province)),
        Some(c) => {
            let coast = Coast::from_abbr(c)
                .filter(|&coast| coast != Coast::None)
                .ok_or_else(|| DsonError::UnknownCoast(c.to_string()))?;
            Ok(Location::with_coast(province, coast))
        }
    }
}

/// Formats a unit reference as "A prov" or "F prov/coast".
fn format_unit(map: &MapTopology, unit: &OrderUnit) -> String {
    format!("{} {}", unit.unit_type.dson_char(), format_location(map, &unit.location))
}
