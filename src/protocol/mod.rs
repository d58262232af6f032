//! Text protocol handling.
//!
//! This module implements DSON structured notation for orders and the
//! command parser for the console referee's main loop.

pub mod dson;
pub mod parser;

pub use dson::{format_location, format_order, format_orders, parse_order, parse_orders, DsonError};
pub use parser::{parse_command, Command};
