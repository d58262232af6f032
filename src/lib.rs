//! Adjudicator library.
//!
//! Exposes the board representation, order validation, the phase
//! resolvers, the game controller and protocol modules for use by
//! integration tests and the binary entry point.

pub mod board;
pub mod config;
pub mod game;
pub mod protocol;
pub mod resolve;
pub mod results;
