//! Console command parser.
//!
//! Parses incoming referee commands from raw text into structured
//! `Command` variants that the main loop can dispatch on. Power names and
//! order text are kept as strings here; the main loop resolves them
//! against the game's map.

use tracing::warn;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new game from the standard opening.
    NewGame,

    /// Submit a power's orders: `orders <power> <o1> ; <o2> ...`.
    Orders { power: String, orders: String },

    /// Adjudicate the open phase.
    Adjudicate,

    /// Print the current phase, positions and center counts.
    Status,

    /// Change a rule: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Terminate the process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "adjudicate" => Some(Command::Adjudicate),
        "status" => Some(Command::Status),

        "orders" => parse_orders_command(&tokens, trimmed),
        "setoption" => parse_setoption(&tokens),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `orders <power> [<order> ; <order> ...]`.
///
/// An empty order list is allowed and clears the power's orders.
fn parse_orders_command(tokens: &[&str], line: &str) -> Option<Command> {
    let Some(power) = tokens.get(1) else {
        warn!("malformed orders: expected 'orders <power> <order> ; <order>'");
        return None;
    };
    // Everything after the power name, with its original spacing.
    let rest = line["orders".len()..].trim_start();
    let orders = rest[power.len()..].trim().to_string();
    Some(Command::Orders { power: power.to_ascii_lowercase(), orders })
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    // Minimum: setoption name <id>
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() { None } else { Some(value_parts.join(" ")) };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}
