//! Adjudicator -- a console referee for Diplomacy-style games.
//!
//! This binary reads commands from stdin and writes responses to stdout,
//! one line per fact. Logging goes to stderr and is controlled by
//! `RUST_LOG` (default `info`). An optional first argument names a JSON
//! rules file.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use adjudicator::board::{MapTopology, Order, Power};
use adjudicator::config::Rules;
use adjudicator::game::Game;
use adjudicator::protocol::dson::{format_location, format_order, parse_orders};
use adjudicator::protocol::parser::{parse_command, Command};
use adjudicator::results::{DisbandReason, GameEvent, OrderOutcome, ResultLog};

/// Console state: the rules for new games and the game in progress.
struct Referee {
    rules: Rules,
    game: Game,
}

impl Referee {
    fn new(rules: Rules) -> Result<Self, String> {
        let game = Game::standard(rules.clone()).map_err(|e| e.to_string())?;
        Ok(Referee { rules, game })
    }

    fn new_game(&mut self, out: &mut impl Write) -> io::Result<()> {
        match Game::standard(self.rules.clone()) {
            Ok(game) => {
                self.game = game;
                writeln!(out, "phase {}", self.game.phase())
            }
            Err(e) => writeln!(out, "error {e}"),
        }
    }

    fn set_option(&mut self, name: &str, value: Option<&str>, out: &mut impl Write) -> io::Result<()> {
        match self.rules.set_option(name, value) {
            Ok(()) => {
                self.game.set_rules(self.rules.clone());
                writeln!(out, "ok")
            }
            Err(e) => writeln!(out, "error {e}"),
        }
    }

    fn submit(&mut self, power_name: &str, text: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(power) = self.game.map().power(power_name) else {
            return writeln!(out, "error unknown power '{power_name}'");
        };
        let orders: Vec<Order> = if text.is_empty() {
            Vec::new()
        } else {
            match parse_orders(self.game.map(), text) {
                Ok(orders) => orders,
                Err(e) => return writeln!(out, "error {e}"),
            }
        };
        let count = orders.len();
        match self.game.submit_orders(power, orders) {
            Ok(()) => writeln!(out, "ok {power_name} {count}"),
            Err(e) => writeln!(out, "error {e}"),
        }
    }

    fn adjudicate(&mut self, out: &mut impl Write) -> io::Result<()> {
        let resolved = match self.game.process() {
            Ok(resolved) => resolved.clone(),
            Err(e) => {
                error!(%e, "adjudication failed");
                return writeln!(out, "error {e}");
            }
        };
        write_results(self.game.map(), &resolved.results, out)?;
        match self.game.outcome() {
            Some(_) => writeln!(out, "gameover"),
            None => writeln!(out, "phase {}", self.game.phase()),
        }
    }

    fn status(&self, out: &mut impl Write) -> io::Result<()> {
        let map = self.game.map();
        writeln!(out, "phase {}", self.game.phase())?;
        for power in map.powers() {
            let name = &map.power_info(power).name;
            let owed = self.game.position().adjustment(power);
            writeln!(
                out,
                "power {name} units {} centers {} adjust {owed}",
                self.game.unit_count(power),
                self.game.supply_center_count(power),
            )?;
        }
        for unit in self.game.position().units() {
            writeln!(
                out,
                "unit {} {} {}",
                map.power_info(unit.power).name,
                unit.unit_type.dson_char(),
                format_location(map, &unit.location)
            )?;
        }
        for d in self.game.position().dislodged() {
            let retreats: Vec<String> = d.retreats.iter().map(|l| format_location(map, l)).collect();
            writeln!(
                out,
                "dislodged {} {} {} retreats {}",
                map.power_info(d.unit.power).name,
                d.unit.unit_type.dson_char(),
                format_location(map, &d.unit.location),
                retreats.join(",")
            )?;
        }
        Ok(())
    }
}

fn write_results(map: &MapTopology, log: &ResultLog, out: &mut impl Write) -> io::Result<()> {
    for r in log.order_results() {
        writeln!(
            out,
            "result {} {} : {}",
            map.power_info(r.power).name,
            format_order(map, &r.order),
            outcome_text(&r.outcome)
        )?;
    }
    for event in log.general() {
        writeln!(out, "event {}", event_text(map, event))?;
    }
    Ok(())
}

fn outcome_text(outcome: &OrderOutcome) -> String {
    match outcome {
        OrderOutcome::Succeeded => "succeeded".to_string(),
        OrderOutcome::Bounced => "bounced".to_string(),
        OrderOutcome::Cut => "cut".to_string(),
        OrderOutcome::Void => "void".to_string(),
        OrderOutcome::NoConvoy => "no convoy".to_string(),
        OrderOutcome::Disrupted => "disrupted".to_string(),
        OrderOutcome::ParadoxHeld => "paradox".to_string(),
        OrderOutcome::RetreatBounced => "retreat bounced".to_string(),
        OrderOutcome::Disbanded => "disbanded".to_string(),
        OrderOutcome::Invalid(e) => format!("invalid ({e})"),
    }
}

fn event_text(map: &MapTopology, event: &GameEvent) -> String {
    let power = |p: Power| map.power_info(p).name.clone();
    match event {
        GameEvent::Dislodged { unit, attacker_from, .. } => format!(
            "dislodged {} {} {} from {}",
            power(unit.power),
            unit.unit_type.dson_char(),
            format_location(map, &unit.location),
            map.abbr(*attacker_from)
        ),
        GameEvent::Disbanded { unit, reason } => {
            let why = match reason {
                DisbandReason::NoRetreat => "no retreat",
                DisbandReason::Unordered => "unordered",
                DisbandReason::CivilDisorder => "civil disorder",
            };
            format!(
                "disbanded {} {} {} ({why})",
                power(unit.power),
                unit.unit_type.dson_char(),
                format_location(map, &unit.location)
            )
        }
        GameEvent::SupplyCenterChanged { province, from, to } => format!(
            "center {} {} -> {}",
            map.abbr(*province),
            from.map_or_else(|| "none".to_string(), power),
            power(*to)
        ),
        GameEvent::Eliminated { power: p } => format!("eliminated {}", power(*p)),
        GameEvent::Victory { power: p, centers } => format!("victory {} {centers}", power(*p)),
        GameEvent::Draw { survivors } => {
            let names: Vec<String> = survivors.iter().map(|&p| power(p)).collect();
            format!("draw {}", names.join(","))
        }
    }
}

fn load_rules() -> Result<Rules, String> {
    match std::env::args().nth(1) {
        None => Ok(Rules::default()),
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            Rules::from_json(&text).map_err(|e| format!("{path}: {e}"))
        }
    }
}

/// Runs the main console loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let referee = load_rules().and_then(Referee::new);
    let mut referee = match referee {
        Ok(r) => r,
        Err(e) => {
            error!(%e, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let written = match cmd {
            Command::NewGame => referee.new_game(&mut out),
            Command::Orders { power, orders } => referee.submit(&power, &orders, &mut out),
            Command::Adjudicate => referee.adjudicate(&mut out),
            Command::Status => referee.status(&mut out),
            Command::SetOption { name, value } => referee.set_option(&name, value.as_deref(), &mut out),
            Command::Quit => break,
        };
        if let Err(e) = written.and_then(|()| out.flush()) {
            warn!(%e, "stdout closed");
            break;
        }
    }
    ExitCode::SUCCESS
}
