//! Game rules configuration.
//!
//! Rules are plain data with defaults, loaded from JSON or set one option at
//! a time through the console's `setoption` command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::map::MapTopology;

/// Errors from loading or changing rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rules file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Rules that vary between games on the same map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Supply centers needed for a solo victory. Defaults to a strict
    /// majority of the map's centers.
    pub victory_centers: Option<usize>,
    /// The game ends in a draw after the adjustment phase of this year.
    pub draw_after_year: Option<u16>,
}

impl Rules {
    /// Parses rules from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the number of centers that wins the game on `map`.
    pub fn victory_threshold(&self, map: &MapTopology) -> usize {
        self.victory_centers
            .unwrap_or(map.supply_center_count() / 2 + 1)
    }

    /// Sets a named option. A missing value restores the default.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.unwrap_or_default().to_string(),
        };
        match name.to_ascii_lowercase().as_str() {
            "victorycenters" => {
                self.victory_centers = value.map(|v| v.parse().map_err(|_| invalid())).transpose()?;
            }
            "drawafteryear" => {
                self.draw_after_year = value.map(|v| v.parse().map_err(|_| invalid())).transpose()?;
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::standard::standard_map;

    #[test]
    fn defaults_to_majority() {
        let map = standard_map();
        let rules = Rules::default();
        assert_eq!(rules.victory_threshold(&map), 18);
        assert_eq!(rules.draw_after_year, None);
    }

    #[test]
    fn from_json_keeps_defaults() {
        let rules = Rules::from_json(r#"{"draw_after_year": 1910}"#).unwrap();
        assert_eq!(rules.draw_after_year, Some(1910));
        assert_eq!(rules.victory_centers, None);
        assert!(Rules::from_json("{not json").is_err());
    }

    #[test]
    fn set_option_by_name() {
        let map = standard_map();
        let mut rules = Rules::default();
        rules.set_option("VictoryCenters", Some("20")).unwrap();
        assert_eq!(rules.victory_threshold(&map), 20);
        rules.set_option("VictoryCenters", None).unwrap();
        assert_eq!(rules.victory_threshold(&map), 18);
        assert!(matches!(
            rules.set_option("DrawAfterYear", Some("soon")),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(rules.set_option("Threads", Some("4")), Err(ConfigError::UnknownOption(_))));
    }
}
