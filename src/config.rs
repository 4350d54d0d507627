//! Runtime settings read from the environment.
//!
//! `main` loads `.env` through `dotenvy` before calling [`Settings::from_env`],
//! so values may come from either place. CLI flags override all of them.

use std::path::PathBuf;

pub const DEFAULT_DRONE_DATA_PATH: &str = "data/droneType.csv";
pub const DEFAULT_PORT_DATA_PATH: &str = "data/merged_ports_data.csv";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/drone_selector.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `DRONE_DATA_PATH`: drone catalog, a path or http(s) URL.
    pub drone_data: String,
    /// `PORT_DATA_PATH`: site table, a path or http(s) URL.
    pub port_data: String,
    /// `LOG_FILE_PATH`: base name of the rolling JSON log.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drone_data: DEFAULT_DRONE_DATA_PATH.to_string(),
            port_data: DEFAULT_PORT_DATA_PATH.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE_PATH),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            drone_data: get("DRONE_DATA_PATH", DEFAULT_DRONE_DATA_PATH),
            port_data: get("PORT_DATA_PATH", DEFAULT_PORT_DATA_PATH),
            log_file: PathBuf::from(get("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Settings::from_lookup(|_| None), Settings::default());
    }

    #[test]
    fn test_values_override_defaults() {
        let env: HashMap<&str, &str> = [
            ("DRONE_DATA_PATH", "/srv/drones.csv.gz"),
            ("PORT_DATA_PATH", "https://example.org/ports.csv"),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.drone_data, "/srv/drones.csv.gz");
        assert_eq!(settings.port_data, "https://example.org/ports.csv");
        assert_eq!(settings.log_file, PathBuf::from(DEFAULT_LOG_FILE_PATH));
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        let settings = Settings::from_lookup(|k| (k == "DRONE_DATA_PATH").then(|| "  ".to_string()));
        assert_eq!(settings.drone_data, DEFAULT_DRONE_DATA_PATH);
    }
}
