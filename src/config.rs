//! Runtime configuration read from the environment.
//!
//! - `MEMORY_SEED`: deck seed (default: derived from the clock)
//! - `MEMORY_PAIRS`: number of pairs, clamped to 2..=16 (default: 8)
//! - `MEMORY_RECORDS_PATH`: best-record file (default:
//!   `$XDG_DATA_HOME/tui-memory/records.json`, falling back to
//!   `$HOME/.local/share/tui-memory/records.json`)
//! - `MEMORY_LOG_PATH`: log file; logging is off when unset
//!
//! Adapter variables are read by `adapter::ServerConfig::from_env`.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{DEFAULT_PAIR_COUNT, MAX_PAIR_COUNT, MIN_PAIR_COUNT};

const RECORDS_FILE: &str = "records.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub seed: u32,
    pub pair_count: u8,
    pub records_path: PathBuf,
    pub log_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let seed = var("MEMORY_SEED")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(clock_seed);
        let pair_count = var("MEMORY_PAIRS")
            .and_then(|v| v.parse::<u8>().ok())
            .map(|n| n.clamp(MIN_PAIR_COUNT, MAX_PAIR_COUNT))
            .unwrap_or(DEFAULT_PAIR_COUNT);
        let records_path = var("MEMORY_RECORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_records_path(var("XDG_DATA_HOME"), var("HOME")));
        let log_path = var("MEMORY_LOG_PATH").map(PathBuf::from);

        Self {
            seed,
            pair_count,
            records_path,
            log_path,
        }
    }
}

fn default_records_path(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    let base = match (xdg_data_home, home) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => PathBuf::from(home).join(".local").join("share"),
        (None, None) => PathBuf::from("."),
    };
    base.join("tui-memory").join(RECORDS_FILE)
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            ("MEMORY_SEED", "42"),
            ("MEMORY_PAIRS", "6"),
            ("MEMORY_RECORDS_PATH", "/tmp/r.json"),
            ("MEMORY_LOG_PATH", "/tmp/m.log"),
        ]);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.pair_count, 6);
        assert_eq!(cfg.records_path, PathBuf::from("/tmp/r.json"));
        assert_eq!(cfg.log_path, Some(PathBuf::from("/tmp/m.log")));
    }

    #[test]
    fn pair_count_is_clamped() {
        assert_eq!(config(&[("MEMORY_PAIRS", "1")]).pair_count, MIN_PAIR_COUNT);
        assert_eq!(config(&[("MEMORY_PAIRS", "99")]).pair_count, MAX_PAIR_COUNT);
        assert_eq!(config(&[("MEMORY_PAIRS", "lots")]).pair_count, DEFAULT_PAIR_COUNT);
    }

    #[test]
    fn records_path_prefers_xdg_then_home() {
        let cfg = config(&[("XDG_DATA_HOME", "/data"), ("HOME", "/home/u")]);
        assert_eq!(cfg.records_path, PathBuf::from("/data/tui-memory/records.json"));

        let cfg = config(&[("HOME", "/home/u")]);
        assert_eq!(
            cfg.records_path,
            PathBuf::from("/home/u/.local/share/tui-memory/records.json")
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("MEMORY_LOG_PATH", "  "), ("MEMORY_PAIRS", "")]);
        assert_eq!(cfg.log_path, None);
        assert_eq!(cfg.pair_count, DEFAULT_PAIR_COUNT);
    }
}
