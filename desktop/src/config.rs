use std::env;
use std::str::FromStr;
use std::time::Duration;

use shared::constants::DEFAULT_SPIN_DURATION;
use shared::{RouletteSettings, WeightMode};
use thiserror::Error;

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub settings: RouletteSettings,
    /// Period of the animation driver.
    pub frame_interval: Duration,
    /// Fixed RNG seed for reproducible spins.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: RouletteSettings::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weight_mode = parse_var(&lookup, "ROULETTE_WEIGHT_MODE", |v| WeightMode::from_str(v).ok())?
            .unwrap_or_default();
        let elimination_mode = parse_var(&lookup, "ROULETTE_ELIMINATION", parse_bool)?.unwrap_or(true);
        let spin_duration = parse_var(&lookup, "ROULETTE_SPIN_DURATION_MS", parse_millis)?
            .unwrap_or(DEFAULT_SPIN_DURATION);
        let frame_interval = parse_var(&lookup, "ROULETTE_FRAME_INTERVAL_MS", parse_millis)?
            .unwrap_or(DEFAULT_FRAME_INTERVAL);
        let seed = parse_var(&lookup, "ROULETTE_SEED", |v| v.parse::<u64>().ok())?;

        Ok(Self {
            settings: RouletteSettings {
                weight_mode,
                elimination_mode,
                spin_duration,
            },
            frame_interval,
            seed,
        })
    }
}

fn parse_var<F, T, P>(lookup: &F, key: &'static str, parse: P) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::Invalid { key, value }),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_millis(value: &str) -> Option<Duration> {
    value
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
