//! Process-wide settings, read once at startup.

use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

/// Where to listen and which pin drives the light.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// TCP port of the HTTP listener.
    pub port: u16,
    /// BCM number of the GPIO pin wired to the light.
    pub pin: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: 8080, pin: 4 }
    }
}

impl Config {
    /// Reads the configuration from `LIGHTD_PORT` / `LIGHTD_PIN`, keeping
    /// the defaults for anything unset or unparsable.
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            port: env_value("LIGHTD_PORT").unwrap_or(defaults.port),
            pin: env_value("LIGHTD_PIN").unwrap_or(defaults.pin),
        }
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparsable {key}={raw}");
            None
        }
    }
}
