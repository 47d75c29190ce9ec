//! Configuration management.

use anyhow::{Context, Result};
use gu7000_hw::{BusOptions, BusyWait, PinSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Give up waiting on Busy after this many milliseconds (absent: wait forever)
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,

    /// Pin role (Busy, Write, D0-D7) to GPIO line number
    #[serde(default = "default_pins")]
    pub pins: BTreeMap<String, u32>,
}

// Default value functions
fn default_pins() -> BTreeMap<String, u32> {
    [
        ("Busy", 4),
        ("Write", 17),
        ("D0", 18),
        ("D1", 27),
        ("D2", 22),
        ("D3", 23),
        ("D4", 24),
        ("D5", 25),
        ("D6", 5),
        ("D7", 6),
    ]
    .into_iter()
    .map(|(role, pin)| (role.to_string(), pin))
    .collect()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validated pin wiring.
    pub fn pin_set(&self) -> Result<PinSet> {
        PinSet::from_bindings(self.pins.iter().map(|(role, &pin)| (role, pin)))
            .context("Invalid pin configuration")
    }

    pub fn bus_options(&self) -> BusOptions {
        BusOptions {
            busy_wait: match self.busy_timeout_ms {
                Some(ms) => BusyWait::Deadline(Duration::from_millis(ms)),
                None => BusyWait::Forever,
            },
            cancel: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            busy_timeout_ms: None,
            pins: default_pins(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gu7000_hw::{PinId, PinRole};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let pins = config.pin_set().unwrap();
        assert_eq!(pins.busy(), PinId(4));
        assert_eq!(pins.pin(PinRole::D7), PinId(6));
        assert_eq!(config.bus_options().busy_wait, BusyWait::Forever);
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "busy_timeout_ms = 250\n\
             [pins]\n\
             busy = 2\nwrite = 3\n\
             d0 = 10\nd1 = 11\nd2 = 12\nd3 = 13\nd4 = 14\nd5 = 15\nd6 = 16\nd7 = 17"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.bus_options().busy_wait,
            BusyWait::Deadline(Duration::from_millis(250))
        );
        let pins = config.pin_set().unwrap();
        assert_eq!(pins.write(), PinId(3));
        assert_eq!(pins.data(7), PinId(17));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.pins.len(), 10);
    }

    #[test]
    fn test_bad_pin_table() {
        let mut config = Config::default();
        config.pins.remove("D3");
        assert!(config.pin_set().is_err());

        let mut config = Config::default();
        config.pins.insert("Reset".into(), 9);
        assert!(config.pin_set().is_err());
    }
}
