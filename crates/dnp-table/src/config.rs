//! Station configuration
//!
//! Describes which devices a trainer outstation exposes. Stored as JSON at
//! `$XDG_CONFIG_HOME/dnp-trainer/station.json` (falling back to
//! `~/.config/dnp-trainer/station.json`).
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "Substation A",
//!   "devices": [
//!     { "kind": "setpoint", "name": "Voltage", "setpoint": 480.0, "variance": 0.4 },
//!     { "kind": "simple", "name": "Fan" },
//!     { "kind": "breaker", "name": "Main", "model": "COMPLEMENTARY_TWO_OUTPUT" },
//!     { "kind": "slow", "name": "Switch", "runtime_ms": 10000, "polarity": "reversed" }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use dnp_sim::{Polarity, TwoSignalControlModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TableError;

const CONFIG_DIR_NAME: &str = "dnp-trainer";
const CONFIG_FILE_NAME: &str = "station.json";

/// Full travel time of slow devices unless configured
pub const DEFAULT_RUNTIME_MS: u64 = 10_000;

fn default_runtime_ms() -> u64 {
    DEFAULT_RUNTIME_MS
}

fn default_slow_model() -> TwoSignalControlModel {
    TwoSignalControlModel::Activation
}

/// One device of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceConfig {
    /// Latched on/off device
    Simple { name: String },
    /// Instantaneous breaker
    Breaker {
        name: String,
        model: TwoSignalControlModel,
    },
    /// Motor-operated device with timed travel
    Slow {
        name: String,
        #[serde(default = "default_runtime_ms")]
        runtime_ms: u64,
        #[serde(default = "default_slow_model")]
        model: TwoSignalControlModel,
        #[serde(default)]
        polarity: Polarity,
    },
    /// Noisy analog measurement around a settable base value
    Setpoint {
        name: String,
        setpoint: f64,
        #[serde(default)]
        variance: f64,
        #[serde(default)]
        read_only: bool,
    },
}

impl DeviceConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Simple { name }
            | Self::Breaker { name, .. }
            | Self::Slow { name, .. }
            | Self::Setpoint { name, .. } => name,
        }
    }
}

/// A station: its name and devices in registration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl Default for StationConfig {
    fn default() -> Self {
        let mut devices = vec![
            DeviceConfig::Setpoint {
                name: "Temperature".to_string(),
                setpoint: 62.0,
                variance: 0.5,
                read_only: true,
            },
            DeviceConfig::Setpoint {
                name: "Voltage".to_string(),
                setpoint: 480.0,
                variance: 0.4,
                read_only: false,
            },
            DeviceConfig::Setpoint {
                name: "Frequency".to_string(),
                setpoint: 60.0,
                variance: 0.2,
                read_only: false,
            },
        ];
        devices.extend((0..5).map(|i| DeviceConfig::Simple {
            name: format!("Device {}", i),
        }));
        devices.extend((0..10).map(|i| DeviceConfig::Breaker {
            name: format!("Breaker {}", i),
            model: if i < 5 {
                TwoSignalControlModel::ComplementaryTwoOutput
            } else {
                TwoSignalControlModel::Activation
            },
        }));
        devices.extend((0..3).map(|i| DeviceConfig::Slow {
            name: format!("Switch {}", i),
            runtime_ms: DEFAULT_RUNTIME_MS,
            model: TwoSignalControlModel::Activation,
            polarity: Polarity::Normal,
        }));

        Self {
            name: "DNP3 Trainer".to_string(),
            devices,
        }
    }
}

impl StationConfig {
    /// XDG config directory for the trainer
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join(CONFIG_DIR_NAME));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join(CONFIG_DIR_NAME))
    }

    /// Default location of the station file
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Load the station from the default location
    ///
    /// A missing file yields the default station; an unreadable or invalid
    /// one is logged and also yields the default station.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring station file: {}", e);
                Self::default()
            }
        }
    }

    /// Load the station from `path`
    pub fn load_from(path: &Path) -> Result<Self, TableError> {
        let json = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        info!(
            "Loaded station {} ({} devices) from {}",
            config.name,
            config.devices.len(),
            path.display()
        );
        Ok(config)
    }

    /// Save the station to the default location, returning the path written
    pub fn save(&self) -> Result<PathBuf, TableError> {
        let path = Self::default_path().ok_or(TableError::NoConfigPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the station to `path` as pretty-printed JSON
    pub fn save_to(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TableError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
