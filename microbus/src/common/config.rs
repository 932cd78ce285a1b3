/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for the microbus runtime.
///
/// Loaded from TOML in XDG-compliant directories. Every section has defaults,
/// so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Limits and thresholds
    pub limits: LimitsConfig,
    /// Default values
    pub defaults: DefaultsConfig,
    /// Behavioral switches
    pub behavior: BehaviorConfig,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `WorkerHandle::stop` waits for a single worker, in milliseconds
    pub worker_shutdown_timeout_ms: u64,
    /// How long `BusRuntime::shutdown_all` waits for every worker, in milliseconds
    pub system_shutdown_timeout_ms: u64,
}

/// Limits and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Inbox depth at which the bus starts logging warnings.
    ///
    /// Inboxes are unbounded; this is a diagnostic threshold, not back-pressure.
    pub inbox_warn_depth: usize,
}

/// Default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name given to workers created without one
    pub worker_name: String,
}

/// Behavioral switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Broadcast `WorkerStateChanged` when workers start and stop
    pub announce_lifecycle: bool,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            worker_shutdown_timeout_ms: 10_000,
            system_shutdown_timeout_ms: 30_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            inbox_warn_depth: 10_000,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            worker_name: "worker".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            announce_lifecycle: true,
        }
    }
}

impl BusConfig {
    /// Per-worker shutdown timeout as a `Duration`
    pub const fn worker_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.worker_shutdown_timeout_ms)
    }

    /// System shutdown timeout as a `Duration`
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.system_shutdown_timeout_ms)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `$XDG_CONFIG_HOME/microbus/config.toml` (falling back to
    /// `~/.config/microbus/config.toml`). A missing file yields the defaults; a
    /// file that cannot be read or parsed is logged and the defaults are used.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("microbus") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(text) => match Self::from_toml(&text) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: BusConfig = BusConfig::load();
}
