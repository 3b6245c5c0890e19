// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, load_yaml_with_env, resolve_config_path};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use zkhe_fhe_params::ZkhePreset;

pub const DEFAULT_CONFIG_NAME: &str = "zkhe.config.yaml";
pub const ENV_PREFIX: &str = "ZKHE_";

/// How the ciphertext track manages noise
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    /// Relinearize after every multiplication
    pub relinearize: bool,
    /// Abort once a product's noise budget falls below this many bits
    pub min_budget_bits: Option<usize>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            relinearize: true,
            min_budget_bits: None,
        }
    }
}

/// The application configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Parameter preset for the scheme, the proof ring and the encoding
    pub preset: ZkhePreset,
    /// Seed for every rng; fresh entropy when unset
    pub seed: Option<u64>,
    pub noise: NoiseConfig,
    /// CSV file that per-run timings are appended to
    pub timing_csv: Option<PathBuf>,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preset: ZkhePreset::default(),
            seed: None,
            noise: NoiseConfig::default(),
            timing_csv: None,
            config_file: None,
        }
    }
}

impl AppConfig {
    pub fn preset(&self) -> ZkhePreset {
        self.preset
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn noise(&self) -> NoiseConfig {
        self.noise
    }

    pub fn timing_csv(&self) -> Option<&Path> {
        self.timing_csv.as_deref()
    }
}

pub struct OsDirs;
impl OsDirs {
    /// `~/.config/zkhe` on linux; the working directory where the OS provides no config dir.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zkhe")
    }
}

/// Load defaults, then the config file, then `ZKHE_` environment variables.
///
/// An explicitly given `config_file` must exist. Without one, the nearest
/// `zkhe.config.yaml` above the working directory or in [`OsDirs::config_dir`] is used
/// when present.
pub fn load_config(config_file: Option<&Path>) -> Result<AppConfig> {
    let resolved = resolve_config_path(
        find_in_parent,
        &env::current_dir()?,
        &OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        config_file,
    );

    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    let found = if config_file.is_some() || resolved.exists() {
        let yaml = load_yaml_with_env(&resolved).context("Configuration file not found")?;
        figment = figment.merge(Yaml::string(&yaml));
        Some(resolved)
    } else {
        None
    };

    let mut config: AppConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;
    debug!(config_file = ?found, preset = config.preset.name(), "loaded configuration");
    config.config_file = found;
    Ok(config)
}
