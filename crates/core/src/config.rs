//! Config file discovery for the briefer.
//!
//! Precedence is CLI flag, environment, config file, defaults. Only the file
//! half lives here; flags and env vars are merged by the binary.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Where the briefer's settings came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// `--config` or the config env var
    Explicit(PathBuf),
    /// ./briefer.toml
    CurrentDir(PathBuf),
    /// $XDG_CONFIG_HOME/skybrief or ~/.config/skybrief
    XdgConfig(PathBuf),
    /// /etc/skybrief
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => f.write_str("(defaults)"),
        }
    }
}

fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Candidate locations for `filename`, most specific first
fn search_path(filename: &str) -> Vec<ConfigSource> {
    let mut candidates = vec![ConfigSource::CurrentDir(PathBuf::from(filename))];
    if let Some(home) = config_home() {
        candidates.push(ConfigSource::XdgConfig(home.join(APP_NAME).join(filename)));
    }
    candidates.push(ConfigSource::System(
        PathBuf::from("/etc").join(APP_NAME).join(filename),
    ));
    candidates
}

/// Locate `filename`, preferring the path named by `env_var`. A stale env var
/// is reported and the standard locations are searched instead.
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Some(path) = env::var_os(env_var).map(PathBuf::from) {
        if path.is_file() {
            return ConfigSource::Explicit(path);
        }
        warn!("{} points at missing file {}, searching defaults", env_var, path.display());
    }

    let found = search_path(filename)
        .into_iter()
        .find(|candidate| candidate.path().is_some_and(|p| p.is_file()))
        .unwrap_or(ConfigSource::Defaults);
    debug!("config source: {}", found);
    found
}

/// Parse the TOML file behind `source`; `Defaults` yields `T::default()`.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Like [`load_config`], but a broken file is logged and replaced by defaults
pub fn load_config_or_default<T: DeserializeOwned + Default>(source: &ConfigSource) -> T {
    load_config(source).unwrap_or_else(|e| {
        warn!("ignoring config file {}: {}", source, e);
        T::default()
    })
}
