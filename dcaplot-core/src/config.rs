use std::path::{Path, PathBuf};

use serde::Deserialize;

use dcaplot_types::{DEFAULT_BUS_COUNT, MAX_BUSES};

use crate::state::ShowSettings;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    runtime: RuntimeConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    bus_count: Option<usize>,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    track_inheritance: Option<bool>,
    auto_name_buses: Option<bool>,
    sink: Option<String>,
}

/// Which sink executed actions are handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Nothing is transmitted; live state is updated anyway.
    None,
    #[default]
    Log,
}

pub struct Config {
    defaults: DefaultsConfig,
    runtime: RuntimeConfig,
}

impl Config {
    /// Embedded defaults overridden by the user's config file, if any.
    pub fn load() -> Self {
        Self::load_with(user_config_path().as_deref())
    }

    /// Embedded defaults overridden by the file at `path`.
    pub fn load_from(path: &Path) -> Self {
        Self::load_with(Some(path))
    }

    fn load_with(path: Option<&Path>) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_defaults(&mut base.defaults, user.defaults);
                            merge_runtime(&mut base.runtime, user.runtime);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            defaults: base.defaults,
            runtime: base.runtime,
        }
    }

    /// Bus count for new shows (clamped to 1..=MAX_BUSES).
    pub fn default_bus_count(&self) -> usize {
        self.defaults
            .bus_count
            .unwrap_or(DEFAULT_BUS_COUNT)
            .clamp(1, MAX_BUSES)
    }

    pub fn settings(&self) -> ShowSettings {
        let fallback = ShowSettings::default();
        ShowSettings {
            track_inheritance: self
                .runtime
                .track_inheritance
                .unwrap_or(fallback.track_inheritance),
            auto_name_buses: self
                .runtime
                .auto_name_buses
                .unwrap_or(fallback.auto_name_buses),
        }
    }

    pub fn sink(&self) -> SinkKind {
        self.runtime
            .sink
            .as_deref()
            .and_then(parse_sink)
            .unwrap_or_default()
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dcaplot").join("config.toml"))
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.bus_count.is_some() {
        base.bus_count = user.bus_count;
    }
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.track_inheritance.is_some() {
        base.track_inheritance = user.track_inheritance;
    }
    if user.auto_name_buses.is_some() {
        base.auto_name_buses = user.auto_name_buses;
    }
    if user.sink.is_some() {
        base.sink = user.sink;
    }
}

fn parse_sink(s: &str) -> Option<SinkKind> {
    match s.to_lowercase().as_str() {
        "none" | "off" => Some(SinkKind::None),
        "log" => Some(SinkKind::Log),
        other => {
            log::warn!(target: "config", "unknown sink {:?}, using log", other);
            None
        }
    }
}
