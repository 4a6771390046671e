use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use engine::{JobConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV_VAR: &str = "COLONY_CONFIG";
pub const TICKS_ENV_VAR: &str = "COLONY_TICKS";
pub const SETTLERS_ENV_VAR: &str = "COLONY_SETTLERS";
pub const MAX_PATH_NODES_ENV_VAR: &str = "COLONY_MAX_PATH_NODES";
pub const BIDIRECTIONAL_ENV_VAR: &str = "COLONY_BIDIRECTIONAL";

pub const DEFAULT_MAP: &str = "\
s...........#.........
..s.........#...2.....
....,,,,....#.........
....,,,,....#....*....
.*..........#.........
............#....3....
..22........H.........
..2.........#.........
......*.....#.....*...
...P........#.........
---
............#.........
............#.........
............#.........
............#.........
............#.........
............#.........
............H.........
......................
......................
......................
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub search: SearchConfig,
    pub jobs: JobConfig,
    pub tick_count: u64,
    pub settler_count: u32,
    /// ASCII map to load instead of the built-in one.
    pub map_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            jobs: JobConfig::default(),
            tick_count: 400,
            settler_count: 2,
            map_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

type Lookup<'a> = &'a dyn Fn(&str) -> Result<String, env::VarError>;

impl SimConfig {
    /// Defaults, then the JSON file named by `COLONY_CONFIG`, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&|var| env::var(var))
    }

    pub fn load_with(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let mut config = match read_var(lookup, CONFIG_PATH_ENV_VAR)? {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    fn from_json(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        })
    }

    fn apply_env_overrides(&mut self, lookup: Lookup<'_>) -> Result<(), ConfigError> {
        if let Some(ticks) = parse_var(lookup, TICKS_ENV_VAR, "a tick count")? {
            self.tick_count = ticks;
        }
        if let Some(settlers) = parse_var(lookup, SETTLERS_ENV_VAR, "a settler count")? {
            self.settler_count = settlers;
        }
        if let Some(nodes) = parse_var(lookup, MAX_PATH_NODES_ENV_VAR, "a node count")? {
            self.search.max_node_count = nodes;
        }
        if let Some(raw) = read_var(lookup, BIDIRECTIONAL_ENV_VAR)? {
            self.search.bidirectional = match parse_flag(&raw) {
                Some(flag) => flag,
                None => {
                    return Err(ConfigError::InvalidValue {
                        var: BIDIRECTIONAL_ENV_VAR,
                        value: raw,
                        expected: "a boolean flag",
                    })
                }
            };
        }
        Ok(())
    }

    pub fn map_source(&self) -> Result<String, ConfigError> {
        match &self.map_path {
            Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            }),
            None => Ok(DEFAULT_MAP.to_owned()),
        }
    }
}

fn read_var(lookup: Lookup<'_>, var: &'static str) -> Result<Option<String>, ConfigError> {
    match lookup(var) {
        Ok(value) => {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_owned()))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::EnvVar { var, source }),
    }
}

fn parse_var<T: FromStr>(
    lookup: Lookup<'_>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = read_var(lookup, var)? else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            var,
            value: raw,
            expected,
        })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
