pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod loop_runner;
pub(crate) mod map;
pub(crate) mod policy;
pub(crate) mod tick;
pub(crate) mod world;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("map error: {0}")]
    Map(#[from] map::MapError),
}
