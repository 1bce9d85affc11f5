use std::{io, path::PathBuf, time::Duration};

use shared::error::RegionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("frame source unavailable: {source}")]
    SourceUnavailable { source: anyhow::Error },
    #[error("failed to spawn tracking thread: {0}")]
    Spawn(#[source] io::Error),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error("tracking thread did not stop within {timeout:?}")]
    StopTimeout { timeout: Duration },
    #[error("tracking thread panicked")]
    LoopPanicked,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value '{value}' for {key}")]
    InvalidOverride { key: String, value: String },
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read gesture script '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse gesture script: {0}")]
    Parse(#[from] serde_json::Error),
}
