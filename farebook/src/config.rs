use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::lookup;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: lookup::Config,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|cause| Error::IO {
            message: format!("Failed to read config file at {path:?}"),
            cause,
        })?;
        let config = serde_json::from_slice(&data)?;
        info!("Config loaded from {path:?}");
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {message}: {cause}")]
    IO { message: String, cause: io::Error },
    #[error("Serde JSON error: {0}")]
    JSON(#[from] serde_json::Error),
}
