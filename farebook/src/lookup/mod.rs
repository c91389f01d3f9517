mod catalog;
mod error;

use std::{path::PathBuf, time::Duration};

pub use catalog::Catalog;
pub use error::Error;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{FlightOption, FlightQuery};

/// Where flight options come from.
///
/// A workflow makes exactly one call per submit and never retries. Any error
/// collapses into the same failed status on the workflow side.
#[async_trait::async_trait]
pub trait FlightLookup: Send + Sync {
    async fn fetch_options(&self, query: &FlightQuery) -> Result<Vec<FlightOption>, Error>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// JSON catalog to serve options from. The built-in sample is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default, with = "humantime_serde")]
    pub latency: Option<Duration>,
}

impl Config {
    pub(crate) fn build(&self) -> Result<Catalog, Error> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => {
                info!("No catalog path configured. Using the sample catalog.");
                Catalog::sample()
            }
        };
        Ok(match self.latency {
            Some(latency) => catalog.with_latency(latency),
            None => catalog,
        })
    }
}
