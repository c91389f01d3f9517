use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    lookup::{Error, FlightLookup},
    model::{FlightOption, FlightQuery},
};

/// In-memory lookup that serves fixed options per destination code.
///
/// File format:
/// ```json
/// { "routes": { "LAX": [{ "id": "f1", "airline": "Acme", "price": 100, "duration": "2h" }] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    routes: BTreeMap<String, Vec<FlightOption>>,
    #[serde(skip)]
    latency: Option<Duration>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, destination: &str, options: Vec<FlightOption>) -> Self {
        self.routes.insert(route_key(destination), options);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|cause| Error::IO {
            message: format!("Failed to read catalog file at {path:?}"),
            cause,
        })?;
        let catalog: Self = serde_json::from_slice(&data)?;
        let routes = catalog
            .routes
            .into_iter()
            .map(|(destination, options)| (route_key(&destination), options))
            .collect::<BTreeMap<_, _>>();
        info!("Catalog loaded from {path:?}: {} routes", routes.len());
        Ok(Self {
            routes,
            latency: None,
        })
    }

    pub fn sample() -> Self {
        Self::new()
            .with_route(
                "LAX",
                vec![
                    option("lax-1", "Pacific Air", 189.0, "5h 20m"),
                    option("lax-2", "SkyLine", 214.5, "4h 55m"),
                    option("lax-3", "Budget Wings", 129.0, "7h 10m"),
                ],
            )
            .with_route(
                "JFK",
                vec![
                    option("jfk-1", "Atlantic Express", 249.0, "6h 05m"),
                    option("jfk-2", "SkyLine", 279.0, "5h 40m"),
                ],
            )
            .with_route(
                "SEA",
                vec![option("sea-1", "Cascade Air", 159.0, "2h 45m")],
            )
    }

    fn validate(query: &FlightQuery) -> Result<(), Error> {
        if query.destination.trim().is_empty() {
            return Err(Error::InvalidQuery("destination is required".to_string()));
        }
        if query.departure.trim().is_empty() {
            return Err(Error::InvalidQuery("departure date is required".to_string()));
        }
        if let Some(arrival) = &query.arrival {
            if arrival.trim().is_empty() {
                return Err(Error::InvalidQuery(
                    "return date is required for a roundtrip".to_string(),
                ));
            }
            // ISO-8601 dates order lexicographically.
            if arrival.as_str() < query.departure.as_str() {
                return Err(Error::InvalidQuery(format!(
                    "return date {arrival} is before departure {}",
                    query.departure
                )));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FlightLookup for Catalog {
    async fn fetch_options(&self, query: &FlightQuery) -> Result<Vec<FlightOption>, Error> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Self::validate(query)?;

        let options = self
            .routes
            .get(&route_key(&query.destination))
            .cloned()
            .unwrap_or_default();
        debug!(
            "Catalog lookup for {}: {} options",
            query.destination,
            options.len()
        );
        Ok(options)
    }
}

fn route_key(destination: &str) -> String {
    destination.trim().to_ascii_uppercase()
}

fn option(id: &str, airline: &str, price: f64, duration: &str) -> FlightOption {
    FlightOption {
        id: id.to_string(),
        airline: airline.to_string(),
        price,
        duration_label: duration.to_string(),
    }
}
