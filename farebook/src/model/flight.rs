use serde::{Deserialize, Serialize};

use super::criteria::PassengerCount;

/// A bookable option produced by a lookup. Ids are unique within one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub id: String,
    pub airline: String,
    pub price: f64,
    #[serde(rename = "duration")]
    pub duration_label: String,
}

/// Priced view of the selected option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub option: FlightOption,
    pub passengers: PassengerCount,
    pub total_price: f64,
}

impl BookingSummary {
    pub fn new(option: &FlightOption, passengers: PassengerCount) -> Self {
        Self {
            option: option.clone(),
            passengers,
            total_price: option.price * f64::from(passengers.get()),
        }
    }
}
