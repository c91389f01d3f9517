use serde::{Deserialize, Serialize};

use super::Error;

/// Number of travellers on a booking, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PassengerCount(u8);

impl PassengerCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for PassengerCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for PassengerCount {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::PassengerCountOutOfRange(value))
        }
    }
}

impl From<PassengerCount> for u8 {
    fn from(count: PassengerCount) -> Self {
        count.0
    }
}

/// What the user has typed into the search form so far.
///
/// Updates go through the `with_*` methods, each of which consumes the
/// criteria and hands back a copy with exactly one field replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub destination: String,
    pub departure_date: String,
    /// Only meaningful while `is_roundtrip` is set.
    pub return_date: String,
    pub passengers: PassengerCount,
    pub is_roundtrip: bool,
}

impl SearchCriteria {
    pub fn with_destination(self, destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..self
        }
    }

    pub fn with_departure_date(self, departure_date: impl Into<String>) -> Self {
        Self {
            departure_date: departure_date.into(),
            ..self
        }
    }

    pub fn with_return_date(self, return_date: impl Into<String>) -> Self {
        Self {
            return_date: return_date.into(),
            ..self
        }
    }

    pub fn with_passengers(self, passengers: PassengerCount) -> Self {
        Self { passengers, ..self }
    }

    pub fn with_roundtrip(self, is_roundtrip: bool) -> Self {
        Self {
            is_roundtrip,
            ..self
        }
    }

    pub fn requires_return_date(&self) -> bool {
        self.is_roundtrip
    }

    /// The part of the criteria a lookup gets to see.
    pub fn to_query(&self) -> FlightQuery {
        FlightQuery {
            destination: self.destination.clone(),
            departure: self.departure_date.clone(),
            arrival: self
                .requires_return_date()
                .then(|| self.return_date.clone()),
            passengers: self.passengers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightQuery {
    pub destination: String,
    pub departure: String,
    pub arrival: Option<String>,
    pub passengers: PassengerCount,
}
