use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoffeeKind {
    Cappuccino,
    Espresso,
    Latte,
    Mocha,
}

impl CoffeeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cappuccino => "cappuccino",
            Self::Espresso => "espresso",
            Self::Latte => "latte",
            Self::Mocha => "mocha",
        }
    }
}

impl fmt::Display for CoffeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoffeeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cappuccino" => Ok(Self::Cappuccino),
            "espresso" => Ok(Self::Espresso),
            "latte" => Ok(Self::Latte),
            "mocha" => Ok(Self::Mocha),
            other => Err(format!("unknown coffee kind: {other}")),
        }
    }
}

/// A single line of a coffee order.
///
/// The kind doubles as a display key, but nothing prevents two lines
/// with the same kind from coexisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "type")]
    pub kind: CoffeeKind,
    pub price: f64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(kind: CoffeeKind, price: f64, quantity: u32) -> Self {
        Self {
            kind,
            price,
            quantity,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}
