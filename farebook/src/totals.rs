use serde::{Deserialize, Serialize};

use crate::model::{CoffeeKind, OrderLine};

/// An ordered list of coffee orders and their running total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    lines: Vec<OrderLine>,
}

impl OrderTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_order(&mut self, kind: CoffeeKind, price: f64, quantity: u32) {
        self.lines.push(OrderLine::new(kind, price, quantity));
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .fold(0.0, |acc, line| acc + line.subtotal())
    }
}

impl FromIterator<OrderLine> for OrderTotals {
    fn from_iter<T: IntoIterator<Item = OrderLine>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}
