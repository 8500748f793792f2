use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the watchlist. `symbol` is always stored uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub symbol: String,
    pub target: Decimal,
}

impl WatchEntry {
    pub fn new(symbol: &str, target: Decimal) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            target,
        }
    }
}
