use rust_decimal::Decimal;
use serde::Serialize;

/// Result of one on-demand price check for a watched symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolStatus {
    pub symbol: String,
    pub target: Decimal,
    pub price: Option<Decimal>,
    pub reached: bool,
    pub error: Option<String>,
}
