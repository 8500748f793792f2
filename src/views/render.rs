use rust_decimal::Decimal;
use serde_json::json;

use crate::{models::SymbolStatus, templates::Hbs};

fn render(hbs: &Hbs, tpl: &str, ctx: serde_json::Value) -> Result<String, String> {
    hbs.render(tpl, &ctx)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| e.to_string())
}

pub fn target_hit(hbs: &Hbs, symbol: &str, price: Decimal, target: Decimal) -> Result<String, String> {
    render(
        hbs,
        "messages/target_hit",
        json!({
            "symbol": symbol,
            "price": price.normalize().to_string(),
            "target": target.normalize().to_string(),
        }),
    )
}

pub fn market_closed(hbs: &Hbs) -> Result<String, String> {
    render(hbs, "messages/market_closed", json!({}))
}

pub fn monitoring_started(hbs: &Hbs, count: usize) -> Result<String, String> {
    render(hbs, "messages/monitoring_started", json!({ "count": count }))
}

pub fn status_report(hbs: &Hbs, items: &[SymbolStatus]) -> Result<String, String> {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|s| {
            json!({
                "symbol": s.symbol,
                "target": s.target.normalize().to_string(),
                "price": s.price.map(|p| p.round_dp(2).to_string()),
                "reached": s.reached,
                "error": s.error.as_deref().unwrap_or("No data available"),
            })
        })
        .collect();

    let ctx = json!({
        "items": if items.is_empty() { serde_json::Value::Null } else { serde_json::Value::Array(items) }
    });

    render(hbs, "messages/status", ctx)
}

pub fn help(hbs: &Hbs) -> Result<String, String> {
    render(hbs, "messages/help", json!({}))
}
