use std::fmt::Write;

use common::models::ParsedSignal;

pub const FOOTER: &str = "Forwarded by signal-copier";
pub const MARKET_PRICE: &str = "Market Price";

/// Fixed business mapping from percentage tokens to entry multipliers.
/// Only these exact tokens are converted; every other token is relayed as-is.
const TP_MULTIPLIERS: [(&str, f64); 2] = [("500%", 1.1), ("1000%", 2.2)];

fn fixed(value: f64) -> String {
    format!("{:.5}", value)
}

pub fn render_entry(entry_price: Option<f64>) -> String {
    entry_price.map_or_else(|| MARKET_PRICE.to_string(), fixed)
}

pub fn render_take_profit(token: &str, entry_price: Option<f64>) -> String {
    let multiplier = TP_MULTIPLIERS
        .iter()
        .find(|(literal, _)| *literal == token)
        .map(|(_, m)| *m);

    match (entry_price, multiplier) {
        (Some(entry), Some(multiplier)) => fixed(entry * multiplier),
        _ => token.to_string(),
    }
}

/// Serializes a signal into the relay template:
///
/// ```text
/// LONG #BTCUSDT
/// Leverage: 20x
/// Entry: 100.00000
/// TP1: 110
/// SL: 90
///
/// Forwarded by signal-copier
/// ```
pub fn render(signal: &ParsedSignal) -> String {
    let mut body = String::with_capacity(128);

    // Writing into a String cannot fail.
    let _ = writeln!(body, "{} {}", signal.direction, signal.pair);
    let _ = writeln!(body, "Leverage: {}x", signal.leverage);
    let _ = writeln!(body, "Entry: {}", render_entry(signal.entry_price));
    for (i, token) in signal.take_profits.iter().enumerate() {
        let _ = writeln!(
            body,
            "TP{}: {}",
            i + 1,
            render_take_profit(token, signal.entry_price)
        );
    }
    let _ = writeln!(body, "SL: {}", signal.stop_loss);
    body.push('\n');
    body.push_str(FOOTER);

    body
}
