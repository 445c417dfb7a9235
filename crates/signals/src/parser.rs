use std::sync::Arc;

use common::{models::ParsedSignal, oracle::PriceOracle};
use tracing::{debug, warn};

use crate::patterns;

/// Canonical pair form: uppercase, no `/`, leading `#`.
pub fn canonical_pair(raw: &str) -> String {
    let pair = raw.to_uppercase().replace('/', "");
    if pair.starts_with('#') {
        pair
    } else {
        format!("#{}", pair)
    }
}

fn parse_price(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// Applies every pattern to `text` without touching the network. Fields the
/// message does not state keep their defaults.
pub fn extract(text: &str) -> ParsedSignal {
    let mut signal = ParsedSignal::default();

    if let Some(direction) = patterns::direction(text) {
        signal.direction = direction;
    }

    if let Some(raw) = patterns::pair(text) {
        signal.pair = canonical_pair(raw);
    }

    if let Some(cap) = patterns::leverage(text) {
        signal.leverage = cap.value.parse().unwrap_or(0);
    }

    if let Some(token) = patterns::entry(text) {
        signal.entry_price = parse_price(token);
        if signal.entry_price.is_none() {
            debug!("Ignoring unusable entry token {:?}", token);
        }
    }

    signal.push_take_profits(patterns::take_profits(text).into_iter().map(|c| c.value));

    if let Some(token) = patterns::stop_loss(text) {
        signal.stop_loss = token.to_string();
    }

    signal
}

/// Builds signals from raw messages, falling back to the live market price
/// when a message names a pair but no entry.
#[derive(Clone)]
pub struct SignalParser {
    oracle: Arc<dyn PriceOracle>,
}

impl SignalParser {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self { oracle }
    }

    pub async fn parse(&self, text: &str) -> ParsedSignal {
        let mut signal = extract(text);

        if signal.entry_price.is_none() {
            if let Some(symbol) = signal.exchange_symbol() {
                signal.entry_price = self
                    .oracle
                    .fetch_price(&symbol)
                    .await
                    .filter(|price| price.is_finite() && *price > 0.0);

                if signal.entry_price.is_none() {
                    warn!("No market price for {}, entry left as market", symbol);
                }
            }
        }

        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::Direction;
    use mockall::mock;

    mock! {
        pub Oracle {}

        #[async_trait]
        impl PriceOracle for Oracle {
            async fn fetch_price(&self, symbol: &str) -> Option<f64>;
        }
    }

    fn parser_with(oracle: MockOracle) -> SignalParser {
        SignalParser::new(Arc::new(oracle))
    }

    fn untouched_oracle() -> MockOracle {
        let mut oracle = MockOracle::new();
        oracle.expect_fetch_price().never();
        oracle
    }

    #[test]
    fn canonicalizes_pairs() {
        assert_eq!(canonical_pair("btc/usdt"), "#BTCUSDT");
        assert_eq!(canonical_pair("#ETH/USDT"), "#ETHUSDT");
    }

    #[test]
    fn extracts_full_signal() {
        let signal = extract("LONG BTC/USDT ENTRY 100 LEVERAGE 20x TP1 110 TP2 120 SL 90");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.pair, "#BTCUSDT");
        assert_eq!(signal.leverage, 20);
        assert_eq!(signal.entry_price, Some(100.0));
        assert_eq!(signal.take_profits, vec!["110", "120"]);
        assert_eq!(signal.stop_loss, "90");
    }

    #[test]
    fn garbage_yields_defaults() {
        for text in ["", "   ", "hello world", "🚀🚀🚀", "ENTRY", "TP SL LEVERAGE"] {
            assert_eq!(extract(text), ParsedSignal::default(), "input {:?}", text);
        }
    }

    #[test]
    fn leverage_is_normalized_to_an_integer() {
        assert_eq!(extract("Leverage 05x").leverage, 5);
        assert_eq!(extract("Cross 007").leverage, 7);
    }

    #[test]
    fn zero_entry_counts_as_absent() {
        assert_eq!(extract("Entry 0").entry_price, None);
        assert_eq!(extract("Entry 0.00").entry_price, None);
    }

    #[test]
    fn take_profits_dedup_then_truncate() {
        let signal = extract("TP1 1 TP2 2 TP3 1 TP4 3 TP5 4 TP6 5 TP7 6 TP8 7");
        assert_eq!(signal.take_profits, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn multiline_message() {
        let text = "🔥 SHORT\n#SOL/USDT\nCross 10x\nEntry: 150.5\nTP1: 140\nTP2: 130\nSL: 160";
        let signal = extract(text);
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.pair, "#SOLUSDT");
        assert_eq!(signal.leverage, 10);
        assert_eq!(signal.entry_price, Some(150.5));
        assert_eq!(signal.take_profits, vec!["140", "130"]);
        assert_eq!(signal.stop_loss, "160");
    }

    #[tokio::test]
    async fn explicit_entry_skips_oracle() {
        let parser = parser_with(untouched_oracle());
        let signal = parser.parse("LONG BTC/USDT ENTRY 100").await;
        assert_eq!(signal.entry_price, Some(100.0));
    }

    #[tokio::test]
    async fn missing_entry_uses_market_price() {
        let mut oracle = MockOracle::new();
        oracle
            .expect_fetch_price()
            .withf(|symbol: &str| symbol == "ETHUSDT")
            .times(1)
            .returning(|_| Some(3120.25));

        let signal = parser_with(oracle).parse("short eth/usdt TP1 3000").await;
        assert_eq!(signal.entry_price, Some(3120.25));
        assert_eq!(signal.direction, Direction::Short);
    }

    #[tokio::test]
    async fn unavailable_oracle_leaves_entry_empty() {
        let mut oracle = MockOracle::new();
        oracle.expect_fetch_price().times(1).returning(|_| None);

        let signal = parser_with(oracle).parse("LONG BTC/USDT TP1 500%").await;
        assert_eq!(signal.entry_price, None);
        assert_eq!(signal.take_profits, vec!["500%"]);
    }

    #[tokio::test]
    async fn no_pair_means_no_lookup() {
        let parser = parser_with(untouched_oracle());
        let signal = parser.parse("LONG something TP1 10").await;
        assert_eq!(signal.pair, "#PAIR");
        assert_eq!(signal.entry_price, None);
    }

    #[tokio::test]
    async fn zero_entry_falls_back_to_oracle() {
        let mut oracle = MockOracle::new();
        oracle.expect_fetch_price().times(1).returning(|_| Some(2.5));

        let signal = parser_with(oracle).parse("ADA/USDT Entry 0").await;
        assert_eq!(signal.entry_price, Some(2.5));
    }
}
