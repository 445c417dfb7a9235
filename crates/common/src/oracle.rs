use async_trait::async_trait;

/// Source of current market prices. Implementations fail soft: any
/// transport or decoding problem is reported as `None`.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// `symbol` is the bare exchange symbol, e.g. `BTCUSDT`.
    async fn fetch_price(&self, symbol: &str) -> Option<f64>;
}
