use std::time::Duration;

use async_trait::async_trait;
use common::oracle::PriceOracle;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    remote::{OracleError, TickerPriceResponse},
    traits::RemoteResponse,
};

pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Public (unsigned) Binance REST client used as the price oracle.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, OracleError> {
        Self::with_timeout(base_url, QUOTE_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .user_agent("signal_copier/0.1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_ticker_price(&self, symbol: &str) -> Result<f64, OracleError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.to_uppercase())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let ticker = serde_json::from_str::<TickerPriceResponse>(&body)
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        ticker.to_model()
    }
}

#[async_trait]
impl PriceOracle for BinanceClient {
    async fn fetch_price(&self, symbol: &str) -> Option<f64> {
        match self.get_ticker_price(symbol).await {
            Ok(price) => {
                debug!("Market price for {}: {}", symbol, price);
                Some(price)
            }
            Err(e) => {
                warn!("Could not fetch market price for {}: {}", symbol, e);
                None
            }
        }
    }
}
