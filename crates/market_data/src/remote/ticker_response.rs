use serde::Deserialize;

use crate::{remote::OracleError, traits::RemoteResponse};

/// Binance sends prices as strings; plain JSON numbers are tolerated too.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PriceField {
    Text(String),
    Number(f64),
}

#[derive(Deserialize, Debug)]
pub struct TickerPriceResponse {
    #[serde(default)]
    pub symbol: String,
    pub price: PriceField,
}

impl RemoteResponse<f64> for TickerPriceResponse {
    type Error = OracleError;

    fn to_model(&self) -> Result<f64, OracleError> {
        let price = match &self.price {
            PriceField::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| OracleError::Malformed(format!("price {:?}: {}", raw, e)))?,
            PriceField::Number(value) => *value,
        };

        if !price.is_finite() || price <= 0.0 {
            return Err(OracleError::Malformed(format!(
                "non-positive price {} for {}",
                price, self.symbol
            )));
        }
        Ok(price)
    }
}
