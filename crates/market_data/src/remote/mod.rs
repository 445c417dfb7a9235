use thiserror::Error;

pub mod binance_client;
pub mod ticker_response;

pub use binance_client::BinanceClient;
pub use ticker_response::TickerPriceResponse;

pub const DEFAULT_REST_URL: &str = "https://api.binance.com";

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Quote endpoint answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed quote response: {0}")]
    Malformed(String),
}
