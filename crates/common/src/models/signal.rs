use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder pair used when the message names no `XXX/USDT` instrument.
pub const DEFAULT_PAIR: &str = "#PAIR";
pub const DEFAULT_STOP_LOSS: &str = "N/A";
pub const MAX_TAKE_PROFITS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trading signal extracted from one source message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSignal {
    pub direction: Direction,
    /// Canonical `#BASEQUOTE` form, always starts with `#`.
    pub pair: String,
    pub leverage: u32,
    pub entry_price: Option<f64>,
    /// Raw tokens ("110", "500%"), unique and in message order.
    pub take_profits: Vec<String>,
    pub stop_loss: String,
}

impl Default for ParsedSignal {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            pair: DEFAULT_PAIR.to_string(),
            leverage: 0,
            entry_price: None,
            take_profits: Vec::new(),
            stop_loss: DEFAULT_STOP_LOSS.to_string(),
        }
    }
}

impl ParsedSignal {
    pub fn has_pair(&self) -> bool {
        self.pair != DEFAULT_PAIR
    }

    /// Exchange symbol for quote lookups, e.g. `#BTCUSDT` -> `BTCUSDT`.
    pub fn exchange_symbol(&self) -> Option<String> {
        if !self.has_pair() {
            return None;
        }
        let symbol = self.pair.replace(['#', '/'], "").to_uppercase();
        (!symbol.is_empty()).then_some(symbol)
    }

    /// Appends take-profit tokens, skipping ones already present and
    /// stopping at `MAX_TAKE_PROFITS`.
    pub fn push_take_profits<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            if self.take_profits.len() >= MAX_TAKE_PROFITS {
                break;
            }
            let token = token.into();
            if !self.take_profits.contains(&token) {
                self.take_profits.push(token);
            }
        }
    }
}
