use std::{env, fmt};

use market_data::remote::DEFAULT_REST_URL;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// A chat as named in the environment: `@handle`, numeric id, or any other
/// string passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatRef {
    Id(i64),
    Handle(String),
}

impl ChatRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('@') {
            return Some(Self::Handle(raw.to_string()));
        }

        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i64>() {
                return Some(Self::Id(id));
            }
        }
        Some(Self::Handle(raw.to_string()))
    }

    pub fn matches(&self, chat_id: i64, username: Option<&str>) -> bool {
        match self {
            Self::Id(id) => *id == chat_id,
            Self::Handle(handle) => username.is_some_and(|name| {
                handle
                    .trim_start_matches('@')
                    .eq_ignore_ascii_case(name.trim_start_matches('@'))
            }),
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Handle(handle) => f.write_str(handle),
        }
    }
}

#[derive(Clone)]
pub struct RelayConfig {
    pub bot_token: String,
    pub source_chat: Option<ChatRef>,
    pub target_chat: Option<ChatRef>,
    pub port: u16,
    pub binance_base_url: String,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_token", &"<redacted>")
            .field("source_chat", &self.source_chat)
            .field("target_chat", &self.target_chat)
            .field("port", &self.port)
            .field("binance_base_url", &self.binance_base_url)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let port = match lookup("PORT").map(|p| p.trim().to_string()) {
            Some(raw) if !raw.is_empty() => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
            })?,
            _ => DEFAULT_PORT,
        };

        let binance_base_url = lookup("BINANCE_BASE_URL")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_REST_URL.to_string());

        Ok(Self {
            bot_token,
            source_chat: lookup("SOURCE_CHAT").and_then(|s| ChatRef::parse(&s)),
            target_chat: lookup("TARGET_CHAT").and_then(|s| ChatRef::parse(&s)),
            port,
            binance_base_url,
        })
    }
}

/// Read before the rest of the config so startup errors are logged.
pub fn log_level_from_env() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}
