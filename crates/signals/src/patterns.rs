//! Case-insensitive matchers, one per signal field. Every matcher reports the
//! leftmost match only, except take-profits which are collected in order.

use std::sync::LazyLock;

use common::models::Direction;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static signal pattern must compile")
}

static DIRECTION_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(LONG|SHORT)\b"));
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)([A-Z]{2,10}/USDT)"));
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)ENTRY.*?(?:PRICE|NOW)?[: ]*([0-9]*\.?[0-9]+)"));
static LEVERAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(LEVERAGE|CROSS).*?([0-9]{1,3})\s*x?"));
static TAKE_PROFIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(TP[0-9]*|TAKE PROFIT)\s*[:=]?\s*([0-9]+%|[0-9]*\.?[0-9]+)")
});
static STOP_LOSS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)SL\s*[:=]?\s*([0-9]*\.?[0-9]+)"));

/// A labelled value, e.g. `TP2` / `120` or `CROSS` / `25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

pub fn direction(text: &str) -> Option<Direction> {
    let caps = DIRECTION_RE.captures(text)?;
    if caps[1].eq_ignore_ascii_case("SHORT") {
        Some(Direction::Short)
    } else {
        Some(Direction::Long)
    }
}

/// Raw `BASE/USDT` token as written in the message.
pub fn pair(text: &str) -> Option<&str> {
    PAIR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Numeric token following `ENTRY` (optionally `ENTRY PRICE` / `ENTRY NOW`).
pub fn entry(text: &str) -> Option<&str> {
    ENTRY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn leverage(text: &str) -> Option<Capture<'_>> {
    let caps = LEVERAGE_RE.captures(text)?;
    Some(Capture {
        label: caps.get(1)?.as_str(),
        value: caps.get(2)?.as_str(),
    })
}

/// Every take-profit occurrence in document order, duplicates included.
pub fn take_profits(text: &str) -> Vec<Capture<'_>> {
    TAKE_PROFIT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(Capture {
                label: caps.get(1)?.as_str(),
                value: caps.get(2)?.as_str().trim(),
            })
        })
        .collect()
}

pub fn stop_loss(text: &str) -> Option<&str> {
    STOP_LOSS_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
