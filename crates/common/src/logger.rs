use tracing_subscriber::{EnvFilter, filter::Directive};

const DEFAULT_LEVEL: &str = "info";

/// Builds the filter from a `LOG_LEVEL` style string ("INFO", "debug",
/// "executor=trace,info", ...). Unknown input falls back to `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    let level = level.trim().to_lowercase();
    let filter = EnvFilter::try_new(if level.is_empty() { DEFAULT_LEVEL } else { level.as_str() })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    ["hyper=warn", "reqwest=warn"]
        .into_iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(filter, |f, directive| f.add_directive(directive))
}

pub fn setup_logger(level: &str) {
    tracing_subscriber::fmt()
        // .with_file(true)
        // .with_line_number(true)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(build_filter(level))
        .init();
}
