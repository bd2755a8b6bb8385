use crate::telemetry::LogLevel;

const DEFAULT_NAVBAR_SCROLL_THRESHOLD: u64 = 50;
const DEFAULT_NAVBAR_THROTTLE_MS: u64 = 10;
const DEFAULT_ACTIVE_LINK_THROTTLE_MS: u64 = 100;
const DEFAULT_ACTIVE_LINK_OFFSET: u64 = 100;
const DEFAULT_PARALLAX_THROTTLE_MS: u64 = 16;
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const NAVBAR_SCROLL_THRESHOLD_BOUNDS: (u64, u64) = (0, 2_000);
const NAVBAR_THROTTLE_MS_BOUNDS: (u64, u64) = (1, 1_000);
const ACTIVE_LINK_THROTTLE_MS_BOUNDS: (u64, u64) = (1, 2_000);
const ACTIVE_LINK_OFFSET_BOUNDS: (u64, u64) = (0, 2_000);
const PARALLAX_THROTTLE_MS_BOUNDS: (u64, u64) = (1, 1_000);
const RESIZE_DEBOUNCE_MS_BOUNDS: (u64, u64) = (10, 5_000);

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub navbar_scroll_threshold: f64,
    pub navbar_throttle_ms: u64,
    pub active_link_throttle_ms: u64,
    pub active_link_offset: f64,
    pub parallax_enabled: bool,
    pub parallax_throttle_ms: u64,
    pub resize_debounce_ms: u64,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            navbar_scroll_threshold: DEFAULT_NAVBAR_SCROLL_THRESHOLD as f64,
            navbar_throttle_ms: DEFAULT_NAVBAR_THROTTLE_MS,
            active_link_throttle_ms: DEFAULT_ACTIVE_LINK_THROTTLE_MS,
            active_link_offset: DEFAULT_ACTIVE_LINK_OFFSET as f64,
            parallax_enabled: false,
            parallax_throttle_ms: DEFAULT_PARALLAX_THROTTLE_MS,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl SiteConfig {
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let navbar_scroll_threshold = parse_u64_with_bounds(
            lookup("data-navbar-threshold"),
            DEFAULT_NAVBAR_SCROLL_THRESHOLD,
            NAVBAR_SCROLL_THRESHOLD_BOUNDS,
        );
        let navbar_throttle_ms = parse_u64_with_bounds(
            lookup("data-navbar-throttle-ms"),
            DEFAULT_NAVBAR_THROTTLE_MS,
            NAVBAR_THROTTLE_MS_BOUNDS,
        );
        let active_link_throttle_ms = parse_u64_with_bounds(
            lookup("data-active-link-throttle-ms"),
            DEFAULT_ACTIVE_LINK_THROTTLE_MS,
            ACTIVE_LINK_THROTTLE_MS_BOUNDS,
        );
        let active_link_offset = parse_u64_with_bounds(
            lookup("data-active-link-offset"),
            DEFAULT_ACTIVE_LINK_OFFSET,
            ACTIVE_LINK_OFFSET_BOUNDS,
        );
        let parallax_throttle_ms = parse_u64_with_bounds(
            lookup("data-parallax-throttle-ms"),
            DEFAULT_PARALLAX_THROTTLE_MS,
            PARALLAX_THROTTLE_MS_BOUNDS,
        );
        let resize_debounce_ms = parse_u64_with_bounds(
            lookup("data-resize-debounce-ms"),
            DEFAULT_RESIZE_DEBOUNCE_MS,
            RESIZE_DEBOUNCE_MS_BOUNDS,
        );

        Self {
            navbar_scroll_threshold: navbar_scroll_threshold as f64,
            navbar_throttle_ms,
            active_link_throttle_ms,
            active_link_offset: active_link_offset as f64,
            parallax_enabled: parse_switch(lookup("data-parallax"), false),
            parallax_throttle_ms,
            resize_debounce_ms,
            log_level: parse_log_level(lookup("data-log-level"), DEFAULT_LOG_LEVEL),
        }
    }
}

fn parse_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64_with_bounds(value: Option<String>, default: u64, bounds: (u64, u64)) -> u64 {
    parse_non_empty(value)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_switch(value: Option<String>, default: bool) -> bool {
    match parse_non_empty(value)
        .map(|value| value.to_ascii_lowercase())
        .as_deref()
    {
        Some("on" | "true" | "1") => true,
        Some("off" | "false" | "0") => false,
        _ => default,
    }
}

fn parse_log_level(value: Option<String>, default: LogLevel) -> LogLevel {
    parse_non_empty(value)
        .and_then(|value| LogLevel::from_str(&value))
        .unwrap_or(default)
}
