use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub event: &'static str,
    pub fields: Value,
}

impl LogRecord {
    pub fn new(level: LogLevel, event: &'static str, fields: Value) -> Self {
        Self {
            level,
            event,
            fields,
        }
    }

    pub fn to_line(&self, ts_millis: u64) -> String {
        let mut payload = Map::new();
        payload.insert("ts".to_string(), Value::from(ts_millis));
        payload.insert("level".to_string(), Value::String(self.level.as_str().to_string()));
        payload.insert("event".to_string(), Value::String(self.event.to_string()));

        if let Value::Object(extra) = &self.fields {
            for (key, value) in extra {
                payload.insert(key.clone(), value.clone());
            }
        }

        Value::Object(payload).to_string()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Logger {
    min_level: LogLevel,
}

impl Logger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn emit(&self, record: &LogRecord) {
        if !self.enabled(record.level) {
            return;
        }

        write_line(record.level, &record.to_line(now_unix_millis()));
    }

    pub fn log_event(&self, level: LogLevel, event: &'static str, fields: Value) {
        self.emit(&LogRecord::new(level, event, fields));
    }
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: LogLevel, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Debug => web_sys::console::debug_1(&line),
        LogLevel::Info => web_sys::console::info_1(&line),
        LogLevel::Warn => web_sys::console::warn_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(_level: LogLevel, line: &str) {
    eprintln!("{line}");
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_line_flattens_fields() {
        let record = LogRecord::new(
            LogLevel::Info,
            "contact_form.submitted",
            json!({ "fields": { "name": "A" } }),
        );

        let line: Value = serde_json::from_str(&record.to_line(42)).expect("valid JSON line");
        assert_eq!(line["ts"], 42);
        assert_eq!(line["level"], "info");
        assert_eq!(line["event"], "contact_form.submitted");
        assert_eq!(line["fields"]["name"], "A");
    }

    #[test]
    fn levels_below_minimum_are_disabled() {
        let logger = Logger::new(LogLevel::Info);
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Warn));
    }

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(LogLevel::from_str("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("trace"), None);
    }
}
