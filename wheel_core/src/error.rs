// Typed errors with thiserror. Surface meaningful messages to JS.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Engine error types.
#[derive(Error, Debug)]
pub enum WheelError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Effect error: {0}")]
    Effect(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WheelError {
    fn from(err: serde_json::Error) -> Self {
        WheelError::Serialization(err.to_string())
    }
}

impl From<getrandom::Error> for WheelError {
    fn from(err: getrandom::Error) -> Self {
        WheelError::Entropy(err.to_string())
    }
}

/// Best-effort text of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

// Bare `?` on a JS call is only used for canvas calls; other hosts map explicitly.
impl From<JsValue> for WheelError {
    fn from(value: JsValue) -> Self {
        WheelError::Surface(js_message(&value))
    }
}

impl From<WheelError> for JsValue {
    fn from(err: WheelError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WheelError::InvalidConfig("min_rounds must be at least 1".to_string());
        assert!(err.to_string().contains("min_rounds"));
    }

    #[test]
    fn serde_errors_convert() {
        let err: WheelError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, WheelError::Serialization(_)));
    }
}
