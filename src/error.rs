use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("unparseable timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("invalid display config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("dom call failed: {0}")]
    Js(String),
}

impl From<JsValue> for DisplayError {
    fn from(value: JsValue) -> Self {
        DisplayError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
