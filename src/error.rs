use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::surface::NodeId;

/// Everything that can go wrong inside the effects layer.
///
/// The site degrades silently wherever a feature is cosmetic, so most of these
/// end up logged rather than surfaced to the page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SiteError {
    #[error("javascript error: {0}")]
    Js(String),

    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("node {0} is no longer attached")]
    StaleNode(NodeId),

    #[error("unknown bio language: {0}")]
    UnknownLanguage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for SiteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
