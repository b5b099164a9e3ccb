use super::{serialize_timestamp, Level};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::SystemTime;

/// Auxiliary context attached to an [`Event`](super::Event).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    /// When the breadcrumb was recorded.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: SystemTime,
    /// Breadcrumb type, `"default"` unless something more specific applies.
    #[serde(rename = "type")]
    pub ty: String,
    /// Dotted category such as `"error"` or `"log"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Human readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Severity of the breadcrumb.
    pub level: Level,
    /// Arbitrary structured data.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Default for Breadcrumb {
    fn default() -> Self {
        Breadcrumb {
            timestamp: SystemTime::now(),
            ty: "default".into(),
            category: None,
            message: None,
            level: Level::Info,
            data: Map::new(),
        }
    }
}
