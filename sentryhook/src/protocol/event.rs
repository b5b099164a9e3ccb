use super::{serialize_timestamp, Breadcrumb, Level, Stacktrace};
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::SystemTime;
use uuid::Uuid;

/// Platform identifier sent with every event.
pub const PLATFORM: &str = "native";

/// An event submitted to the error-tracking service.
///
/// `extra` and `tags` are borrowed from the log entry and the hook
/// configuration for the duration of a submission. A [`Transport`] that
/// needs to keep an event beyond the call must take an owned copy with
/// [`Event::into_owned`].
///
/// [`Transport`]: crate::transport::Transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event<'a> {
    /// Unique identifier of this event.
    #[serde(serialize_with = "serialize_event_id")]
    pub event_id: Uuid,
    /// Rendered log message.
    pub message: String,
    /// When the logged entry was produced.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: SystemTime,
    /// Severity of the event.
    pub level: Level,
    /// Platform of the emitting runtime.
    pub platform: Cow<'static, str>,
    /// Arbitrary key-value data carried by the log entry.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Cow<'a, Map<String, Value>>,
    /// Indexed string tags.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Cow<'a, BTreeMap<String, String>>,
    /// Exceptions attached to the event.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exception: Vec<Exception>,
    /// Breadcrumbs leading up to the event.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl Event<'static> {
    /// Creates an empty event with a fresh id, the current time and the
    /// [`PLATFORM`] identifier.
    pub fn new() -> Self {
        Event {
            event_id: Uuid::new_v4(),
            message: String::new(),
            timestamp: SystemTime::now(),
            level: Level::default(),
            platform: Cow::Borrowed(PLATFORM),
            extra: Cow::Owned(Map::new()),
            tags: Cow::Owned(BTreeMap::new()),
            exception: Vec::new(),
            breadcrumbs: Vec::new(),
        }
    }
}

impl Default for Event<'static> {
    fn default() -> Self {
        Event::new()
    }
}

impl Event<'_> {
    /// Detaches the event from any borrowed data.
    pub fn into_owned(self) -> Event<'static> {
        Event {
            event_id: self.event_id,
            message: self.message,
            timestamp: self.timestamp,
            level: self.level,
            platform: self.platform,
            extra: Cow::Owned(self.extra.into_owned()),
            tags: Cow::Owned(self.tags.into_owned()),
            exception: self.exception,
            breadcrumbs: self.breadcrumbs,
        }
    }
}

/// An exception descriptor attached to an [`Event`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exception {
    /// Exception type label.
    #[serde(rename = "type")]
    pub ty: String,
    /// Exception value; the caller's file path when nothing richer is known.
    pub value: String,
    /// Stack trace leading to the exception.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Stacktrace>,
}

fn serialize_event_id<S>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(id.simple().encode_lower(&mut Uuid::encode_buffer()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_event_defaults() {
        let event = Event::new();
        assert_eq!(event.platform, PLATFORM);
        assert_eq!(event.level, Level::Info);
        assert!(event.message.is_empty());
        assert!(event.exception.is_empty());
        assert!(!event.event_id.is_nil());
    }

    #[test]
    fn into_owned_detaches_borrowed_fields() {
        let mut data = Map::new();
        data.insert("user".into(), json!("alice"));
        let tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);

        let owned = {
            let mut event = Event::new();
            event.extra = Cow::Borrowed(&data);
            event.tags = Cow::Borrowed(&tags);
            event.into_owned()
        };

        assert!(matches!(owned.extra, Cow::Owned(_)));
        assert_eq!(owned.extra.get("user"), Some(&json!("alice")));
        assert_eq!(owned.tags.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn event_serializes_to_service_schema() {
        let mut event = Event::new();
        event.message = "boom".into();
        event.level = Level::Warning;
        event.exception.push(Exception {
            ty: "boom".into(),
            value: "src/main.rs".into(),
            stacktrace: None,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["platform"], "native");
        assert_eq!(json["exception"][0]["type"], "boom");
        assert_eq!(json["exception"][0]["value"], "src/main.rs");
        assert_eq!(json["event_id"].as_str().unwrap().len(), 32);
        assert!(json.get("extra").is_none());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
