//! Rendering of log entries into event message bodies.
//!
//! The hook renders every entry through a [`Formatter`] before building the
//! event. A formatter failure never reaches the logging call site; the hook
//! sends an empty body instead.
use crate::entry::LogEntry;
use crate::error::FormatError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt::{Debug, Write};

const FIELD_TIME: &str = "time";
const FIELD_LEVEL: &str = "level";
const FIELD_MSG: &str = "msg";
const FIELD_FUNC: &str = "func";
const FIELD_FILE: &str = "file";
const FIELD_ERROR: &str = "error";

/// Renders a [`LogEntry`] into bytes.
pub trait Formatter: Send + Sync + Debug {
    /// Formats `entry`. The output becomes the event message.
    fn format(&self, entry: &LogEntry<'_>) -> Result<Vec<u8>, FormatError>;
}

/// Renders entries as one JSON object per line.
///
/// Structured fields sit next to `time`, `level` and `msg`. A field whose
/// name collides with one of those is renamed to `fields.<name>`.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    data_key: Option<String>,
    disable_timestamp: bool,
    pretty_print: bool,
}

impl JsonFormatter {
    /// Creates a formatter with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nests all structured fields under `key` instead of the top level.
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    /// Leaves out the `time` field.
    pub fn with_timestamp_disabled(mut self) -> Self {
        self.disable_timestamp = true;
        self
    }

    /// Indents the output.
    pub fn with_pretty_print(mut self) -> Self {
        self.pretty_print = true;
        self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry<'_>) -> Result<Vec<u8>, FormatError> {
        let mut data = entry_fields(entry);
        let mut object = match &self.data_key {
            Some(key) if !data.is_empty() => {
                let mut object = Map::with_capacity(6);
                object.insert(key.clone(), Value::Object(data));
                object
            }
            Some(_) => data,
            None => {
                prefix_field_clashes(&mut data);
                data
            }
        };

        if !self.disable_timestamp {
            object.insert(FIELD_TIME.into(), timestamp(entry).into());
        }
        object.insert(FIELD_LEVEL.into(), entry.level.as_str().into());
        object.insert(FIELD_MSG.into(), entry.message.as_ref().into());
        if let Some(caller) = &entry.caller {
            if let Some(function) = caller.function {
                object.insert(FIELD_FUNC.into(), function.into());
            }
            object.insert(FIELD_FILE.into(), caller_location(caller.file, caller.line).into());
        }

        let object = Value::Object(object);
        let mut bytes = if self.pretty_print {
            serde_json::to_vec_pretty(&object)?
        } else {
            serde_json::to_vec(&object)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Renders entries as `key=value` pairs on a single line.
///
/// ```text
/// time="2024-05-01T10:00:00Z" level=warning msg="disk almost full" free=12
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    disable_timestamp: bool,
    quote_empty_fields: bool,
}

impl TextFormatter {
    /// Creates a formatter with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves out the `time` pair.
    pub fn with_timestamp_disabled(mut self) -> Self {
        self.disable_timestamp = true;
        self
    }

    /// Writes empty values as `""` instead of nothing.
    pub fn with_quoted_empty_fields(mut self) -> Self {
        self.quote_empty_fields = true;
        self
    }

    fn append(&self, out: &mut String, key: &str, value: &str) -> std::fmt::Result {
        if !out.is_empty() {
            out.push(' ');
        }
        write!(out, "{key}=")?;
        if self.needs_quoting(value) {
            write!(out, "{value:?}")
        } else {
            out.push_str(value);
            Ok(())
        }
    }

    fn needs_quoting(&self, text: &str) -> bool {
        if text.is_empty() {
            return self.quote_empty_fields;
        }
        !text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry<'_>) -> Result<Vec<u8>, FormatError> {
        let mut data = entry_fields(entry);
        prefix_field_clashes(&mut data);

        let mut out = String::with_capacity(128);
        if !self.disable_timestamp {
            self.append(&mut out, FIELD_TIME, &timestamp(entry))?;
        }
        self.append(&mut out, FIELD_LEVEL, entry.level.as_str())?;
        if let Some(caller) = &entry.caller {
            if let Some(function) = caller.function {
                self.append(&mut out, FIELD_FUNC, function)?;
            }
            self.append(&mut out, FIELD_FILE, &caller_location(caller.file, caller.line))?;
        }
        if !entry.message.is_empty() {
            self.append(&mut out, FIELD_MSG, &entry.message)?;
        }
        // serde_json::Map keeps keys sorted
        for (key, value) in &data {
            match value {
                Value::String(text) => self.append(&mut out, key, text)?,
                other => self.append(&mut out, key, &other.to_string())?,
            }
        }
        out.push('\n');
        Ok(out.into_bytes())
    }
}

fn entry_fields(entry: &LogEntry<'_>) -> Map<String, Value> {
    let mut data = entry.data.clone();
    if let Some(err) = entry.error {
        data.insert(FIELD_ERROR.into(), err.to_string().into());
    }
    data
}

fn prefix_field_clashes(data: &mut Map<String, Value>) {
    for key in [FIELD_TIME, FIELD_MSG, FIELD_LEVEL, FIELD_FUNC, FIELD_FILE] {
        if let Some(value) = data.remove(key) {
            data.insert(format!("fields.{key}"), value);
        }
    }
}

fn timestamp(entry: &LogEntry<'_>) -> String {
    let datetime: DateTime<Utc> = entry.timestamp.into();
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn caller_location(file: &str, line: Option<u32>) -> String {
    match line {
        Some(line) => format!("{file}:{line}"),
        None => file.to_string(),
    }
}
