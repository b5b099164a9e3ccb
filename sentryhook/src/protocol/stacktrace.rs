use serde::{Serialize, Serializer};

/// A stack trace in the shape the error-tracking service consumes.
///
/// Frames are ordered with the oldest call first and the most recent call
/// last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stacktrace {
    /// The frames of this trace, oldest call first.
    pub frames: Vec<Frame>,
}

impl Stacktrace {
    /// Creates a trace from frames that are already ordered oldest-first.
    pub fn new(frames: Vec<Frame>) -> Self {
        Stacktrace { frames }
    }

    /// Returns `true` if the trace holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames in the trace.
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// A single frame of a [`Stacktrace`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Address of the instruction that was executing in this frame.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_addr"
    )]
    pub instruction_addr: Option<usize>,
    /// Demangled name of the function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Source file as recorded in the debug information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Absolute path of the source file, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>,
    /// Line number within `filename`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    /// Source lines preceding `context_line`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_context: Vec<String>,
    /// The source line at `lineno`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_line: Option<String>,
    /// Source lines following `context_line`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_context: Vec<String>,
    /// Whether the frame belongs to application code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_app: Option<bool>,
}

fn serialize_addr<S>(addr: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match addr {
        Some(addr) => serializer.serialize_str(&format!("{addr:#x}")),
        None => serializer.serialize_none(),
    }
}
