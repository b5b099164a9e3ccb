//! # Stack trace resolution
//!
//! Errors handed to the hook may be chains of wrapped causes. Any link of a
//! chain can carry trace information in one of two forms:
//!
//! - a ready-made [`Stacktrace`] ([`Traceable::stacktrace`]), or
//! - a [`RawStacktrace`] of instruction addresses captured when the error
//!   was created ([`Traceable::raw_stacktrace`]).
//!
//! [`find_stacktrace`] walks the chain through [`Traceable::cause`] and keeps
//! whichever trace it saw on the most deeply nested link. Raw traces are then
//! symbolicated and reversed so the oldest call comes first.
//!
//! ```text
//!   TracedError ──cause──> ErrorReport ──cause──> TracedError ──cause──> (none)
//!   raw trace #1           -                      raw trace #2
//!                                                 ^ this one wins
//! ```
mod capture;
mod report;

pub use report::{ErrorReport, TracedError};

pub(crate) use capture::{add_source_context, capture_stacktrace, mark_in_app};

use crate::protocol::{Frame, Stacktrace};
use std::ffi::c_void;
use std::fmt;

/// Capabilities an error can expose to the stack trace resolver.
///
/// Every method has a default, so an error type only overrides the
/// capabilities it actually has.
pub trait Traceable: fmt::Display + fmt::Debug {
    /// A trace already in the service's frame format.
    ///
    /// Returning `None` means the link has no native trace, so the resolver
    /// goes on to ask for [`raw_stacktrace`](Self::raw_stacktrace) of the
    /// same link.
    fn stacktrace(&self) -> Option<Stacktrace> {
        None
    }

    /// Instruction addresses recorded when the error was created, most
    /// recent call first.
    fn raw_stacktrace(&self) -> Option<&RawStacktrace> {
        None
    }

    /// The next error in the chain.
    fn cause(&self) -> Option<&dyn Traceable> {
        None
    }
}

/// Instruction addresses of a captured call stack, most recent call first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStacktrace {
    addrs: Vec<usize>,
}

impl RawStacktrace {
    /// Captures the current call stack.
    ///
    /// Frames belonging to the capture machinery itself are left out, so
    /// the first address is the caller of `capture`.
    #[inline(never)]
    pub fn capture() -> Self {
        let marker = RawStacktrace::capture as fn() -> RawStacktrace;
        Self::capture_below(&[marker as usize])
    }

    /// Captures the current call stack without the frames up to and
    /// including the outermost call of any function in `entry_points`.
    ///
    /// Nothing is trimmed when none of the entry points is on the stack.
    #[inline(never)]
    pub(crate) fn capture_below(entry_points: &[usize]) -> Self {
        let mut frames: Vec<(usize, usize)> = Vec::new();
        backtrace::trace(|frame| {
            frames.push((frame.ip() as usize, frame.symbol_address() as usize));
            true
        });

        let start = frames
            .iter()
            .rposition(|(_, symbol)| entry_points.contains(symbol))
            .map_or(0, |pos| pos + 1);
        RawStacktrace {
            addrs: frames[start..].iter().map(|(ip, _)| *ip).collect(),
        }
    }

    /// Wraps addresses that are already ordered most recent call first.
    pub fn from_addrs(addrs: Vec<usize>) -> Self {
        RawStacktrace { addrs }
    }

    /// The recorded addresses, most recent call first.
    pub fn addrs(&self) -> &[usize] {
        &self.addrs
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

/// Finds the most informative stack trace carried by an error chain.
///
/// Each link is asked for a native trace first and a raw trace second. A
/// trace found on a link replaces whatever was found on the links above it,
/// so the deepest trace-capable link wins. Returns `None` when `err` is
/// `None` or no link carries a trace.
pub fn find_stacktrace(err: Option<&dyn Traceable>) -> Option<Stacktrace> {
    let mut current = err;
    let mut stacktrace = None;
    let mut raw = None;
    while let Some(link) = current {
        if let Some(native) = link.stacktrace() {
            stacktrace = Some(native);
            raw = None;
        } else if let Some(addrs) = link.raw_stacktrace() {
            stacktrace = None;
            raw = Some(addrs);
        }
        current = link.cause();
    }
    if let Some(raw) = raw {
        stacktrace = Some(convert_stacktrace(raw));
    }
    stacktrace
}

/// Symbolicates a raw trace into frames ordered oldest call first.
pub fn convert_stacktrace(raw: &RawStacktrace) -> Stacktrace {
    let mut frames: Vec<Frame> = raw
        .addrs()
        .iter()
        .map(|addr| resolve_frame(*addr))
        .collect();
    // the service wants the oldest frame first
    frames.reverse();
    Stacktrace::new(frames)
}

/// Walks `err` and joins every message of the chain with `": "`.
pub fn chain_message(err: &dyn Traceable) -> String {
    let mut message = err.to_string();
    let mut current = err.cause();
    while let Some(link) = current {
        message.push_str(": ");
        message.push_str(&link.to_string());
        current = link.cause();
    }
    message
}

pub(crate) fn resolve_frame(addr: usize) -> Frame {
    let mut frame = Frame {
        instruction_addr: Some(addr),
        ..Default::default()
    };
    // Return addresses point just past the call instruction.
    let lookup = addr.saturating_sub(1) as *mut c_void;
    backtrace::resolve(lookup, |symbol| {
        if frame.function.is_some() {
            return;
        }
        frame.function = symbol.name().map(|name| format!("{name:#}"));
        if let Some(path) = symbol.filename() {
            frame.filename = Some(path.display().to_string());
            if path.is_absolute() {
                frame.abs_path = frame.filename.clone();
            }
        }
        frame.lineno = symbol.lineno();
    });
    frame
}
