use super::{resolve_frame, RawStacktrace};
use crate::config::StacktraceConfig;
use crate::protocol::{Frame, Stacktrace};
use std::collections::HashMap;
use std::fs;

/// Captures the stack of the calling thread for attaching to an event.
///
/// Frames of the hook itself are dropped: everything up to the outermost
/// call of one of `entry_points`, or up to this function when none of them
/// is on the stack. Then `config.skip` further frames are dropped from the
/// most recent end. Returns `None` if nothing is left after skipping.
#[inline(never)]
pub(crate) fn capture_stacktrace(
    config: &StacktraceConfig,
    entry_points: &[usize],
) -> Option<Stacktrace> {
    let this = capture_stacktrace as fn(&StacktraceConfig, &[usize]) -> Option<Stacktrace>;
    let mut markers = Vec::with_capacity(entry_points.len() + 1);
    markers.push(this as usize);
    markers.extend_from_slice(entry_points);

    let raw = RawStacktrace::capture_below(&markers);
    let addrs = raw.addrs().get(config.skip..)?;
    if addrs.is_empty() {
        return None;
    }

    let mut frames: Vec<Frame> = addrs
        .iter()
        .rev()
        .map(|addr| resolve_frame(*addr))
        .collect();
    mark_in_app(&mut frames, &config.in_app_prefixes);
    add_source_context(&mut frames, config.context);
    Some(Stacktrace::new(frames))
}

/// Flags frames whose function or path starts with one of `prefixes`.
pub(crate) fn mark_in_app(frames: &mut [Frame], prefixes: &[String]) {
    if prefixes.is_empty() {
        return;
    }
    for frame in frames {
        let matches = |candidate: &Option<String>| {
            candidate
                .as_deref()
                .is_some_and(|value| prefixes.iter().any(|p| value.starts_with(p.as_str())))
        };
        if matches(&frame.function) || matches(&frame.abs_path) || matches(&frame.filename) {
            frame.in_app = Some(true);
        }
    }
}

/// Fills in `context` source lines around every frame whose file is readable.
pub(crate) fn add_source_context(frames: &mut [Frame], context: usize) {
    if context == 0 {
        return;
    }
    let mut sources: HashMap<String, Option<Vec<String>>> = HashMap::new();
    for frame in frames {
        let path = frame.abs_path.as_ref().or(frame.filename.as_ref());
        let (Some(path), Some(lineno)) = (path, frame.lineno) else {
            continue;
        };
        let lines = sources.entry(path.clone()).or_insert_with(|| {
            fs::read_to_string(path)
                .ok()
                .map(|source| source.lines().map(String::from).collect())
        });
        let Some(lines) = lines else {
            continue;
        };

        let index = lineno as usize;
        if index == 0 || index > lines.len() {
            continue;
        }
        let line = index - 1;
        frame.pre_context = lines[line.saturating_sub(context)..line].to_vec();
        frame.context_line = Some(lines[line].clone());
        let end = line.saturating_add(1).saturating_add(context).min(lines.len());
        frame.post_context = lines[line + 1..end].to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(skip: usize) -> StacktraceConfig {
        StacktraceConfig {
            enable: true,
            skip,
            ..Default::default()
        }
    }

    #[test]
    fn skipping_frames_shortens_the_trace() {
        let full = capture_stacktrace(&config(0), &[]).unwrap();
        let skipped = capture_stacktrace(&config(2), &[]).unwrap();
        assert_eq!(full.len(), skipped.len() + 2);
    }

    #[test]
    fn skipping_past_the_stack_yields_nothing() {
        assert!(capture_stacktrace(&config(100_000), &[]).is_none());
    }

    #[test]
    fn in_app_prefixes_match_function_and_path() {
        let mut frames = vec![
            Frame {
                function: Some("myapp::handler".into()),
                ..Default::default()
            },
            Frame {
                function: Some("std::rt::lang_start".into()),
                abs_path: Some("/rustc/library/std/src/rt.rs".into()),
                ..Default::default()
            },
            Frame {
                abs_path: Some("/srv/myapp/src/main.rs".into()),
                ..Default::default()
            },
        ];
        mark_in_app(&mut frames, &["myapp::".into(), "/srv/myapp".into()]);

        assert_eq!(frames[0].in_app, Some(true));
        assert_eq!(frames[1].in_app, None);
        assert_eq!(frames[2].in_app, Some(true));
    }

    #[test]
    fn source_context_surrounds_the_frame_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for n in 1..=5 {
            writeln!(file, "line{n}").unwrap();
        }
        let path = file.path().display().to_string();

        let mut frames = vec![
            Frame {
                abs_path: Some(path.clone()),
                lineno: Some(3),
                ..Default::default()
            },
            Frame {
                abs_path: Some(path),
                lineno: Some(1),
                ..Default::default()
            },
        ];
        add_source_context(&mut frames, 1);

        assert_eq!(frames[0].pre_context, vec!["line2"]);
        assert_eq!(frames[0].context_line.as_deref(), Some("line3"));
        assert_eq!(frames[0].post_context, vec!["line4"]);
        assert!(frames[1].pre_context.is_empty());
        assert_eq!(frames[1].context_line.as_deref(), Some("line1"));
    }

    #[test]
    fn huge_context_is_clamped_to_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for n in 1..=3 {
            writeln!(file, "line{n}").unwrap();
        }

        let mut frames = vec![Frame {
            abs_path: Some(file.path().display().to_string()),
            lineno: Some(2),
            ..Default::default()
        }];
        add_source_context(&mut frames, usize::MAX);

        assert_eq!(frames[0].pre_context, vec!["line1"]);
        assert_eq!(frames[0].context_line.as_deref(), Some("line2"));
        assert_eq!(frames[0].post_context, vec!["line3"]);
    }

    #[inline(never)]
    fn entry_point(config: &StacktraceConfig) -> Option<Stacktrace> {
        let this = entry_point as fn(&StacktraceConfig) -> Option<Stacktrace>;
        capture_stacktrace(config, &[this as usize])
    }

    #[test]
    fn frames_up_to_the_entry_point_are_dropped() {
        let trace = entry_point(&config(0)).unwrap();
        let functions: Vec<&str> = trace
            .frames
            .iter()
            .filter_map(|frame| frame.function.as_deref())
            .collect();

        assert!(!functions.iter().any(|f| f.ends_with("::entry_point")));
        assert!(!functions.iter().any(|f| f.contains("capture_stacktrace")));
        assert!(functions
            .last()
            .is_some_and(|f| f.ends_with("frames_up_to_the_entry_point_are_dropped")));
    }

    #[test]
    fn unreadable_source_is_left_alone() {
        let mut frames = vec![Frame {
            abs_path: Some("/nonexistent/sentryhook/src/lib.rs".into()),
            lineno: Some(10),
            ..Default::default()
        }];
        add_source_context(&mut frames, 3);
        assert!(frames[0].context_line.is_none());
    }
}
