use std::panic::Location;

use regex::Regex;

/// Source attribution for a single log call.
///
/// Line and column stay textual so that a frame parsed out of stack text
/// and a frame that could not be resolved share one shape; unresolved
/// positions read as `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerFrame {
    pub file_name: Option<String>,
    pub line_number: String,
    pub column_number: String,
    pub function_name: Option<String>,
}

impl CallerFrame {
    /// The safe default used whenever attribution fails.
    pub fn unresolved() -> Self {
        CallerFrame {
            file_name: None,
            line_number: "0".to_string(),
            column_number: "0".to_string(),
            function_name: None,
        }
    }

    /// Build a frame from a compile-time call-site capture. This is the
    /// preferred attribution path; parsing stack text is the fallback for
    /// externally supplied traces.
    pub fn from_location(location: &Location<'_>) -> Self {
        CallerFrame {
            file_name: Some(location.file().to_string()),
            line_number: location.line().to_string(),
            column_number: location.column().to_string(),
            function_name: None,
        }
    }

    /// `file:line` as recorded in a log record's `source` field.
    pub fn source(&self) -> String {
        format!(
            "{}:{}",
            self.file_name.as_deref().unwrap_or("unknown"),
            self.line_number
        )
    }
}

/// Frames whose text matches any of these markers belong to runtime or
/// pipeline plumbing, not to caller code.
const DEFAULT_IGNORE: &[&str] = &[
    "core::",
    "std::panicking",
    "std::rt::",
    "std::sys::",
    "tokio::runtime",
    "seqlog::",
];

/// Extracts the first attributable caller frame from raw call-stack text.
///
/// Two textual frame shapes are recognized:
/// `at <function> (<file>:<line>:<column>)` and, as a fallback,
/// `at <file>:<line>:<column>`. Resolution never fails; anything that
/// cannot be parsed collapses to [`CallerFrame::unresolved`].
pub struct CallerResolver {
    skip: usize,
    ignore: Vec<String>,
    full: Regex,
    simple: Regex,
}

impl Default for CallerResolver {
    fn default() -> Self {
        CallerResolver::new(1, DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect())
    }
}

impl CallerResolver {
    /// `skip` leading lines are dropped unconditionally (they cover the
    /// resolver's own frame and the trace header); any remaining line
    /// containing one of the `ignore` substrings is discarded.
    pub fn new(skip: usize, ignore: Vec<String>) -> Self {
        let full = Regex::new(r"^\s*at\s+(.+?)\s+\((.+?):(\d+):(\d+)\)\s*$")
            .expect("frame pattern is valid");
        let simple =
            Regex::new(r"^\s*at\s+(.+?):(\d+):(\d+)\s*$").expect("frame pattern is valid");
        CallerResolver { skip, ignore, full, simple }
    }

    pub fn resolve(&self, stack: Option<&str>) -> CallerFrame {
        let Some(stack) = stack else {
            return CallerFrame::unresolved();
        };

        let line = stack
            .lines()
            .skip(self.skip)
            .find(|line| !self.ignore.iter().any(|marker| line.contains(marker.as_str())));

        match line {
            Some(line) => self.parse_line(line),
            None => CallerFrame::unresolved(),
        }
    }

    fn parse_line(&self, line: &str) -> CallerFrame {
        if let Some(caps) = self.full.captures(line) {
            return CallerFrame {
                function_name: Some(caps[1].to_string()),
                file_name: Some(caps[2].to_string()),
                line_number: caps[3].to_string(),
                column_number: caps[4].to_string(),
            };
        }

        if let Some(caps) = self.simple.captures(line) {
            return CallerFrame {
                function_name: None,
                file_name: Some(caps[1].to_string()),
                line_number: caps[2].to_string(),
                column_number: caps[3].to_string(),
            };
        }

        CallerFrame::unresolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_ignoring(markers: &[&str]) -> CallerResolver {
        CallerResolver::new(1, markers.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn parses_full_frame_shape() {
        let resolver = resolver_ignoring(&[]);
        let stack = "Error\n    at Module.foo (/path/to/test.ext:10:15)\n    at bar (/path/to/other.ext:5:10)";

        let frame = resolver.resolve(Some(stack));

        assert_eq!(frame.function_name.as_deref(), Some("Module.foo"));
        assert_eq!(frame.file_name.as_deref(), Some("/path/to/test.ext"));
        assert_eq!(frame.line_number, "10");
        assert_eq!(frame.column_number, "15");
    }

    #[test]
    fn parses_simple_frame_shape() {
        let resolver = resolver_ignoring(&[]);
        let stack = "Error\n    at /path/to/test.ext:10:15";

        let frame = resolver.resolve(Some(stack));

        assert_eq!(frame.function_name, None);
        assert_eq!(frame.file_name.as_deref(), Some("/path/to/test.ext"));
        assert_eq!(frame.line_number, "10");
        assert_eq!(frame.column_number, "15");
    }

    #[test]
    fn skips_frames_matching_ignore_markers() {
        let resolver = resolver_ignoring(&["vendored_deps"]);
        let stack = "Error\n    at require (vendored_deps/dep/index.ext:5:3)\n    at foo (file.ext:12:4)";

        let frame = resolver.resolve(Some(stack));

        assert_eq!(frame.file_name.as_deref(), Some("file.ext"));
        assert_eq!(frame.line_number, "12");
        assert_eq!(frame.column_number, "4");
        assert_eq!(frame.function_name.as_deref(), Some("foo"));
    }

    #[test]
    fn absent_stack_yields_default_frame() {
        let resolver = CallerResolver::default();
        assert_eq!(resolver.resolve(None), CallerFrame::unresolved());
    }

    #[test]
    fn empty_stack_yields_default_frame() {
        let resolver = CallerResolver::default();
        let frame = resolver.resolve(Some(""));
        assert_eq!(frame.file_name, None);
        assert_eq!(frame.line_number, "0");
        assert_eq!(frame.column_number, "0");
        assert_eq!(frame.function_name, None);
    }

    #[test]
    fn fully_filtered_stack_yields_default_frame() {
        let resolver = resolver_ignoring(&["tokio::runtime"]);
        let stack = "Error\n    at poll (tokio::runtime::park:1:1)\n    at run (tokio::runtime::task:2:2)";
        assert_eq!(resolver.resolve(Some(stack)), CallerFrame::unresolved());
    }

    #[test]
    fn unmatched_line_yields_default_frame() {
        let resolver = resolver_ignoring(&[]);
        let stack = "Error\n    some malformed trace line";
        assert_eq!(resolver.resolve(Some(stack)), CallerFrame::unresolved());
    }

    #[test]
    fn location_capture_builds_source() {
        let frame = CallerFrame::from_location(Location::caller());
        assert!(frame.file_name.as_deref().unwrap().ends_with("caller.rs"));
        assert_ne!(frame.line_number, "0");
        assert_eq!(frame.source(), format!("{}:{}", frame.file_name.as_deref().unwrap(), frame.line_number));
    }

    #[test]
    fn unresolved_source_reads_as_unknown() {
        assert_eq!(CallerFrame::unresolved().source(), "unknown:0");
    }
}
