//! Error/debug reporter.
//!
//! Collects timestamped trace lines and, in debug mode, uncaught script
//! errors. The buffer is rendered once into the debug panel; it is never
//! pruned during a page session.

use chrono::{Local, Timelike};

/// Id of the overlay element created by the debug panel task.
pub const DEBUG_PANEL_ID: &str = "readygate-debug-panel";

/// Inline style of the debug panel: fixed, bottom right, scrolling.
pub const DEBUG_PANEL_STYLE: &str = "position: fixed; right: 0px; bottom: 0px; \
     overflow: scroll; z-index: 9999; width: 40%; height: 40%; \
     background: black; color: grey; padding: 6px;";

/// Append-only sequence of log lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    /// Append a line.
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// All lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as panel markup: every line followed by `<br/>`.
    ///
    /// Lines are emitted verbatim, not escaped.
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.iter().fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push_str("<br/>");
            out
        })
    }
}

/// Format the local-time prefix of a log line: `MM:SS:mmm`.
#[must_use]
pub fn format_timestamp<T: Timelike>(time: &T) -> String {
    format!(
        "{:02}:{:02}:{:03}",
        time.minute(),
        time.second(),
        (time.nanosecond() / 1_000_000) % 1000
    )
}

/// Owner of the log buffer and the debug-mode flag.
#[derive(Debug, Default, Clone)]
pub struct Reporter {
    show_errors: bool,
    log: LogBuffer,
}

impl Reporter {
    /// Create a reporter. `show_errors` comes from the `err` config key.
    #[must_use]
    pub fn new(show_errors: bool) -> Self {
        Self {
            show_errors,
            log: LogBuffer::default(),
        }
    }

    /// Whether debug mode is on.
    #[must_use]
    pub const fn show_errors(&self) -> bool {
        self.show_errors
    }

    /// Append `text` prefixed with the current local time.
    pub fn debug_show(&mut self, text: &str) {
        self.debug_show_at(&Local::now(), text);
    }

    /// Append `text` prefixed with the given time.
    pub fn debug_show_at<T: Timelike>(&mut self, time: &T, text: &str) {
        self.log.push(format!("{}: {text}", format_timestamp(time)));
    }

    /// Global error hook.
    ///
    /// Logs the error only in debug mode. Always returns `false`: the error
    /// is never marked handled, so default reporting still happens.
    pub fn report_error(&mut self, message: &str, line: u32) -> bool {
        if self.show_errors {
            self.debug_show(&format!("Error: {message} Line: {line}"));
        }
        false
    }

    /// The accumulated log.
    #[must_use]
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }
}
