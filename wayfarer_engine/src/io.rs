//! The I/O boundary: spec.md §6's `IoSink` abstraction plus a minimal
//! stdio implementation. Styling and terminal presentation are explicitly
//! out of scope (§1), so [`StdioSink`] treats every [`Style`] the same.

use std::io::{self, BufRead, Write};

/// Presentation hint for a piece of output text. A minimal sink may ignore
/// these entirely; they exist so a richer front end can style narration
/// without the core depending on any particular terminal library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    Emphasis,
    Strong,
    InputEcho,
}

/// The engine's only window onto the outside world.
///
/// The only two suspension points in the whole engine (spec.md §5) are
/// `read_line` and `write`/`flush` on this trait.
pub trait IoSink {
    fn read_line(&mut self) -> Option<String>;
    fn write(&mut self, text: &str, style: Style);
    fn flush(&mut self);
}

/// A plain stdin/stdout sink. `read_line` returns `None` on end-of-stream,
/// matching the "terminate cleanly" path in spec.md §4.6.
pub struct StdioSink {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdioSink {
    pub fn new() -> Self {
        StdioSink { stdin: io::stdin(), stdout: io::stdout() }
    }
}

impl Default for StdioSink {
    fn default() -> Self {
        Self::new()
    }
}

impl IoSink for StdioSink {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(_) => None,
        }
    }

    fn write(&mut self, text: &str, _style: Style) {
        let mut out = self.stdout.lock();
        let _ = out.write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.stdout.lock().flush();
    }
}

/// An in-memory sink for tests: a fixed queue of input lines and a
/// recorded transcript of every write, so integration tests can assert on
/// exact narration.
#[derive(Debug, Default)]
pub struct ScriptedSink {
    input: std::collections::VecDeque<String>,
    pub transcript: Vec<(String, Style)>,
}

impl ScriptedSink {
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ScriptedSink { input: lines.into_iter().map(Into::into).collect(), transcript: Vec::new() }
    }

    /// The full transcript's text, concatenated, for substring assertions.
    pub fn output(&self) -> String {
        self.transcript.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl IoSink for ScriptedSink {
    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn write(&mut self, text: &str, style: Style) {
        self.transcript.push((text.to_string(), style));
    }

    fn flush(&mut self) {}
}
