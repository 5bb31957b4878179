//! Line-oriented channel for human-readable validation messages.
//!
//! Construction and mutator failures are reported here, one message per
//! line. Hosts pick the destination; the default is standard output.
//! Messages are meant for people and should not be parsed.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for diagnostic lines.
pub trait DiagnosticSink {
    /// Write one message; the sink is responsible for the line terminator.
    fn emit(&mut self, line: &str);
}

/// Report a failure through `sink` using its `Display` text.
pub fn report(sink: &mut dyn DiagnosticSink, message: &dyn fmt::Display) {
    sink.emit(&message.to_string());
}

//
// ─── SINKS ─────────────────────────────────────────────────────────────────────
//

/// Writes each line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "{line}") {
            tracing::debug!(error = %err, "dropping diagnostic line");
        }
    }
}

/// Writes each line to any `io::Write`.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn emit(&mut self, line: &str) {
        if let Err(err) = writeln!(self.writer, "{line}") {
            tracing::debug!(error = %err, "dropping diagnostic line");
        }
    }
}

/// Keeps lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.buffer())
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.buffer().push(line.to_string());
    }
}

/// Forwards lines to `tracing` as `info` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, line: &str) {
        tracing::info!(target: "songbook::diagnostics", "{line}");
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Box<T> {
    fn emit(&mut self, line: &str) {
        (**self).emit(line);
    }
}

//
// ─── PROCESS-WIDE SINK ─────────────────────────────────────────────────────────
//

/// A sink that can be installed process-wide.
pub type SharedSink = Box<dyn DiagnosticSink + Send>;

// `None` means standard output.
static GLOBAL_SINK: Mutex<Option<SharedSink>> = Mutex::new(None);

fn global() -> MutexGuard<'static, Option<SharedSink>> {
    GLOBAL_SINK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the process-wide sink, returning the previous one if it was custom.
///
/// The installed sink runs while the process-wide lock is held: its `emit`
/// must not call [`emit`], [`with_sink`], or anything that reports through
/// them (such as `Song::new` or the plain setters), or it will deadlock.
pub fn set_sink(sink: impl DiagnosticSink + Send + 'static) -> Option<SharedSink> {
    global().replace(Box::new(sink))
}

/// Go back to standard output.
pub fn reset_sink() -> Option<SharedSink> {
    global().take()
}

/// Run `f` with exclusive access to the process-wide sink.
///
/// `f` must not call back into the process-wide sink.
pub fn with_sink<R>(f: impl FnOnce(&mut dyn DiagnosticSink) -> R) -> R {
    let mut guard = global();
    match guard.as_mut() {
        Some(sink) => f(sink.as_mut()),
        None => f(&mut StdoutSink),
    }
}

/// Emit one line on the process-wide sink.
pub fn emit(line: &str) {
    with_sink(|sink| sink.emit(line));
}
